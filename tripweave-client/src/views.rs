//! Plain-text rendering of client state for the terminal.

use crate::edit_session::RouteEditSession;
use crate::poi_search::{PoiSearch, SearchMode};
use crate::profile::{ProfilePanel, RecommendationList};
use crate::reviews::ReviewPanel;
use crate::transcript::TurnEntry;
use std::fmt::Write;
use tripweave_core::{QueryHistoryEntry, Review, RouteDocument};

pub fn render_entry(entry: &TurnEntry) -> String {
    match entry {
        TurnEntry::User { text } => format!("you> {}", text),
        TurnEntry::System { text, is_error: false } => format!("bot> {}", text),
        TurnEntry::System { text, is_error: true } => format!("bot! {}", text),
        TurnEntry::SystemRoute { route } => render_route(route),
    }
}

pub fn render_route(route: &RouteDocument) -> String {
    let mut out = String::new();
    let status = if route.is_finalized { "approved" } else { "draft" };
    let _ = writeln!(out, "== Route {} ({}) ==", route.route_id, status);
    let _ = writeln!(out, "Cost: {}", route.cost_summary());
    if let Some(days) = route.duration_days {
        let _ = writeln!(out, "Duration: {} day(s)", days);
    }
    if !route.route_text.trim().is_empty() {
        let _ = writeln!(out, "{}", route.route_text.trim());
    }
    for (position, poi) in route.ordered_pois().iter().enumerate() {
        let _ = write!(out, "  {}. {} [map {}]", position + 1, poi.display_name(), poi.map_id);
        if let Some(hours) = poi.visit_duration_hours {
            let _ = write!(out, " ~{}h", hours);
        }
        out.push('\n');
    }
    if !route.is_finalized {
        let _ = write!(
            out,
            "(/edit {id} to change, /finalize {id} to approve)",
            id = route.route_id
        );
    }
    out.trim_end().to_string()
}

pub fn render_search(search: &PoiSearch) -> String {
    let mut out = String::new();
    match search.mode() {
        Some(SearchMode::Replace { current_name, .. }) => {
            let _ = writeln!(out, "-- Replace '{}' --", current_name);
        }
        Some(SearchMode::Add) => {
            let _ = writeln!(out, "-- Add a point --");
        }
        None => return String::new(),
    }
    if search.is_searching() {
        let _ = writeln!(out, "Searching for '{}'...", search.query());
    }
    if let Some(message) = search.message() {
        let _ = writeln!(out, "{}", message);
    }
    for (position, item) in search.results().iter().enumerate() {
        let _ = writeln!(out, "  {}) {} [{}]", position + 1, item.label(), item.item_type);
    }
    out.trim_end().to_string()
}

pub fn render_editor(editor: &RouteEditSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Editing route {}", editor.route_id());
    let _ = writeln!(out, "{}", render_route(editor.working()));
    if editor.is_loading() {
        let _ = writeln!(out, "Saving change...");
    }
    if let Some(error) = editor.error() {
        let _ = writeln!(out, "! {}", error);
    }
    if let Some(notice) = editor.notice() {
        let _ = writeln!(out, "* {}", notice.message);
    }
    let search = render_search(editor.search());
    if !search.is_empty() {
        let _ = writeln!(out, "{}", search);
    }
    out.trim_end().to_string()
}

fn render_review(review: &Review) -> String {
    let stars = "*".repeat(usize::from(review.rating));
    match review.comment.as_deref().filter(|c| !c.is_empty()) {
        Some(comment) => format!(
            "  {} {} (user {}): {}",
            review.review_date.date(),
            stars,
            review.user_id,
            comment
        ),
        None => format!("  {} {} (user {})", review.review_date.date(), stars, review.user_id),
    }
}

pub fn render_reviews(panel: &ReviewPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Reviews for {} --", panel.target());
    if let Some(error) = panel.error() {
        let _ = writeln!(out, "! {}", error);
    } else if panel.reviews().is_empty() {
        let _ = writeln!(out, "No reviews yet.");
    }
    for review in panel.reviews() {
        let _ = writeln!(out, "{}", render_review(review));
    }
    if let Some(error) = panel.form_error() {
        let _ = writeln!(out, "! {}", error);
    }
    out.trim_end().to_string()
}

pub fn render_profile(panel: &ProfilePanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Profile --");
    if let Some(profile) = panel.profile() {
        let interests = profile.interest_list();
        let _ = writeln!(out, "Email: {}", profile.email);
        let _ = writeln!(
            out,
            "Interests: {}",
            if interests.is_empty() {
                "not set".to_string()
            } else {
                interests.join(", ")
            }
        );
        let _ = writeln!(
            out,
            "Travel style: {}",
            profile.travel_style.as_deref().unwrap_or("not set")
        );
        match profile.budget {
            Some(budget) => {
                let currency = profile.budget_currency.as_deref().unwrap_or("");
                let _ = writeln!(out, "Budget: {} {}", budget, currency);
            }
            None => {
                let _ = writeln!(out, "Budget: not set");
            }
        }
        let _ = writeln!(out, "Member since: {}", profile.created_at.date());
    }
    if let Some(error) = panel.error() {
        let _ = writeln!(out, "! {}", error);
    }
    out.trim_end().to_string()
}

pub fn render_recommendations(list: &RecommendationList) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Recommendations --");
    if let Some(error) = list.error() {
        let _ = writeln!(out, "! {}", error);
    }
    if let Some(hint) = list.profile_hint() {
        let _ = writeln!(out, "{}", hint);
    }
    for (position, item) in list.items().iter().enumerate() {
        let _ = write!(out, "  {}) {} [{}]", position + 1, item.name, item.item_type);
        if let Some(rating) = item.rating {
            let _ = write!(out, " {:.1}/5", rating);
        }
        if let Some(place) = item.place() {
            let _ = write!(out, " - {}", place);
        }
        out.push('\n');
    }
    if !list.items().is_empty() {
        let _ = writeln!(out, "(/recommend <n> to see reviews)");
    }
    out.trim_end().to_string()
}

pub fn render_history(entries: &[QueryHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No past queries.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let route = entry
                .route_id()
                .map(|id| format!(" -> route {}", id))
                .unwrap_or_default();
            format!(
                "  [{}] {} {}{}",
                entry.id,
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.query_text,
                route
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
