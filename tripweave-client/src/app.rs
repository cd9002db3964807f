//! Interactive application state: wires commands to the conversation, the
//! route editor, the review panel and the profile screens, and collects text
//! to print.

use crate::commands::{parse_command, Command, HELP};
use crate::conversation::{Conversation, ConversationError};
use crate::edit_session::{Confirmation, EditError, EditorSettings, RouteEditSession};
use crate::profile::{ProfilePanel, RecommendationList};
use crate::reviews::{ReviewError, ReviewPanel};
use crate::session::SessionStore;
use crate::traits::TripBackend;
use crate::views::{
    render_editor, render_entry, render_history, render_profile, render_recommendations,
    render_reviews, render_route, render_search,
};
use std::sync::Arc;
use tripweave_core::{Credentials, ItemRef, MapId, QueryParameters};

/// Whether the main loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const NO_EDITOR: &str = "! No route is being edited. Use /edit <route_id> first.";

pub struct App {
    backend: Arc<dyn TripBackend>,
    store: SessionStore,
    conversation: Conversation,
    reviews: Option<ReviewPanel>,
    profile: ProfilePanel,
    recommendations: RecommendationList,
    pending_delete: Option<MapId>,
    printed: usize,
}

impl App {
    pub fn new(
        backend: Arc<dyn TripBackend>,
        store: SessionStore,
        params: QueryParameters,
        settings: EditorSettings,
    ) -> Self {
        let conversation = Conversation::new(Arc::clone(&backend), store.context(), params, settings);
        let profile = ProfilePanel::new(Arc::clone(&backend), store.context());
        let recommendations = RecommendationList::new(Arc::clone(&backend), store.context());
        Self {
            backend,
            store,
            conversation,
            reviews: None,
            profile,
            recommendations,
            pending_delete: None,
            printed: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn reviews(&self) -> Option<&ReviewPanel> {
        self.reviews.as_ref()
    }

    pub fn profile(&self) -> &ProfilePanel {
        &self.profile
    }

    pub fn recommendations(&self) -> &RecommendationList {
        &self.recommendations
    }

    pub fn awaiting_delete_confirmation(&self) -> Option<MapId> {
        self.pending_delete
    }

    /// Transcript entries added since the last call, rendered.
    pub fn drain_transcript(&mut self) -> Vec<String> {
        let entries = self.conversation.transcript().entries();
        let fresh = entries
            .iter()
            .skip(self.printed)
            .map(render_entry)
            .collect::<Vec<_>>();
        self.printed = entries.len();
        fresh
    }

    /// Apply finished searches. Returns the redrawn search box if it changed.
    pub fn poll_search(&mut self) -> Option<String> {
        let editor = self.conversation.editor_mut()?;
        editor.clear_expired_notice();
        if editor.search_mut().poll_outcomes() {
            Some(render_search(editor.search()))
        } else {
            None
        }
    }

    pub async fn handle_line(&mut self, line: &str, out: &mut Vec<String>) -> Flow {
        if let Some(map_id) = self.pending_delete.take() {
            let answer = line.trim().to_ascii_lowercase();
            let confirmation = if answer == "y" || answer == "yes" {
                Confirmation::Confirmed
            } else {
                Confirmation::Declined
            };
            self.delete(map_id, confirmation, out).await;
            return Flow::Continue;
        }

        match parse_command(line) {
            Ok(command) => self.handle_command(command, out).await,
            Err(err) => {
                out.push(format!("! {}", err));
                Flow::Continue
            }
        }
    }

    pub async fn handle_command(&mut self, command: Command, out: &mut Vec<String>) -> Flow {
        match command {
            Command::Say(text) => {
                if let Err(err) = self.conversation.submit_free_text(&text).await {
                    report_conversation_error(&err, out);
                }
            }
            Command::Login { email, password } => {
                let credentials = Credentials { email, password };
                match self.backend.login(&credentials).await {
                    Ok(response) => match self.store.login(response.user_id) {
                        Ok(()) => out.push(format!("Logged in as user {}.", response.user_id)),
                        Err(err) => out.push(format!("! Could not save session: {}", err)),
                    },
                    Err(err) => out.push(format!("! Login failed: {}", err.detail())),
                }
            }
            Command::Register { email, password } => {
                let credentials = Credentials { email, password };
                match self.backend.register(&credentials).await {
                    Ok(profile) => out.push(format!(
                        "Registered {} (user {}). Log in with /login.",
                        profile.email, profile.id
                    )),
                    Err(err) => out.push(format!("! Registration failed: {}", err.detail())),
                }
            }
            Command::Logout => match self.store.logout() {
                Ok(()) => out.push("Logged out.".to_string()),
                Err(err) => out.push(format!("! Could not save session: {}", err)),
            },
            Command::Params {
                start_date,
                end_date,
                budget,
                currency,
            } => {
                let params = QueryParameters {
                    start_date,
                    end_date,
                    budget,
                    budget_currency: currency.unwrap_or(self.conversation.params().budget_currency),
                };
                if let Err(err) = self.conversation.save_parameters(params) {
                    out.push(format!("! {}", err));
                }
            }
            Command::Finalize(route_id) => {
                if let Err(err) = self.conversation.finalize_route(route_id).await {
                    report_conversation_error(&err, out);
                }
            }
            Command::Edit(route_id) => match self.conversation.request_edit_by_id(route_id) {
                Ok(()) => {
                    if let Some(editor) = self.conversation.editor() {
                        out.push(render_editor(editor));
                    }
                }
                Err(err) => report_conversation_error(&err, out),
            },
            Command::Delete(map_id) => match self.conversation.editor() {
                Some(editor) => match editor.working().poi(map_id) {
                    Some(poi) => {
                        out.push(format!("Remove '{}' from the route? [y/N]", poi.display_name()));
                        self.pending_delete = Some(map_id);
                    }
                    None => out.push(format!("! Point {} is not part of this route.", map_id)),
                },
                None => out.push(NO_EDITOR.to_string()),
            },
            Command::Replace(map_id) => self.with_editor(out, |editor, out| {
                let name = editor
                    .working()
                    .poi(map_id)
                    .map(|poi| poi.display_name())
                    .unwrap_or_default();
                match editor.open_replace(map_id, name) {
                    Ok(()) => {
                        out.push(render_search(editor.search()));
                        out.push("Type /search <text> to look for a replacement.".to_string());
                    }
                    Err(err) => out.push(format!("! {}", err)),
                }
            }),
            Command::Add => self.with_editor(out, |editor, out| {
                editor.open_add();
                out.push(render_search(editor.search()));
                out.push("Type /search <text> to look for a point to add.".to_string());
            }),
            Command::Search(text) => self.with_editor(out, |editor, out| {
                if !editor.search().is_open() {
                    out.push("! Open the search with /replace <map_id> or /add first.".to_string());
                    return;
                }
                editor.search_mut().on_query_change(&text);
                out.push(render_search(editor.search()));
            }),
            Command::Pick(index) => match self.conversation.editor_mut() {
                Some(editor) => {
                    match editor.choose_result(index).await {
                        Ok(true) => {}
                        Ok(false) => out.push(format!("! There is no result number {}.", index + 1)),
                        Err(err) => report_edit_error(&err, out),
                    }
                    out.push(render_editor(editor));
                }
                None => out.push(NO_EDITOR.to_string()),
            },
            Command::CloseSearch => self.with_editor(out, |editor, _| editor.search_mut().close()),
            Command::Save => {
                if let Err(err) = self.conversation.save_edit() {
                    report_conversation_error(&err, out);
                }
            }
            Command::Cancel => match self.conversation.cancel_edit() {
                Ok(()) => out.push("Edit cancelled.".to_string()),
                Err(err) => report_conversation_error(&err, out),
            },
            Command::Reviews(target) => self.show_reviews(target, out).await,
            Command::Review { rating, comment } => match self.reviews.as_mut() {
                Some(panel) => {
                    panel.open_form();
                    match panel.submit(rating, &comment).await {
                        Ok(_) => out.push("Thank you for your review!".to_string()),
                        Err(err @ ReviewError::Busy) => out.push(format!("! {}", err)),
                        // Every other failure is recorded on the form.
                        Err(_) => {}
                    }
                    out.push(render_reviews(panel));
                }
                None => out.push("! Show reviews with /reviews <location|activity> <id> first.".to_string()),
            },
            Command::History => match self.store.context().user_id() {
                Some(user_id) => match self.backend.query_history(user_id).await {
                    Ok(entries) => out.push(render_history(&entries)),
                    Err(err) => out.push(format!("! Could not load history: {}", err.detail())),
                },
                None => out.push("! Log in to see your history.".to_string()),
            },
            Command::Route(route_id) => match self.store.context().user_id() {
                Some(user_id) => match self.backend.get_route(user_id, route_id).await {
                    Ok(route) => out.push(render_route(&route)),
                    Err(err) => out.push(format!("! Could not load route: {}", err.detail())),
                },
                None => out.push("! Log in to see route details.".to_string()),
            },
            Command::Profile => {
                // Failures are kept on the panel and rendered below.
                let _ = self.profile.load().await;
                out.push(render_profile(&self.profile));
            }
            Command::SetProfile { field, value } => {
                if self.profile.update_field(field, &value).await.is_ok() {
                    out.push("Profile saved.".to_string());
                }
                out.push(render_profile(&self.profile));
            }
            Command::Recommend => {
                let _ = self.recommendations.load().await;
                out.push(render_recommendations(&self.recommendations));
            }
            Command::RecommendedReviews(index) => {
                match self.recommendations.item(index).map(|item| item.item_ref()) {
                    Some(target) => self.show_reviews(target, out).await,
                    None if self.recommendations.items().is_empty() => {
                        out.push("! List recommendations with /recommend first.".to_string())
                    }
                    None => out.push(format!("! There is no recommendation number {}.", index + 1)),
                }
            }
            Command::Help => out.push(HELP.to_string()),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    async fn show_reviews(&mut self, target: ItemRef, out: &mut Vec<String>) {
        let mut panel = ReviewPanel::new(Arc::clone(&self.backend), self.store.context(), target);
        // Failures are kept on the panel and rendered below.
        let _ = panel.load().await;
        out.push(render_reviews(&panel));
        self.reviews = Some(panel);
    }

    async fn delete(&mut self, map_id: MapId, confirmation: Confirmation, out: &mut Vec<String>) {
        let Some(editor) = self.conversation.editor_mut() else {
            out.push(NO_EDITOR.to_string());
            return;
        };
        match editor.delete_poi(map_id, confirmation).await {
            Ok(true) => {}
            Ok(false) => out.push("Kept.".to_string()),
            Err(err) => report_edit_error(&err, out),
        }
        out.push(render_editor(editor));
    }

    fn with_editor(
        &mut self,
        out: &mut Vec<String>,
        action: impl FnOnce(&mut RouteEditSession, &mut Vec<String>),
    ) {
        match self.conversation.editor_mut() {
            Some(editor) => action(editor, out),
            None => out.push(NO_EDITOR.to_string()),
        }
    }
}

/// Errors already written to the transcript are not repeated.
fn report_conversation_error(err: &ConversationError, out: &mut Vec<String>) {
    match err {
        ConversationError::Unauthenticated | ConversationError::Validation(_) => {}
        other => out.push(format!("! {}", other)),
    }
}

/// Backend and login failures are shown by the editor itself.
fn report_edit_error(err: &EditError, out: &mut Vec<String>) {
    match err {
        EditError::Backend(_) | EditError::Unauthenticated => {}
        other => out.push(format!("! {}", other)),
    }
}
