//! The conversation transcript.
//!
//! Entries are appended in order. The only in-place change allowed is swapping
//! the document of a `SystemRoute` entry, and at most one such entry exists per
//! route id.

use tripweave_core::{RouteDocument, RouteId};

#[derive(Debug, Clone, PartialEq)]
pub enum TurnEntry {
    User { text: String },
    System { text: String, is_error: bool },
    SystemRoute { route: RouteDocument },
}

impl TurnEntry {
    pub fn is_error(&self) -> bool {
        matches!(self, TurnEntry::System { is_error: true, .. })
    }

    pub fn route(&self) -> Option<&RouteDocument> {
        match self {
            TurnEntry::SystemRoute { route } => Some(route),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            TurnEntry::User { text } | TurnEntry::System { text, .. } => Some(text),
            TurnEntry::SystemRoute { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    entries: Vec<TurnEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TurnEntry> {
        self.entries.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(TurnEntry::User { text: text.into() });
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.entries.push(TurnEntry::System {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.entries.push(TurnEntry::System {
            text: text.into(),
            is_error: true,
        });
    }

    /// Append a route, or swap the document in place if the route is already
    /// shown.
    pub fn push_route(&mut self, route: RouteDocument) {
        if !self.replace_route(route.clone()) {
            self.entries.push(TurnEntry::SystemRoute { route });
        }
    }

    /// Swap the document of the entry with the same route id. Returns `false`
    /// when no entry matches.
    pub fn replace_route(&mut self, route: RouteDocument) -> bool {
        self.replace_route_at(route.route_id, route)
    }

    /// Swap the document of the entry shown for `route_id`, even when the new
    /// document carries another id. Any other entry already showing the new
    /// id is dropped so each route appears once. Returns `false` when no
    /// entry matches.
    pub fn replace_route_at(&mut self, route_id: RouteId, route: RouteDocument) -> bool {
        let Some(index) = self.entries.iter().position(|entry| {
            entry.route().is_some_and(|existing| existing.route_id == route_id)
        }) else {
            return false;
        };
        let new_id = route.route_id;
        self.entries[index] = TurnEntry::SystemRoute { route };
        if new_id != route_id {
            let mut position = 0;
            self.entries.retain(|entry| {
                let duplicate = position != index
                    && entry.route().is_some_and(|existing| existing.route_id == new_id);
                position += 1;
                !duplicate
            });
        }
        true
    }

    pub fn clear_routes(&mut self) {
        self.entries
            .retain(|entry| !matches!(entry, TurnEntry::SystemRoute { .. }));
    }

    pub fn route(&self, route_id: RouteId) -> Option<&RouteDocument> {
        self.routes().find(|route| route.route_id == route_id)
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteDocument> {
        self.entries.iter().filter_map(TurnEntry::route)
    }
}
