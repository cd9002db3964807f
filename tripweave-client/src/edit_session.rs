//! Editing a single route: delete, replace and add points of interest.
//!
//! The session owns a working copy of the route. Each mutation goes to the
//! backend and, on success, the working copy is replaced by the server's
//! document. A failed mutation leaves the working copy untouched. Only one
//! mutation may be in flight.

use crate::api_client::ApiClientError;
use crate::notifications::Notification;
use crate::poi_search::{PoiSearch, PoiSelection, SearchMode, SearchSettings};
use crate::session::SessionContext;
use crate::traits::TripBackend;
use std::sync::Arc;
use std::time::Duration;
use tripweave_core::{ItemRef, MapId, RouteDocument, RouteId, UserId};

pub const NOT_LOGGED_IN: &str = "Error: user is not logged in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    pub search: SearchSettings,
    pub notice_ttl: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            search: SearchSettings::default(),
            notice_ttl: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("Another change to this route is still in progress")]
    Busy,
    #[error("No route change is in progress")]
    NothingInFlight,
    #[error("Point {map_id} is not part of route {route_id}")]
    UnknownPoi { map_id: MapId, route_id: RouteId },
    #[error(transparent)]
    Backend(#[from] ApiClientError),
}

/// Answer to "remove this point?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoiMutation {
    Delete { map_id: MapId },
    Replace { map_id: MapId, item: ItemRef },
    Add { item: ItemRef },
}

impl PoiMutation {
    fn target_map_id(&self) -> Option<MapId> {
        match self {
            PoiMutation::Delete { map_id } | PoiMutation::Replace { map_id, .. } => Some(*map_id),
            PoiMutation::Add { .. } => None,
        }
    }

    fn success_notice(&self) -> &'static str {
        match self {
            PoiMutation::Delete { .. } => "Point removed.",
            PoiMutation::Replace { .. } => "Point replaced.",
            PoiMutation::Add { .. } => "Point added.",
        }
    }

    fn failure_message(&self, err: &ApiClientError) -> String {
        let action = match self {
            PoiMutation::Delete { .. } => "Delete",
            PoiMutation::Replace { .. } => "Replace",
            PoiMutation::Add { .. } => "Add",
        };
        format!("{} failed: {}", action, err.detail())
    }
}

impl From<PoiSelection> for PoiMutation {
    fn from(selection: PoiSelection) -> Self {
        match selection.mode {
            SearchMode::Replace { map_id, .. } => PoiMutation::Replace {
                map_id,
                item: selection.item,
            },
            SearchMode::Add => PoiMutation::Add {
                item: selection.item,
            },
        }
    }
}

/// A mutation accepted by the session and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMutation {
    pub user_id: UserId,
    pub route_id: RouteId,
    pub mutation: PoiMutation,
}

impl PreparedMutation {
    pub async fn execute(&self, backend: &dyn TripBackend) -> Result<RouteDocument, ApiClientError> {
        match &self.mutation {
            PoiMutation::Delete { map_id } => {
                backend.delete_poi(self.user_id, self.route_id, *map_id).await
            }
            PoiMutation::Replace { map_id, item } => {
                backend
                    .replace_poi(self.user_id, self.route_id, *map_id, *item)
                    .await
            }
            PoiMutation::Add { item } => backend.add_poi(self.user_id, self.route_id, *item).await,
        }
    }
}

pub struct RouteEditSession {
    backend: Arc<dyn TripBackend>,
    session: SessionContext,
    working: RouteDocument,
    in_flight: Option<PoiMutation>,
    error: Option<String>,
    notice: Option<Notification>,
    notice_ttl: Duration,
    search: PoiSearch,
}

impl RouteEditSession {
    pub fn new(
        backend: Arc<dyn TripBackend>,
        session: SessionContext,
        route: RouteDocument,
        settings: EditorSettings,
    ) -> Self {
        tracing::debug!(route_id = %route.route_id, "edit session opened");
        let search = PoiSearch::new(Arc::clone(&backend), settings.search);
        Self {
            backend,
            session,
            working: route,
            in_flight: None,
            error: None,
            notice: None,
            notice_ttl: settings.notice_ttl,
            search,
        }
    }

    pub fn route_id(&self) -> RouteId {
        self.working.route_id
    }

    pub fn working(&self) -> &RouteDocument {
        &self.working
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The success notice, unless it has expired.
    pub fn notice(&self) -> Option<&Notification> {
        self.notice.as_ref().filter(|notice| !notice.is_expired())
    }

    pub fn clear_expired_notice(&mut self) {
        if self.notice.as_ref().is_some_and(Notification::is_expired) {
            self.notice = None;
        }
    }

    pub fn search(&self) -> &PoiSearch {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut PoiSearch {
        &mut self.search
    }

    pub fn open_replace(&mut self, map_id: MapId, display_name: impl Into<String>) -> Result<(), EditError> {
        self.ensure_known(map_id)?;
        self.search.open(SearchMode::Replace {
            map_id,
            current_name: display_name.into(),
        });
        Ok(())
    }

    pub fn open_add(&mut self) {
        self.search.open(SearchMode::Add);
    }

    fn ensure_known(&self, map_id: MapId) -> Result<(), EditError> {
        if self.working.poi(map_id).is_none() {
            return Err(EditError::UnknownPoi {
                map_id,
                route_id: self.working.route_id,
            });
        }
        Ok(())
    }

    /// Accept `mutation` and mark the session busy.
    pub fn prepare(&mut self, mutation: PoiMutation) -> Result<PreparedMutation, EditError> {
        if self.in_flight.is_some() {
            return Err(EditError::Busy);
        }
        if let Some(map_id) = mutation.target_map_id() {
            self.ensure_known(map_id)?;
        }
        let Some(user_id) = self.session.user_id() else {
            self.error = Some(NOT_LOGGED_IN.to_string());
            return Err(EditError::Unauthenticated);
        };
        self.error = None;
        self.in_flight = Some(mutation.clone());
        Ok(PreparedMutation {
            user_id,
            route_id: self.working.route_id,
            mutation,
        })
    }

    /// Settle the in-flight mutation with the backend's answer.
    pub fn apply_mutation(
        &mut self,
        result: Result<RouteDocument, ApiClientError>,
    ) -> Result<(), EditError> {
        let mutation = self.in_flight.take().ok_or(EditError::NothingInFlight)?;
        match result {
            Ok(route) => {
                tracing::info!(
                    route_id = %route.route_id,
                    points = route.points_of_interest.len(),
                    "route updated"
                );
                self.working = route;
                self.notice =
                    Some(Notification::success(mutation.success_notice()).with_ttl(self.notice_ttl));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(route_id = %self.working.route_id, error = %err, "route change failed");
                self.error = Some(mutation.failure_message(&err));
                Err(EditError::Backend(err))
            }
        }
    }

    async fn run(&mut self, mutation: PoiMutation) -> Result<(), EditError> {
        let prepared = self.prepare(mutation)?;
        let result = prepared.execute(self.backend.as_ref()).await;
        self.apply_mutation(result)
    }

    /// Remove a point. A declined confirmation does nothing and returns
    /// `Ok(false)`.
    pub async fn delete_poi(
        &mut self,
        map_id: MapId,
        confirmation: Confirmation,
    ) -> Result<bool, EditError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.run(PoiMutation::Delete { map_id }).await?;
        Ok(true)
    }

    /// Apply a search selection. The search is closed whatever the outcome.
    pub async fn on_poi_chosen(&mut self, selection: PoiSelection) -> Result<(), EditError> {
        self.search.close();
        self.run(PoiMutation::from(selection)).await
    }

    /// Select the search result at `index` and apply it. Returns `Ok(false)`
    /// when there is no such result.
    pub async fn choose_result(&mut self, index: usize) -> Result<bool, EditError> {
        let Some(selection) = self.search.select_index(index) else {
            return Ok(false);
        };
        self.on_poi_chosen(selection).await?;
        Ok(true)
    }

    /// The working document, for committing back to the conversation.
    pub fn save(&self) -> Result<RouteDocument, EditError> {
        if self.in_flight.is_some() {
            return Err(EditError::Busy);
        }
        Ok(self.working.clone())
    }

    /// Drop the working copy. Changes already accepted by the backend stay.
    pub fn cancel(mut self) {
        self.search.close();
        tracing::debug!(route_id = %self.working.route_id, "edit session cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripweave_core::{ActivityId, EntityIdType, LocationId};

    #[test]
    fn selection_maps_to_mutation() {
        let replace = PoiSelection {
            item: ItemRef::Activity(ActivityId::new(4)),
            mode: SearchMode::Replace {
                map_id: MapId::new(9),
                current_name: "Louvre".to_string(),
            },
        };
        assert_eq!(
            PoiMutation::from(replace),
            PoiMutation::Replace {
                map_id: MapId::new(9),
                item: ItemRef::Activity(ActivityId::new(4)),
            }
        );

        let add = PoiSelection {
            item: ItemRef::Location(LocationId::new(2)),
            mode: SearchMode::Add,
        };
        assert_eq!(
            PoiMutation::from(add),
            PoiMutation::Add {
                item: ItemRef::Location(LocationId::new(2)),
            }
        );
    }

    #[test]
    fn failure_messages_name_the_action() {
        let err = ApiClientError::Status {
            status: 404,
            detail: "Point not found".to_string(),
        };
        let delete = PoiMutation::Delete {
            map_id: MapId::new(1),
        };
        assert_eq!(delete.failure_message(&err), "Delete failed: Point not found");
        assert_eq!(delete.success_notice(), "Point removed.");
    }
}
