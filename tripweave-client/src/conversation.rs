//! The chat-style conversation that turns free text into routes.
//!
//! State lives in three places: the [`Transcript`] shown to the user, the
//! [`ConversationPhase`] and the trip [`QueryParameters`]. Every backend round
//! trip is split into a `prepare_*` step, which validates input and enters the
//! loading state, and an `apply_*` step, which folds the outcome back in. The
//! async methods chain the two around a backend call.

use crate::api_client::ApiClientError;
use crate::edit_session::{EditError, EditorSettings, RouteEditSession, NOT_LOGGED_IN};
use crate::session::SessionContext;
use crate::traits::TripBackend;
use crate::transcript::Transcript;
use std::sync::Arc;
use tripweave_core::{
    ClarificationField, QueryParameters, QueryRequest, QueryResponse, RouteDocument, RouteId,
    UserId, ValidationError,
};

pub const GREETING: &str = "Hi! Tell me about the trip you have in mind and I will plan a route.";
pub const PARAMETERS_HINT: &str =
    "Trip dates and budget can be changed at any time; new queries use the latest values.";
pub const ROUTE_READY: &str = "Here is your route:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationPhase {
    Idle,
    AwaitingResponse,
    AwaitingClarification(ClarificationField),
}

/// A question the backend asked, with the query it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClarification {
    pub field: ClarificationField,
    pub original_query_text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("A request is already in progress")]
    Busy,
    #[error("No request is in progress")]
    NoRequestInFlight,
    #[error("A route is being edited")]
    EditInProgress,
    #[error("No route is being edited")]
    NoEditSession,
    #[error("Route {0} is not in the conversation")]
    RouteNotFound(RouteId),
    #[error("Route {0} is already finalized")]
    AlreadyFinalized(RouteId),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// A query accepted by the conversation and ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub user_id: UserId,
    pub request: QueryRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedFinalize {
    pub user_id: UserId,
    pub route_id: RouteId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Clarification(ClarificationField),
    Route(RouteId),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Finalized(RouteId),
    Failed(String),
}

pub struct Conversation {
    backend: Arc<dyn TripBackend>,
    session: SessionContext,
    settings: EditorSettings,
    transcript: Transcript,
    params: QueryParameters,
    phase: ConversationPhase,
    original_query: Option<String>,
    finalizing: Option<RouteId>,
    editor: Option<RouteEditSession>,
}

impl Conversation {
    pub fn new(
        backend: Arc<dyn TripBackend>,
        session: SessionContext,
        params: QueryParameters,
        settings: EditorSettings,
    ) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_system(GREETING);
        transcript.push_system(PARAMETERS_HINT);
        Self {
            backend,
            session,
            settings,
            transcript,
            params,
            phase: ConversationPhase::Idle,
            original_query: None,
            finalizing: None,
            editor: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn phase(&self) -> &ConversationPhase {
        &self.phase
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn backend(&self) -> Arc<dyn TripBackend> {
        Arc::clone(&self.backend)
    }

    pub fn pending_clarification(&self) -> Option<PendingClarification> {
        match (&self.phase, &self.original_query) {
            (ConversationPhase::AwaitingClarification(field), Some(original)) => {
                Some(PendingClarification {
                    field: field.clone(),
                    original_query_text: original.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ConversationPhase::AwaitingResponse || self.finalizing.is_some()
    }

    pub fn editor(&self) -> Option<&RouteEditSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut RouteEditSession> {
        self.editor.as_mut()
    }

    fn ensure_not_editing(&self) -> Result<(), ConversationError> {
        if self.editor.is_some() {
            return Err(ConversationError::EditInProgress);
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), ConversationError> {
        self.ensure_not_editing()?;
        if self.is_loading() {
            return Err(ConversationError::Busy);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Turn user text into an outgoing query.
    ///
    /// Returns `Ok(None)` for blank text outside a clarification. A blank
    /// answer to a clarification is recorded as an error entry and refused.
    pub fn prepare_submission(
        &mut self,
        text: &str,
    ) -> Result<Option<PreparedQuery>, ConversationError> {
        self.ensure_ready()?;
        let text = text.trim();

        if text.is_empty() {
            if let ConversationPhase::AwaitingClarification(field) = &self.phase {
                let field = field.clone();
                self.transcript.push_error(field.blank_answer_message());
                return Err(ValidationError::missing(field.as_str()).into());
            }
            return Ok(None);
        }

        self.transcript.push_user(text);
        self.transcript.clear_routes();

        let Some(user_id) = self.session.user_id() else {
            tracing::warn!("query refused: not logged in");
            self.transcript.push_error(NOT_LOGGED_IN);
            self.original_query = None;
            self.phase = ConversationPhase::Idle;
            return Err(ConversationError::Unauthenticated);
        };

        let replay = match (&self.phase, &self.original_query) {
            (
                ConversationPhase::AwaitingClarification(ClarificationField::Destination),
                Some(original),
            ) => Some(original.clone()),
            _ => None,
        };
        let request = match replay {
            Some(original) => {
                tracing::debug!(destination = %text, "destination clarified");
                QueryRequest::new(original, &self.params, vec![text.to_string()])
            }
            None => {
                self.original_query = Some(text.to_string());
                QueryRequest::new(text, &self.params, Vec::new())
            }
        };

        self.phase = ConversationPhase::AwaitingResponse;
        tracing::info!(user_id = %user_id, "query submitted");
        Ok(Some(PreparedQuery { user_id, request }))
    }

    /// Fold the backend's answer to the in-flight query into the transcript.
    pub fn apply_query_result(
        &mut self,
        result: Result<QueryResponse, ApiClientError>,
    ) -> Result<QueryOutcome, ConversationError> {
        if self.phase != ConversationPhase::AwaitingResponse {
            return Err(ConversationError::NoRequestInFlight);
        }

        match result {
            Ok(QueryResponse::Clarification(needed)) => {
                let field = needed.first_missing_field();
                tracing::info!(field = %field, "clarification required");
                self.transcript
                    .push_system(field.prompt(needed.message.as_deref()));
                self.phase = ConversationPhase::AwaitingClarification(field.clone());
                Ok(QueryOutcome::Clarification(field))
            }
            Ok(QueryResponse::Route(route)) => {
                let route_id = route.route_id;
                tracing::info!(route_id = %route_id, "route received");
                self.transcript.push_system(ROUTE_READY);
                self.transcript.push_route(route);
                self.original_query = None;
                self.phase = ConversationPhase::Idle;
                Ok(QueryOutcome::Route(route_id))
            }
            Err(err) => {
                tracing::warn!(error = %err, "query failed");
                let message = err.user_message();
                self.transcript.push_error(message.clone());
                self.original_query = None;
                self.phase = ConversationPhase::Idle;
                Ok(QueryOutcome::Failed(message))
            }
        }
    }

    pub async fn submit_free_text(
        &mut self,
        text: &str,
    ) -> Result<Option<QueryOutcome>, ConversationError> {
        let Some(prepared) = self.prepare_submission(text)? else {
            return Ok(None);
        };
        let result = self
            .backend
            .submit_query(prepared.user_id, &prepared.request)
            .await;
        self.apply_query_result(result).map(Some)
    }

    // ------------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------------

    pub fn save_parameters(&mut self, params: QueryParameters) -> Result<(), ConversationError> {
        self.ensure_not_editing()?;
        params.validate()?;
        let summary = params.summary();
        self.params = params;
        tracing::debug!(%summary, "parameters saved");
        self.transcript
            .push_system(format!("Parameters saved: {}.", summary));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Finalize
    // ------------------------------------------------------------------------

    pub fn prepare_finalize(
        &mut self,
        route_id: RouteId,
    ) -> Result<PreparedFinalize, ConversationError> {
        self.ensure_ready()?;
        let route = self
            .transcript
            .route(route_id)
            .ok_or(ConversationError::RouteNotFound(route_id))?;
        if route.is_finalized {
            return Err(ConversationError::AlreadyFinalized(route_id));
        }
        let Some(user_id) = self.session.user_id() else {
            self.transcript.push_error(NOT_LOGGED_IN);
            return Err(ConversationError::Unauthenticated);
        };
        self.finalizing = Some(route_id);
        Ok(PreparedFinalize { user_id, route_id })
    }

    pub fn apply_finalize_result(
        &mut self,
        result: Result<RouteDocument, ApiClientError>,
    ) -> Result<FinalizeOutcome, ConversationError> {
        let route_id = self
            .finalizing
            .take()
            .ok_or(ConversationError::NoRequestInFlight)?;
        match result {
            Ok(route) => {
                tracing::info!(route_id = %route_id, returned = %route.route_id, "route finalized");
                if !self.transcript.replace_route_at(route_id, route) {
                    tracing::warn!(route_id = %route_id, "finalized route is no longer shown");
                }
                self.transcript
                    .push_system(format!("Route (ID: {}) approved!", route_id));
                Ok(FinalizeOutcome::Finalized(route_id))
            }
            Err(err) => {
                tracing::warn!(route_id = %route_id, error = %err, "finalize failed");
                let message = format!("Failed to finalize route: {}", err.detail());
                self.transcript.push_error(message.clone());
                Ok(FinalizeOutcome::Failed(message))
            }
        }
    }

    pub async fn finalize_route(
        &mut self,
        route_id: RouteId,
    ) -> Result<FinalizeOutcome, ConversationError> {
        let prepared = self.prepare_finalize(route_id)?;
        let result = self
            .backend
            .finalize_route(prepared.user_id, prepared.route_id)
            .await;
        self.apply_finalize_result(result)
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Open an edit session over `route`. The transcript is frozen until the
    /// session is committed or cancelled.
    pub fn request_edit(&mut self, route: RouteDocument) -> Result<(), ConversationError> {
        self.ensure_ready()?;
        if route.is_finalized {
            return Err(ConversationError::AlreadyFinalized(route.route_id));
        }
        self.editor = Some(RouteEditSession::new(
            Arc::clone(&self.backend),
            self.session.clone(),
            route,
            self.settings,
        ));
        Ok(())
    }

    /// Open an edit session over a route already shown in the transcript.
    pub fn request_edit_by_id(&mut self, route_id: RouteId) -> Result<(), ConversationError> {
        let route = self
            .transcript
            .route(route_id)
            .cloned()
            .ok_or(ConversationError::RouteNotFound(route_id))?;
        self.request_edit(route)
    }

    /// Put the edited document back into the transcript and close the editor.
    /// When the edited route is no longer shown nothing is written and the
    /// editor stays open.
    pub fn commit_edit(&mut self, updated: RouteDocument) -> Result<RouteId, ConversationError> {
        let editor = self.editor.as_ref().ok_or(ConversationError::NoEditSession)?;
        if editor.is_loading() {
            return Err(EditError::Busy.into());
        }
        let route_id = editor.route_id();
        if !self.transcript.replace_route_at(route_id, updated) {
            tracing::warn!(route_id = %route_id, "edited route is not in the transcript");
            return Err(ConversationError::RouteNotFound(route_id));
        }
        self.transcript.push_system(format!(
            "Route (ID: {}) updated. Finalize it to approve.",
            route_id
        ));
        if let Some(editor) = self.editor.take() {
            editor.cancel();
        }
        tracing::info!(route_id = %route_id, "route edit committed");
        Ok(route_id)
    }

    /// Save the open editor's working document.
    pub fn save_edit(&mut self) -> Result<RouteId, ConversationError> {
        let updated = self
            .editor
            .as_ref()
            .ok_or(ConversationError::NoEditSession)?
            .save()?;
        self.commit_edit(updated)
    }

    pub fn cancel_edit(&mut self) -> Result<(), ConversationError> {
        let editor = self.editor.take().ok_or(ConversationError::NoEditSession)?;
        editor.cancel();
        Ok(())
    }
}
