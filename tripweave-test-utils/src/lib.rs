//! Tripweave Test Utilities
//!
//! Shared test infrastructure for the Tripweave workspace:
//! - A scripted [`MockBackend`] that records every call
//! - Proptest generators for route documents and query parameters
//! - Fixtures for common routes, search hits, reviews and profiles
//! - Assertions over transcripts

pub use tripweave_client::{ApiClientError, TripBackend};
pub use tripweave_core::{
    ActivityId, ClarificationRequired, ClarificationStatus, CreateReviewRequest, Credentials,
    Currency, EntityIdType, ItemRef, ItemType, LocationId, LoginResponse, MapId, PoiEntry,
    QueryHistoryEntry, QueryId, QueryParameters, QueryRequest, QueryResponse, RecommendedItem,
    Review, ReviewId, RouteDocument, RouteId, SearchItem, UserId, UserProfile, UserProfileUpdate,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

// ============================================================================
// MOCK BACKEND
// ============================================================================

/// A failure the mock should report instead of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Status { status: u16, detail: String },
    Network(String),
}

impl MockFailure {
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: detail.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    fn to_error(&self) -> ApiClientError {
        match self {
            Self::Status { status, detail } => ApiClientError::Status {
                status: *status,
                detail: detail.clone(),
            },
            Self::Network(message) => ApiClientError::Network(message.clone()),
        }
    }
}

pub type Scripted<T> = Result<T, MockFailure>;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SubmitQuery { user_id: UserId, request: QueryRequest },
    FinalizeRoute { user_id: UserId, route_id: RouteId },
    AddPoi { user_id: UserId, route_id: RouteId, item: ItemRef },
    ReplacePoi { user_id: UserId, route_id: RouteId, map_id: MapId, item: ItemRef },
    DeletePoi { user_id: UserId, route_id: RouteId, map_id: MapId },
    SearchItems { query: String, limit: u32 },
    ListReviews { target: ItemRef },
    CreateReview { user_id: UserId, request: CreateReviewRequest },
    Login { email: String },
    Register { email: String },
    GetRoute { user_id: UserId, route_id: RouteId },
    QueryHistory { user_id: UserId },
    GetProfile { user_id: UserId },
    UpdateProfile { user_id: UserId, update: UserProfileUpdate },
    Recommendations { user_id: UserId },
}

#[derive(Default)]
struct MockState {
    calls: Vec<BackendCall>,
    queries: VecDeque<Scripted<QueryResponse>>,
    routes: VecDeque<Scripted<RouteDocument>>,
    searches: HashMap<String, Scripted<Vec<SearchItem>>>,
    review_lists: VecDeque<Scripted<Vec<Review>>>,
    created_reviews: VecDeque<Scripted<Review>>,
    logins: VecDeque<Scripted<LoginResponse>>,
    registrations: VecDeque<Scripted<UserProfile>>,
    histories: VecDeque<Scripted<Vec<QueryHistoryEntry>>>,
    profiles: VecDeque<Scripted<UserProfile>>,
    recommendations: VecDeque<Scripted<Vec<RecommendedItem>>>,
}

/// Scripted in-memory backend.
///
/// Responses are queued per kind and consumed in order. Route mutations,
/// finalize and route lookups share one queue of route documents, as profile
/// reads and updates share one queue of profiles. Searches are
/// keyed by query text and default to an empty list. An empty queue answers
/// with a 500 status error so a missing script fails loudly.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

fn next<T>(queue: &mut VecDeque<Scripted<T>>, what: &str) -> Result<T, ApiClientError> {
    match queue.pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(failure)) => Err(failure.to_error()),
        None => Err(ApiClientError::Status {
            status: 500,
            detail: format!("no scripted {} response", what),
        }),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // === Scripting ===

    pub fn queue_query(&self, response: Scripted<QueryResponse>) -> &Self {
        self.state.lock().queries.push_back(response);
        self
    }

    pub fn queue_route(&self, route: RouteDocument) -> &Self {
        self.queue_query(Ok(QueryResponse::Route(route)))
    }

    pub fn queue_clarification(&self, missing_fields: &[&str], message: Option<&str>) -> &Self {
        self.queue_query(Ok(QueryResponse::Clarification(fixtures::clarification(
            missing_fields,
            message,
        ))))
    }

    /// Queue the document answering the next finalize, add, replace, delete
    /// or route lookup.
    pub fn queue_route_result(&self, result: Scripted<RouteDocument>) -> &Self {
        self.state.lock().routes.push_back(result);
        self
    }

    pub fn set_search_results(&self, query: &str, result: Scripted<Vec<SearchItem>>) -> &Self {
        self.state.lock().searches.insert(query.to_string(), result);
        self
    }

    pub fn queue_review_list(&self, result: Scripted<Vec<Review>>) -> &Self {
        self.state.lock().review_lists.push_back(result);
        self
    }

    pub fn queue_created_review(&self, result: Scripted<Review>) -> &Self {
        self.state.lock().created_reviews.push_back(result);
        self
    }

    pub fn queue_login(&self, result: Scripted<LoginResponse>) -> &Self {
        self.state.lock().logins.push_back(result);
        self
    }

    pub fn queue_registration(&self, result: Scripted<UserProfile>) -> &Self {
        self.state.lock().registrations.push_back(result);
        self
    }

    pub fn queue_history(&self, result: Scripted<Vec<QueryHistoryEntry>>) -> &Self {
        self.state.lock().histories.push_back(result);
        self
    }

    /// Queue the profile answering the next profile read or update.
    pub fn queue_profile(&self, result: Scripted<UserProfile>) -> &Self {
        self.state.lock().profiles.push_back(result);
        self
    }

    pub fn queue_recommendations(&self, result: Scripted<Vec<RecommendedItem>>) -> &Self {
        self.state.lock().recommendations.push_back(result);
        self
    }

    // === Inspection ===

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Query texts of every search that actually reached the backend.
    pub fn search_queries(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SearchItems { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn submitted_queries(&self) -> Vec<QueryRequest> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SubmitQuery { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().calls.push(call);
    }

    fn next_route(&self) -> Result<RouteDocument, ApiClientError> {
        next(&mut self.state.lock().routes, "route")
    }
}

#[async_trait]
impl TripBackend for MockBackend {
    async fn submit_query(
        &self,
        user_id: UserId,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiClientError> {
        self.record(BackendCall::SubmitQuery {
            user_id,
            request: request.clone(),
        });
        next(&mut self.state.lock().queries, "query")
    }

    async fn finalize_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError> {
        self.record(BackendCall::FinalizeRoute { user_id, route_id });
        self.next_route()
    }

    async fn add_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError> {
        self.record(BackendCall::AddPoi {
            user_id,
            route_id,
            item,
        });
        self.next_route()
    }

    async fn replace_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError> {
        self.record(BackendCall::ReplacePoi {
            user_id,
            route_id,
            map_id,
            item,
        });
        self.next_route()
    }

    async fn delete_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
    ) -> Result<RouteDocument, ApiClientError> {
        self.record(BackendCall::DeletePoi {
            user_id,
            route_id,
            map_id,
        });
        self.next_route()
    }

    async fn search_items(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, ApiClientError> {
        self.record(BackendCall::SearchItems {
            query: query.to_string(),
            limit,
        });
        match self.state.lock().searches.get(query) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn list_reviews(&self, target: ItemRef) -> Result<Vec<Review>, ApiClientError> {
        self.record(BackendCall::ListReviews { target });
        next(&mut self.state.lock().review_lists, "review list")
    }

    async fn create_review(
        &self,
        user_id: UserId,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError> {
        self.record(BackendCall::CreateReview {
            user_id,
            request: request.clone(),
        });
        next(&mut self.state.lock().created_reviews, "create review")
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiClientError> {
        self.record(BackendCall::Login {
            email: credentials.email.clone(),
        });
        next(&mut self.state.lock().logins, "login")
    }

    async fn register(&self, credentials: &Credentials) -> Result<UserProfile, ApiClientError> {
        self.record(BackendCall::Register {
            email: credentials.email.clone(),
        });
        next(&mut self.state.lock().registrations, "registration")
    }

    async fn get_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError> {
        self.record(BackendCall::GetRoute { user_id, route_id });
        self.next_route()
    }

    async fn query_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<QueryHistoryEntry>, ApiClientError> {
        self.record(BackendCall::QueryHistory { user_id });
        next(&mut self.state.lock().histories, "history")
    }

    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, ApiClientError> {
        self.record(BackendCall::GetProfile { user_id });
        next(&mut self.state.lock().profiles, "profile")
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> Result<UserProfile, ApiClientError> {
        self.record(BackendCall::UpdateProfile {
            user_id,
            update: update.clone(),
        });
        next(&mut self.state.lock().profiles, "profile")
    }

    async fn recommendations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecommendedItem>, ApiClientError> {
        self.record(BackendCall::Recommendations { user_id });
        next(&mut self.state.lock().recommendations, "recommendations")
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Tripweave types.

    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    pub fn arb_route_id() -> impl Strategy<Value = RouteId> {
        (1i64..100_000).prop_map(RouteId::new)
    }

    pub fn arb_currency() -> impl Strategy<Value = Currency> {
        prop_oneof![
            Just(Currency::Rub),
            Just(Currency::Usd),
            Just(Currency::Eur),
            Just(Currency::Gbp),
        ]
    }

    pub fn arb_item_ref() -> impl Strategy<Value = ItemRef> {
        prop_oneof![
            (1i64..10_000).prop_map(|id| ItemRef::Location(LocationId::new(id))),
            (1i64..10_000).prop_map(|id| ItemRef::Activity(ActivityId::new(id))),
        ]
    }

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..3650).prop_map(|offset| {
            fixtures::base_date() + Duration::days(offset)
        })
    }

    /// Parameters that pass validation.
    pub fn arb_valid_parameters() -> impl Strategy<Value = QueryParameters> {
        (
            arb_date(),
            0i64..60,
            proptest::option::of(0.0f64..1_000_000.0),
            arb_currency(),
        )
            .prop_map(|(start, days, budget, currency)| QueryParameters {
                start_date: start,
                end_date: start + Duration::days(days),
                budget,
                budget_currency: currency,
            })
    }

    /// Parameters whose end date precedes the start date.
    pub fn arb_inverted_parameters() -> impl Strategy<Value = QueryParameters> {
        (arb_date(), 1i64..60, arb_currency()).prop_map(|(start, back, currency)| {
            QueryParameters {
                start_date: start,
                end_date: start - Duration::days(back),
                budget: None,
                budget_currency: currency,
            }
        })
    }

    /// A route with 0..8 points, unique map ids and server-defined order.
    pub fn arb_route_document() -> impl Strategy<Value = RouteDocument> {
        (
            arb_route_id(),
            proptest::collection::vec("[A-Za-z ]{1,20}", 0..8),
            any::<bool>(),
        )
            .prop_map(|(route_id, names, is_finalized)| {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                let mut route = fixtures::route(route_id.value(), &names);
                route.is_finalized = is_finalized;
                route
            })
    }

    /// Free text that is not blank.
    pub fn arb_query_text() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ,.]{0,60}"
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common test scenarios.

    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tripweave_client::{EditorSettings, SearchSettings};

    /// Fixed reference date so tests never depend on the clock.
    pub fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap_or_default()
    }

    pub fn params() -> QueryParameters {
        QueryParameters::starting(base_date())
    }

    pub fn settings() -> EditorSettings {
        EditorSettings {
            search: SearchSettings {
                debounce: Duration::from_millis(500),
                limit: 10,
                min_query_chars: 2,
            },
            notice_ttl: Duration::from_secs(3),
        }
    }

    pub fn poi(map_id: i64, visit_order: i32, name: &str) -> PoiEntry {
        PoiEntry {
            map_id: MapId::new(map_id),
            visit_order,
            location_id: LocationId::new(map_id + 1000),
            location_name: name.to_string(),
            location_type: Some("museum".to_string()),
            location_description: None,
            activity_id: None,
            activity_name: None,
            activity_description: None,
            latitude: None,
            longitude: None,
            visit_duration_hours: Some(2.0),
        }
    }

    /// A draft route whose points get map ids `route_id * 100 + i` and visit
    /// order `i`.
    pub fn route(route_id: i64, names: &[&str]) -> RouteDocument {
        let points_of_interest = names
            .iter()
            .enumerate()
            .map(|(idx, name)| poi(route_id * 100 + idx as i64, idx as i32, name))
            .collect();
        RouteDocument {
            route_id: RouteId::new(route_id),
            query_id: Some(QueryId::new(route_id)),
            total_cost: Some(250.0),
            total_cost_currency: Some("RUB".to_string()),
            duration_days: Some(3),
            route_text: format!("Route {}", route_id),
            is_finalized: false,
            points_of_interest,
        }
    }

    pub fn finalized(mut route: RouteDocument) -> RouteDocument {
        route.is_finalized = true;
        route
    }

    pub fn clarification(missing_fields: &[&str], message: Option<&str>) -> ClarificationRequired {
        ClarificationRequired {
            status: ClarificationStatus::ClarificationRequired,
            missing_fields: missing_fields.iter().map(|f| f.to_string()).collect(),
            message: message.map(str::to_string),
        }
    }

    pub fn search_item(id: i64, item_type: ItemType, name: &str) -> SearchItem {
        SearchItem {
            id,
            item_type,
            name: name.to_string(),
            description: None,
            city: Some("Paris".to_string()),
            country: Some("France".to_string()),
        }
    }

    /// Profile of `user_id` with an empty travel preference set.
    pub fn profile(user_id: i64, email: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(user_id),
            email: email.to_string(),
            interests: None,
            travel_style: None,
            budget: None,
            budget_currency: None,
            created_at: base_date().and_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }

    pub fn recommended(
        id: i64,
        item_type: ItemType,
        name: &str,
        rating: Option<f64>,
    ) -> RecommendedItem {
        RecommendedItem {
            id,
            name: name.to_string(),
            item_type,
            description: None,
            rating,
            city: Some("Rome".to_string()),
            country: Some("Italy".to_string()),
        }
    }

    pub fn review(id: i64, rating: u8, target: ItemRef, comment: Option<&str>) -> Review {
        let (location_id, activity_id) = match target {
            ItemRef::Location(id) => (Some(id), None),
            ItemRef::Activity(id) => (None, Some(id)),
        };
        Review {
            id: ReviewId::new(id),
            rating,
            comment: comment.map(str::to_string),
            review_date: base_date().and_hms_opt(12, 0, 0).unwrap_or_default(),
            user_id: UserId::new(1),
            location_id,
            activity_id,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over client state.

    use super::*;
    use std::collections::HashSet;
    use tripweave_client::{Transcript, TurnEntry};

    /// No route id appears in more than one `SystemRoute` entry.
    pub fn assert_unique_route_entries(transcript: &Transcript) {
        let mut seen = HashSet::new();
        for route in transcript.routes() {
            assert!(
                seen.insert(route.route_id),
                "route {} appears twice in the transcript",
                route.route_id
            );
        }
    }

    pub fn assert_last_entry_is_error(transcript: &Transcript) {
        match transcript.last() {
            Some(entry) if entry.is_error() => {}
            other => panic!("expected an error entry, got {:?}", other),
        }
    }

    pub fn assert_last_system_text(transcript: &Transcript, expected: &str) {
        match transcript.last() {
            Some(TurnEntry::System { text, .. }) => assert_eq!(text, expected),
            other => panic!("expected a system entry, got {:?}", other),
        }
    }
}
