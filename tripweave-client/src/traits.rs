//! Common traits for client components

use crate::api_client::ApiClientError;
use async_trait::async_trait;
use tripweave_core::{
    CreateReviewRequest, Credentials, ItemRef, LoginResponse, MapId, QueryHistoryEntry,
    QueryRequest, QueryResponse, RecommendedItem, Review, RouteDocument, RouteId, SearchItem,
    UserId, UserProfile, UserProfileUpdate,
};

/// The backend operations the client depends on.
///
/// [`crate::api_client::RestClient`] implements this over HTTP; tests plug in a
/// scripted implementation. Every authenticated call takes the user id
/// explicitly, so components must resolve the session before calling.
#[async_trait]
pub trait TripBackend: Send + Sync {
    /// `POST /queries/`
    async fn submit_query(
        &self,
        user_id: UserId,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiClientError>;

    /// `POST /routes/{route_id}/finalize`
    async fn finalize_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError>;

    /// `POST /routes/{route_id}/locations`
    async fn add_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError>;

    /// `PUT /routes/{route_id}/locations/{map_id}`
    async fn replace_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError>;

    /// `DELETE /routes/{route_id}/locations/{map_id}`
    async fn delete_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
    ) -> Result<RouteDocument, ApiClientError>;

    /// `GET /search/items?query=&limit=`
    async fn search_items(&self, query: &str, limit: u32)
        -> Result<Vec<SearchItem>, ApiClientError>;

    /// `GET /reviews/{target_type}/{target_id}`
    async fn list_reviews(&self, target: ItemRef) -> Result<Vec<Review>, ApiClientError>;

    /// `POST /reviews/`
    async fn create_review(
        &self,
        user_id: UserId,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError>;

    /// `POST /users/login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiClientError>;

    /// `POST /users/register`
    async fn register(&self, credentials: &Credentials) -> Result<UserProfile, ApiClientError>;

    /// `GET /routes/{route_id}`
    async fn get_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError>;

    /// `GET /queries/history/{user_id}`
    async fn query_history(&self, user_id: UserId)
        -> Result<Vec<QueryHistoryEntry>, ApiClientError>;

    /// `GET /users/profile/{user_id}`
    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, ApiClientError>;

    /// `PUT /users/profile/{user_id}`
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> Result<UserProfile, ApiClientError>;

    /// `GET /recommendations/personalized`
    async fn recommendations(&self, user_id: UserId)
        -> Result<Vec<RecommendedItem>, ApiClientError>;
}
