//! REST client for the Tripweave backend.

use crate::config::ClientConfig;
use crate::traits::TripBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tripweave_core::{
    AddPoiRequest, CreateReviewRequest, Credentials, ItemRef, LoginResponse, MapId,
    QueryHistoryEntry, QueryRequest, QueryResponse, RecommendedItem, ReplacePoiRequest, Review,
    RouteDocument, RouteId, SearchItem, SearchQuery, UserId, UserProfile, UserProfileUpdate,
};

/// Header carrying the authenticated user id on every user-scoped request.
pub const USER_ID_HEADER: &str = "X-User-ID";

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    /// The request could not complete (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ApiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl ApiClientError {
    /// The bare reason: the server's detail for status errors, the
    /// transport message for network errors.
    pub fn detail(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            Self::Network(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Text shown to the user when a query fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { detail, .. } => format!("Error: {}", detail),
            Self::Network(message) => format!("Network error: {}", message),
            other => format!("Error: {}", other),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Turn an error body into a readable detail string.
///
/// A string `detail` is used verbatim. A structured `detail` (validation
/// errors) is flattened into `key: json, key: json`. Bodies without a
/// `detail` fall back to the status code.
pub fn extract_error_detail(status: u16, body: &str) -> String {
    let fallback = || format!("request failed with status {}", status);
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };
    match parsed.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Object(fields)) => {
            let joined = fields
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Validation error: {}", joined)
        }
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .enumerate()
                .map(|(index, value)| format!("{}: {}", index, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Validation error: {}", joined)
        }
        Some(Value::Null) | None => fallback(),
        Some(other) => other.to_string(),
    }
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        Self::with_timeout(
            &config.api_base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Point the client at another server, keeping the HTTP pool.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        user_id: Option<UserId>,
    ) -> reqwest::RequestBuilder {
        tracing::debug!(method = %method, path, user_id = ?user_id, "backend request");
        let request = self.client.request(method, self.url(path));
        match user_id {
            Some(user_id) => request.header(USER_ID_HEADER, user_id.to_string()),
            None => request,
        }
    }

    async fn get_json<T, Q>(
        &self,
        path: &str,
        user_id: Option<UserId>,
        query: Option<&Q>,
    ) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut request = self.request(reqwest::Method::GET, path, user_id);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn send_json<T, B>(
        &self,
        method: reqwest::Method,
        path: &str,
        user_id: Option<UserId>,
        body: Option<&B>,
    ) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let mut request = self.request(method, path, user_id);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return serde_json::from_str(&text).map_err(|err| {
                tracing::warn!(status = status.as_u16(), error = %err, "undecodable backend response");
                ApiClientError::from(err)
            });
        }
        let detail = extract_error_detail(status.as_u16(), &text);
        tracing::warn!(status = status.as_u16(), detail = %detail, "backend returned an error");
        Err(ApiClientError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl TripBackend for RestClient {
    async fn submit_query(
        &self,
        user_id: UserId,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiClientError> {
        self.send_json(reqwest::Method::POST, "/queries/", Some(user_id), Some(request))
            .await
    }

    async fn finalize_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError> {
        let path = format!("/routes/{}/finalize", route_id);
        self.send_json::<_, ()>(reqwest::Method::POST, &path, Some(user_id), None)
            .await
    }

    async fn add_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError> {
        let path = format!("/routes/{}/locations", route_id);
        let body = AddPoiRequest::from(item);
        self.send_json(reqwest::Method::POST, &path, Some(user_id), Some(&body))
            .await
    }

    async fn replace_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
        item: ItemRef,
    ) -> Result<RouteDocument, ApiClientError> {
        let path = format!("/routes/{}/locations/{}", route_id, map_id);
        let body = ReplacePoiRequest::from(item);
        self.send_json(reqwest::Method::PUT, &path, Some(user_id), Some(&body))
            .await
    }

    async fn delete_poi(
        &self,
        user_id: UserId,
        route_id: RouteId,
        map_id: MapId,
    ) -> Result<RouteDocument, ApiClientError> {
        let path = format!("/routes/{}/locations/{}", route_id, map_id);
        self.send_json::<_, ()>(reqwest::Method::DELETE, &path, Some(user_id), None)
            .await
    }

    async fn search_items(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, ApiClientError> {
        let params = SearchQuery { query, limit };
        self.get_json("/search/items", None, Some(&params)).await
    }

    async fn list_reviews(&self, target: ItemRef) -> Result<Vec<Review>, ApiClientError> {
        let path = format!("/reviews/{}/{}", target.item_type(), target.raw_id());
        self.get_json::<_, ()>(&path, None, None).await
    }

    async fn create_review(
        &self,
        user_id: UserId,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiClientError> {
        self.send_json(reqwest::Method::POST, "/reviews/", Some(user_id), Some(request))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiClientError> {
        self.send_json(reqwest::Method::POST, "/users/login", None, Some(credentials))
            .await
    }

    async fn register(&self, credentials: &Credentials) -> Result<UserProfile, ApiClientError> {
        self.send_json(reqwest::Method::POST, "/users/register", None, Some(credentials))
            .await
    }

    async fn get_route(
        &self,
        user_id: UserId,
        route_id: RouteId,
    ) -> Result<RouteDocument, ApiClientError> {
        let path = format!("/routes/{}", route_id);
        self.get_json::<_, ()>(&path, Some(user_id), None).await
    }

    async fn query_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<QueryHistoryEntry>, ApiClientError> {
        let path = format!("/queries/history/{}", user_id);
        self.get_json::<_, ()>(&path, Some(user_id), None).await
    }

    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, ApiClientError> {
        let path = format!("/users/profile/{}", user_id);
        self.get_json::<_, ()>(&path, None, None).await
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> Result<UserProfile, ApiClientError> {
        let path = format!("/users/profile/{}", user_id);
        self.send_json(reqwest::Method::PUT, &path, None, Some(update))
            .await
    }

    async fn recommendations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecommendedItem>, ApiClientError> {
        self.get_json::<_, ()>("/recommendations/personalized", Some(user_id), None)
            .await
    }
}
