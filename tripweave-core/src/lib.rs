//! Tripweave Core - Entity Types
//!
//! Data types shared by the client and its test utilities: typed identifiers,
//! route documents, query payloads, reviews, search results, profiles and
//! recommendations. This crate performs no I/O.

pub mod enums;
pub mod error;
pub mod identity;
pub mod query;
pub mod recommendation;
pub mod review;
pub mod route;
pub mod search;
pub mod time;
pub mod user;

pub use enums::{Currency, CurrencyParseError, ItemRef, ItemType};
pub use error::{ValidationError, ValidationResult};
pub use identity::{
    ActivityId, EntityIdParseError, EntityIdType, LocationId, MapId, QueryId, ReviewId, RouteId,
    UserId,
};
pub use query::{
    parse_budget, ClarificationField, ClarificationRequired, ClarificationStatus,
    QueryHistoryEntry, QueryParameters, QueryRequest, QueryResponse,
};
pub use recommendation::RecommendedItem;
pub use review::{is_valid_rating, CreateReviewRequest, Review, MAX_RATING, MIN_RATING};
pub use route::{AddPoiRequest, PoiEntry, ReplacePoiRequest, RouteDocument};
pub use search::{SearchItem, SearchQuery};
pub use time::{parse_timestamp, Timestamp};
pub use user::{
    join_interests, split_interests, Credentials, LoginResponse, ProfileField, UserProfile,
    UserProfileUpdate, INTEREST_SEPARATOR,
};
