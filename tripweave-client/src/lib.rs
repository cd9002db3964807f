//! Tripweave client library exports.

pub mod api_client;
pub mod app;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod edit_session;
pub mod error;
pub mod notifications;
pub mod poi_search;
pub mod profile;
pub mod reviews;
pub mod session;
pub mod telemetry;
pub mod traits;
pub mod transcript;
pub mod views;

pub use api_client::{ApiClientError, RestClient};
pub use conversation::{Conversation, ConversationError, ConversationPhase};
pub use edit_session::{Confirmation, EditError, EditorSettings, RouteEditSession};
pub use poi_search::{PoiSearch, PoiSelection, SearchMode, SearchSettings};
pub use profile::{ProfileError, ProfilePanel, RecommendationList};
pub use reviews::{ReviewError, ReviewPanel};
pub use session::{SessionContext, SessionError, SessionStore};
pub use traits::TripBackend;
pub use transcript::{Transcript, TurnEntry};
