//! Error types for the client binary.

use crate::api_client::ApiClientError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}
