//! Configuration loading for the Tripweave client.
//!
//! All fields are required. No defaults.

use crate::edit_session::EditorSettings;
use crate::poi_search::SearchSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "TRIPWEAVE_CONFIG";

/// Upper bound for `search.limit`.
pub const MAX_SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub session_path: PathBuf,
    pub notice_ttl_ms: u64,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub limit: u32,
    pub min_query_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or TRIPWEAVE_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.session_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.notice_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notice_ttl_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.debounce_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.search.limit == 0 || self.search.limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "search.limit",
                reason: format!("must be between 1 and {}", MAX_SEARCH_LIMIT),
            });
        }
        if self.search.min_query_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.min_query_chars",
                reason: "must be > 0".to_string(),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.search.debounce_ms),
            limit: self.search.limit,
            min_query_chars: self.search.min_query_chars,
        }
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            search: self.search_settings(),
            notice_ttl: Duration::from_millis(self.notice_ttl_ms),
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
api_base_url = "http://localhost:8000"
request_timeout_ms = 30000
session_path = "/tmp/tripweave-session.json"
notice_ttl_ms = 3000

[search]
debounce_ms = 500
limit = 10
min_query_chars = 2

[logging]
filter = "tripweave=info"
format = "pretty"
"#;

    #[test]
    fn parses_and_validates_full_config() {
        let config = ClientConfig::from_toml(VALID).unwrap();
        config.validate().unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        let search = config.search_settings();
        assert_eq!(search.debounce, Duration::from_millis(500));
        assert_eq!(search.limit, 10);
        assert_eq!(config.editor_settings().notice_ttl, Duration::from_secs(3));
    }

    #[test]
    fn rejects_unknown_fields() {
        let contents = format!("{}\nextra = true\n", VALID);
        assert!(matches!(
            ClientConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_search_limit() {
        let mut config = ClientConfig::from_toml(VALID).unwrap();
        config.search.limit = 51;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "search.limit"),
            other => panic!("expected invalid search.limit, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = ClientConfig::from_toml(VALID).unwrap();
        config.api_base_url = "localhost:8000".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "api_base_url",
                ..
            })
        ));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let contents = VALID.replace("[logging]\nfilter = \"tripweave=info\"\nformat = \"pretty\"\n", "");
        assert!(matches!(
            ClientConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }
}
