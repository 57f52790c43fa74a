//! Application configuration module
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment overrides.
//!
//! ```toml
//! api_base_url = "https://drafts.example.com/api/"
//! request_timeout_secs = 60
//! indentable_types = ["paragraph", "heading", "blockquote"]
//!
//! [retry]
//! max_retries = 5
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `LEXDRAFT_API_BASE_URL` | `api_base_url` |
//! | `LEXDRAFT_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |

use crate::editor::node::NodeType;
use crate::offline::retry::RetryPolicy;
use crate::shared::document_id::DocumentId;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default API base URL
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_BASE_URL: &str = "LEXDRAFT_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LEXDRAFT_REQUEST_TIMEOUT_SECS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the document store's HTTP API
    pub api_base_url: String,
    /// Per-request timeout for HTTP calls
    pub request_timeout_secs: u64,
    /// Backoff for HTTP calls
    pub retry: RetryPolicy,
    /// Node types the indent commands apply to
    pub indentable_types: Vec<NodeType>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            indentable_types: vec![NodeType::Paragraph, NodeType::Heading],
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.api_base_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::InvalidValue {
                key: "retry.max_delay_ms",
                message: "must not be smaller than retry.base_delay_ms".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// `<config dir>/lexdraft/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lexdraft").join("config.toml"))
    }

    /// Defaults, then the default config file if present, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("[Config] Loading {}", path.display());
                Self::load_file(&path)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LEXDRAFT_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: "request_timeout_secs",
                        message: e.to_string(),
                    })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API base as a URL that relative endpoint paths can be joined onto
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let mut base = self.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|_| ConfigError::InvalidUrl(self.api_base_url.clone()))
    }

    /// Transport URL for a document, derived from the API base
    ///
    /// The HTTP API lives under `/api/` while the socket route lives at the
    /// root, so a trailing `/api` segment is dropped.
    ///
    /// # Example
    /// ```rust
    /// use lexdraft::shared::{AppConfig, DocumentId};
    ///
    /// let config = AppConfig::builder()
    ///     .api_base_url("https://drafts.example.com/api/")
    ///     .build()
    ///     .unwrap();
    /// let id = DocumentId::parse("abc").unwrap();
    /// assert_eq!(
    ///     config.websocket_url(&id).unwrap(),
    ///     "wss://drafts.example.com/ws/document/abc/"
    /// );
    /// ```
    pub fn websocket_url(&self, document_id: &DocumentId) -> Result<String, ConfigError> {
        let url = self.api_url()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        let host = url
            .host_str()
            .ok_or_else(|| ConfigError::InvalidUrl(self.api_base_url.clone()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut base_path = url.path().trim_end_matches('/').to_string();
        if base_path.to_ascii_lowercase().ends_with("/api") {
            base_path.truncate(base_path.len() - "/api".len());
        }
        let base_path = base_path.trim_end_matches('/');

        Ok(format!(
            "{}://{}{}/ws/document/{}/",
            scheme, authority, base_path, document_id
        ))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    indentable_types: Option<Vec<NodeType>>,
}

impl AppConfigBuilder {
    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn indentable_types(mut self, types: Vec<NodeType>) -> Self {
        self.indentable_types = Some(types);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            request_timeout_secs: self
                .request_timeout
                .map(|timeout| timeout.as_secs())
                .unwrap_or(defaults.request_timeout_secs),
            retry: self.retry.unwrap_or(defaults.retry),
            indentable_types: self.indentable_types.unwrap_or(defaults.indentable_types),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
