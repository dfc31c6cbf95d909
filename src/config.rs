use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::catalog::RetryPolicy;

/// Application configuration loaded from environment variables.
///
/// All settings can be configured via environment variables with the `MOODLIST_` prefix.
/// For example: `MOODLIST_SERVER__PORT=8000`, `MOODLIST_CLASSIFIER__ENABLED=false`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Emotion classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Music catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Retry policy for catalog calls
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Disable to run without a classifier (moods are then picked at random)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Text-classification model (Hugging Face model ID)
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// Inference API base URL
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_classifier_model(),
            endpoint: default_classifier_endpoint(),
            api_token: None,
            timeout_secs: default_classifier_timeout(),
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_classifier_model() -> String {
    "bhadresh-savani/distilbert-base-uncased-emotion".to_string()
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_classifier_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Web API base URL
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            timeout_secs: default_catalog_timeout(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_catalog_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_catalog_timeout() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per catalog call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    4000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistConfig {
    /// Tracks per playlist when the request does not say
    #[serde(default = "default_playlist_limit")]
    pub default_limit: usize,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            default_limit: default_playlist_limit(),
        }
    }
}

fn default_playlist_limit() -> usize {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin browser requests from any origin
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl ServerConfig {
    /// Returns the socket address for binding the server
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid listen address: {e}")))
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables should be prefixed with `MOODLIST_` and use
    /// double underscores for nested values:
    /// - `MOODLIST_CLASSIFIER__MODEL` -> classifier.model
    /// - `MOODLIST_CATALOG__BASE_URL` -> catalog.base_url
    /// - `MOODLIST_RETRY__MAX_ATTEMPTS` -> retry.max_attempts
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MOODLIST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert!(config.classifier.enabled);
        assert_eq!(
            config.classifier.model,
            "bhadresh-savani/distilbert-base-uncased-emotion"
        );
        assert!(config.classifier.api_token.is_none());
        assert_eq!(config.catalog.base_url, "https://api.spotify.com/v1");
        assert_eq!(config.playlist.default_limit, 15);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = RetryConfig::default().policy();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        let addr = server.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(server.cors);
    }

    #[test]
    fn test_invalid_socket_addr() {
        let server = ServerConfig {
            host: "not a host".to_string(),
            port: 1,
            cors: false,
        };
        assert!(server.socket_addr().is_err());
    }
}
