//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Admin API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Base URL of the remote voice platform API.
    pub platform_api_url: String,
    /// Process-wide fallback platform API key. Organizations without a
    /// key of their own use this one.
    pub platform_api_key: Option<String>,
    /// Shared secret for inbound webhook signatures. Organizations may
    /// override it per tenant; without either, webhooks are rejected as a
    /// server misconfiguration.
    pub webhook_secret: Option<String>,
    /// Externally reachable base URL of this server, registered as the
    /// webhook target when provisioning agents.
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8789` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:voicedesk.db?mode=rwc` |
    /// | `VOICEAI_API_URL` | Voice platform base URL | (required) |
    /// | `VOICEAI_API_KEY` | Fallback platform API key | (optional) |
    /// | `VOICEAI_WEBHOOK_SECRET` | Webhook signing secret | (optional) |
    /// | `PUBLIC_BASE_URL` | Public base URL of this server | (required) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8789".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:voicedesk.db?mode=rwc".to_string());

        let platform_api_url =
            env::var("VOICEAI_API_URL").map_err(|_| ConfigError::MissingPlatformUrl)?;

        let platform_api_key = env::var("VOICEAI_API_KEY").ok().filter(|k| !k.is_empty());

        let webhook_secret = env::var("VOICEAI_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map_err(|_| ConfigError::MissingPublicBaseUrl)?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            addr,
            database_url,
            platform_api_url,
            platform_api_key,
            webhook_secret,
            public_base_url,
        })
    }

    /// The webhook URL registered with newly provisioned agents.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhooks/voiceai", self.public_base_url)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("VOICEAI_API_URL environment variable is required")]
    MissingPlatformUrl,

    #[error("PUBLIC_BASE_URL environment variable is required")]
    MissingPublicBaseUrl,
}
