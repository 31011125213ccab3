use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::trello::{ClientSettings, Credentials};

/// Default Trello REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

/// Default per-request network timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Trello API credentials are not configured ({missing}). Set TRELLO_API_KEY and TRELLO_TOKEN env vars."
    )]
    MissingCredentials { missing: String },

    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("Invalid timeout in TRELLO_TIMEOUT_SECS: {0}")]
    InvalidTimeout(String),
}

/// Configuration for the Trello MCP server, read once at startup
#[derive(Clone)]
pub struct Config {
    /// Trello API key (validated lazily, see [`Config::credentials`])
    pub api_key: Option<String>,

    /// Trello user token
    pub token: Option<String>,

    /// Base URL every request path is appended to
    pub base_url: String,

    /// Network timeout applied to every upstream request
    pub timeout: Duration,

    /// Board selected at startup
    pub active_board_id: Option<String>,

    /// Workspace (organization) selected at startup
    pub active_workspace_id: Option<String>,

    /// Verbose request/response diagnostics
    pub debug: bool,

    /// Deployment label reported by `get_server_info`
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            active_board_id: None,
            active_workspace_id: None,
            debug: false,
            environment: "development".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("active_board_id", &self.active_board_id)
            .field("active_workspace_id", &self.active_workspace_id)
            .field("debug", &self.debug)
            .field("environment", &self.environment)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing credentials are not an error here: the server has to come up
    /// and list its tools before anyone supplies them. They are checked by
    /// [`Config::credentials`] when the first upstream call is made.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = non_empty_var("TRELLO_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self::validate_base_url(&base_url)?;

        let timeout = match non_empty_var("TRELLO_TIMEOUT_SECS") {
            Some(raw) => Self::parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            api_key: non_empty_var("TRELLO_API_KEY"),
            token: non_empty_var("TRELLO_TOKEN"),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            active_board_id: non_empty_var("TRELLO_BOARD_ID"),
            active_workspace_id: non_empty_var("TRELLO_WORKSPACE_ID"),
            debug: debug_enabled(),
            environment: non_empty_var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
        })
    }

    /// Validate and return the credential pair
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(
            self.api_key.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        )
    }

    /// Settings for constructing the request bridge
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            debug: self.debug,
        }
    }

    fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            var: "TRELLO_BASE_URL",
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl {
                var: "TRELLO_BASE_URL",
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
        let secs: u64 = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout(format!("'{}' is not a number", raw)))?;

        if secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Duration::from_secs(secs))
    }
}

/// Whether `MCP_DEBUG` is set to a truthy value
pub fn debug_enabled() -> bool {
    non_empty_var("MCP_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
