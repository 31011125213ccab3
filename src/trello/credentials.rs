use crate::config::ConfigError;
use crate::trello::client::QueryParams;

/// Query parameter names Trello expects the credentials under
pub const KEY_PARAM: &str = "key";
pub const TOKEN_PARAM: &str = "token";

/// API key and user token for the Trello REST API.
///
/// Immutable once built. `Debug` never prints the values.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    token: String,
}

impl Credentials {
    /// Build a credential pair, rejecting empty values
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let token = token.into();

        let mut missing = Vec::new();
        if api_key.trim().is_empty() {
            missing.push("TRELLO_API_KEY");
        }
        if token.trim().is_empty() {
            missing.push("TRELLO_TOKEN");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials {
                missing: missing.join(", "),
            });
        }

        Ok(Self { api_key, token })
    }

    /// Append both credentials to an outbound query
    pub fn apply(&self, params: &mut QueryParams) {
        params.push((KEY_PARAM, self.api_key.clone()));
        params.push((TOKEN_PARAM, self.token.clone()));
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("token", &"***")
            .finish()
    }
}
