use crate::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::trello::credentials::{Credentials, KEY_PARAM, TOKEN_PARAM};
use crate::trello::types::{Board, BoardList, Card, CardUpdate, NewCard};
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Ordered query parameters for one upstream call
pub type QueryParams = Vec<(&'static str, String)>;

/// Placeholder shown instead of credential values in diagnostics
pub const MASK: &str = "***";

/// Error types for Trello API operations
#[derive(Debug, thiserror::Error)]
pub enum TrelloError {
    #[error("Trello API error {status}: {body}")]
    Api { status: u16, body: Value },

    /// Network or protocol failure; no status code is available
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl TrelloError {
    /// Status code of an upstream rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            TrelloError::Api { status, .. } => Some(*status),
            TrelloError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

impl From<reqwest::Error> for TrelloError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries key and token in its query string
        TrelloError::Http(err.without_url())
    }
}

/// Connection settings for [`TrelloClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Log every request and response status at debug level
    pub debug: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }
}

/// Replace credential values with [`MASK`] for logging
pub fn mask_params(params: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
    params
        .iter()
        .map(|(k, v)| {
            if *k == KEY_PARAM || *k == TOKEN_PARAM {
                (*k, MASK.to_string())
            } else {
                (*k, v.clone())
            }
        })
        .collect()
}

/// Trello API client.
///
/// Every request gets the credentials merged into its query string. There is
/// no retry: one call in, one response or one error out.
pub struct TrelloClient {
    http_client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    debug: bool,
}

impl TrelloClient {
    /// Create a new Trello API client
    pub fn new(credentials: Credentials, settings: ClientSettings) -> Result<Self, TrelloError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("trello-mcp-server/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http_client,
            credentials,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            debug: settings.debug,
        })
    }

    /// Issue one authenticated request and return the parsed payload.
    ///
    /// Bodies that are not JSON come back as `{"text": <body>}`. Any status
    /// of 400 or above becomes [`TrelloError::Api`] carrying that body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<Value, TrelloError> {
        let mut query: QueryParams = params.to_vec();
        self.credentials.apply(&mut query);

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let url = format!("{}{}", self.base_url, path);

        if self.debug {
            debug!(
                method = %method,
                path = %path,
                params = ?mask_params(&query),
                "Trello request"
            );
        }

        let mut request = self.http_client.request(method.clone(), &url).query(&query);
        if let Some(body_value) = body {
            request = request.json(body_value);
        }

        let response = request.send().await?;
        let status = response.status();

        if self.debug {
            debug!(method = %method, path = %path, status = status.as_u16(), "Trello response");
        }

        let text = response.text().await?;
        let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));

        if status.as_u16() >= 400 {
            warn!(
                status = status.as_u16(),
                method = %method,
                path = %path,
                body = %data,
                "Trello API error"
            );
            return Err(TrelloError::Api {
                status: status.as_u16(),
                body: data,
            });
        }

        Ok(data)
    }

    /// Make an authenticated GET request
    pub async fn get(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value, TrelloError> {
        self.request(Method::GET, path, params, None).await
    }

    /// Make an authenticated POST request
    pub async fn post(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value, TrelloError> {
        self.request(Method::POST, path, params, None).await
    }

    /// Make an authenticated PUT request
    pub async fn put(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value, TrelloError> {
        self.request(Method::PUT, path, params, None).await
    }

    pub async fn get_board(&self, board_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/boards/{}", board_id);
        self.get(&path, &[("fields", Board::FIELDS.to_string())]).await
    }

    /// Boards visible to the token's member
    pub async fn list_boards(&self) -> Result<Value, TrelloError> {
        self.get("/members/me/boards", &[("fields", Board::FIELDS.to_string())])
            .await
    }

    pub async fn list_boards_in_workspace(&self, workspace_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/organizations/{}/boards", workspace_id);
        self.get(&path, &[("fields", Board::FIELDS.to_string())]).await
    }

    pub async fn get_lists(&self, board_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/boards/{}/lists", board_id);
        self.get(&path, &[("fields", BoardList::FIELDS.to_string())])
            .await
    }

    pub async fn add_list_to_board(&self, board_id: &str, name: &str) -> Result<Value, TrelloError> {
        self.post(
            "/lists",
            &[("name", name.to_string()), ("idBoard", board_id.to_string())],
        )
        .await
    }

    pub async fn archive_list(&self, list_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/lists/{}/closed", list_id);
        self.put(&path, &[("value", "true".to_string())]).await
    }

    pub async fn get_cards_by_list(&self, list_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/lists/{}/cards", list_id);
        self.get(&path, &[]).await
    }

    pub async fn add_card_to_list(&self, card: &NewCard) -> Result<Value, TrelloError> {
        self.post("/cards", &card.to_params()).await
    }

    pub async fn archive_card(&self, card_id: &str) -> Result<Value, TrelloError> {
        let path = format!("/cards/{}/closed", card_id);
        self.put(&path, &[("value", "true".to_string())]).await
    }

    pub async fn attach_image_to_card(
        &self,
        card_id: &str,
        image_url: &str,
        name: Option<&str>,
    ) -> Result<Value, TrelloError> {
        let mut params: QueryParams = vec![("url", image_url.to_string())];
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            params.push(("name", name.to_string()));
        }

        let path = format!("/cards/{}/attachments", card_id);
        self.post(&path, &params).await
    }

    /// Move a card to another list, then optionally reposition it.
    ///
    /// The two calls are not atomic: if the position update fails the card
    /// has already changed lists. The list-change payload is returned.
    pub async fn move_card(
        &self,
        card_id: &str,
        list_id: &str,
        pos: Option<&str>,
    ) -> Result<Value, TrelloError> {
        let path = format!("/cards/{}/idList", card_id);
        let data = self.put(&path, &[("value", list_id.to_string())]).await?;

        if let Some(pos) = pos.filter(|p| !p.is_empty()) {
            let path = format!("/cards/{}/pos", card_id);
            self.put(&path, &[("value", pos.to_string())]).await?;
        }

        Ok(data)
    }

    pub async fn update_card(&self, card_id: &str, update: &CardUpdate) -> Result<Value, TrelloError> {
        let path = format!("/cards/{}", card_id);
        self.put(&path, &update.to_params()).await
    }

    /// Cards the token's member is assigned to
    pub async fn get_my_cards(&self) -> Result<Value, TrelloError> {
        self.get(
            "/members/me/cards",
            &[("fields", Card::MEMBER_FIELDS.to_string())],
        )
        .await
    }

    pub async fn get_recent_activity(&self, board_id: &str, limit: u32) -> Result<Value, TrelloError> {
        let path = format!("/boards/{}/actions", board_id);
        self.get(&path, &[("limit", limit.to_string())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> TrelloClient {
        let credentials = Credentials::new("test-key", "test-token").unwrap();
        TrelloClient::new(credentials, ClientSettings::default()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert!(!client.debug);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let credentials = Credentials::new("k", "t").unwrap();
        let settings = ClientSettings {
            base_url: "http://localhost:8080/1/".to_string(),
            ..Default::default()
        };

        let client = TrelloClient::new(credentials, settings).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/1");
    }

    #[test]
    fn test_mask_params_hides_credentials() {
        let params: QueryParams = vec![
            ("fields", "id,name".to_string()),
            ("key", "real-key".to_string()),
            ("token", "real-token".to_string()),
        ];

        let masked = mask_params(&params);
        assert_eq!(
            masked,
            vec![
                ("fields", "id,name".to_string()),
                ("key", MASK.to_string()),
                ("token", MASK.to_string()),
            ]
        );
    }

    #[test]
    fn test_api_error_status() {
        let err = TrelloError::Api {
            status: 404,
            body: json!({"text": "board not found"}),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));
    }
}
