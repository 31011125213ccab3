use crate::config::Config;
use crate::context::ActiveSelection;
use crate::mcp::error::ToolError;
use crate::trello::{Board, CardUpdate, NewCard, TrelloClient};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub const SERVER_NAME: &str = "Trello MCP Server";

const NO_BOARD: &str = "No board specified and no active board is set.";
const NO_ACTIVE_BOARD: &str =
    "No active board set. Provide TRELLO_BOARD_ID or call set_active_board.";

/// Default and maximum number of actions for `get_recent_activity`
const DEFAULT_ACTIVITY_LIMIT: u32 = 10;
const MAX_ACTIVITY_LIMIT: u32 = 1000;

/// Tool without arguments
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Parameters for tools scoped to a board
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardParams {
    /// Board ID. Falls back to the active board when omitted.
    #[serde(default)]
    pub board_id: Option<String>,
}

/// Parameters for creating a list
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddListParams {
    /// Name of the new list
    pub name: String,
    /// Board ID. Falls back to the active board when omitted.
    #[serde(default)]
    pub board_id: Option<String>,
}

/// Parameters for tools acting on one list
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListIdParams {
    pub list_id: String,
}

/// Parameters for creating a card
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCardParams {
    /// List the card is created in
    pub list_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Due date, ISO 8601
    #[serde(default)]
    pub due_date: Option<String>,
    /// Label IDs to attach
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Parameters for tools acting on one card
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardIdParams {
    pub card_id: String,
}

/// Parameters for attaching an image
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachImageParams {
    pub card_id: String,
    /// Publicly reachable URL of the image
    pub image_url: String,
    /// Attachment name
    #[serde(default)]
    pub name: Option<String>,
}

/// Parameters for moving a card
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardParams {
    pub card_id: String,
    /// Destination list
    pub list_id: String,
    /// Position in the destination list: "top", "bottom" or a number
    #[serde(default)]
    pub pos: Option<String>,
}

/// Parameters for a partial card update
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardParams {
    pub card_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Replaces the card's labels; an empty array removes all of them
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Parameters for tools acting on one workspace (organization)
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceParams {
    pub workspace_id: String,
}

/// Parameters for fetching board activity
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityParams {
    /// Maximum number of actions (1-1000, default 10)
    #[serde(default)]
    pub limit: Option<u32>,
    /// Board ID. Falls back to the active board when omitted.
    #[serde(default)]
    pub board_id: Option<String>,
}

/// Parameters for selecting the active board
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveBoardParams {
    pub board_id: String,
}

/// Catalog entry for one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn definition<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolDefinition {
    let input_schema = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| json!({ "type": "object" }));

    ToolDefinition {
        name,
        description,
        input_schema,
    }
}

/// Argument struct of one tool.
///
/// `REQUIRED` lists the wire names a caller must supply; it mirrors the
/// `required` array of the derived schema.
trait ToolArguments: DeserializeOwned {
    const REQUIRED: &'static [&'static str] = &[];
}

impl ToolArguments for BoardParams {}
impl ToolArguments for RecentActivityParams {}

impl ToolArguments for AddListParams {
    const REQUIRED: &'static [&'static str] = &["name"];
}

impl ToolArguments for ListIdParams {
    const REQUIRED: &'static [&'static str] = &["listId"];
}

impl ToolArguments for AddCardParams {
    const REQUIRED: &'static [&'static str] = &["listId", "name"];
}

impl ToolArguments for CardIdParams {
    const REQUIRED: &'static [&'static str] = &["cardId"];
}

impl ToolArguments for AttachImageParams {
    const REQUIRED: &'static [&'static str] = &["cardId", "imageUrl"];
}

impl ToolArguments for MoveCardParams {
    const REQUIRED: &'static [&'static str] = &["cardId", "listId"];
}

impl ToolArguments for UpdateCardParams {
    const REQUIRED: &'static [&'static str] = &["cardId"];
}

impl ToolArguments for WorkspaceParams {
    const REQUIRED: &'static [&'static str] = &["workspaceId"];
}

impl ToolArguments for SetActiveBoardParams {
    const REQUIRED: &'static [&'static str] = &["boardId"];
}

/// Decode tool arguments. An absent or null required field is a
/// validation error naming that field; any other mismatch is reported
/// as invalid arguments.
fn parse<T: ToolArguments>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    if let Value::Object(map) = &arguments {
        if let Some(field) = T::REQUIRED
            .iter()
            .copied()
            .find(|field| map.get(*field).map_or(true, Value::is_null))
        {
            return Err(ToolError::validation(field, format!("{} is required", field)));
        }
    }

    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn require(value: String, field: &'static str) -> Result<String, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::validation(
            field,
            format!("{} cannot be empty", field),
        ));
    }
    Ok(value)
}

/// Trello tool catalog and dispatcher.
///
/// Owns the active selection and the lazily-built request bridge; the
/// protocol layer hands it a tool name plus JSON arguments and forwards
/// whatever comes back.
pub struct TrelloTools {
    config: Arc<Config>,
    selection: ActiveSelection,
    client: OnceCell<TrelloClient>,
}

impl TrelloTools {
    /// Create the dispatcher. The Trello client is built on first use.
    pub fn new(config: Arc<Config>) -> Self {
        let selection = ActiveSelection::new(
            config.active_board_id.clone(),
            config.active_workspace_id.clone(),
        );

        Self {
            config,
            selection,
            client: OnceCell::new(),
        }
    }

    /// Create the dispatcher around an already-built client
    pub fn with_client(config: Arc<Config>, client: TrelloClient) -> Self {
        let mut tools = Self::new(config);
        tools.client = OnceCell::new_with(Some(client));
        tools
    }

    pub fn selection(&self) -> &ActiveSelection {
        &self.selection
    }

    async fn client(&self) -> Result<&TrelloClient, ToolError> {
        self.client
            .get_or_try_init(|| async {
                let credentials = self.config.credentials()?;
                let client = TrelloClient::new(credentials, self.config.client_settings())?;
                info!(base_url = %self.config.base_url, "Trello client initialized");
                Ok::<_, ToolError>(client)
            })
            .await
    }

    async fn resolve_board(&self, explicit: Option<String>) -> Result<String, ToolError> {
        match explicit.filter(|b| !b.trim().is_empty()) {
            Some(board_id) => Ok(board_id),
            None => self
                .selection
                .active_board()
                .await
                .ok_or_else(|| ToolError::validation("boardId", NO_BOARD)),
        }
    }

    /// Every tool with its argument schema. Needs no credentials.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            definition::<NoParams>(
                "get_server_info",
                "Get information about the MCP server, environment, and active Trello context",
            ),
            definition::<NoParams>("get_active_board_info", "Get info for the currently active board"),
            definition::<BoardParams>(
                "get_lists",
                "Fetch all lists on a board. If boardId omitted, uses active board.",
            ),
            definition::<AddListParams>(
                "add_list_to_board",
                "Create a new list on the given or active board",
            ),
            definition::<ListIdParams>("archive_list", "Archive (close) a Trello list"),
            definition::<ListIdParams>("get_cards_by_list_id", "Fetch cards from a specific list"),
            definition::<AddCardParams>("add_card_to_list", "Create a Trello card in a list"),
            definition::<CardIdParams>("archive_card", "Archive (close) a Trello card"),
            definition::<AttachImageParams>(
                "attach_image_to_card",
                "Attach an image URL to a Trello card",
            ),
            definition::<MoveCardParams>(
                "move_card",
                "Move a card to another list on the same board",
            ),
            definition::<UpdateCardParams>(
                "update_card_details",
                "Update card details: name, description, dueDate, labels",
            ),
            definition::<NoParams>("list_boards", "List boards accessible to the Trello user"),
            definition::<WorkspaceParams>(
                "list_boards_in_workspace",
                "List boards in a given workspace (organization)",
            ),
            definition::<NoParams>("get_my_cards", "Fetch all cards assigned to the current user"),
            definition::<RecentActivityParams>(
                "get_recent_activity",
                "Fetch recent activity (actions) on a board. If boardId omitted, uses active board.",
            ),
            definition::<SetActiveBoardParams>(
                "set_active_board",
                "Set the active board for subsequent operations",
            ),
            definition::<WorkspaceParams>(
                "set_active_workspace",
                "Set the active workspace (organization) for subsequent operations",
            ),
        ]
    }

    /// Dispatch a tool call by name
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        match name {
            "get_server_info" => self.get_server_info().await,
            "get_active_board_info" => self.get_active_board_info().await,
            "get_lists" => self.get_lists(parse(name, arguments)?).await,
            "add_list_to_board" => self.add_list_to_board(parse(name, arguments)?).await,
            "archive_list" => self.archive_list(parse(name, arguments)?).await,
            "get_cards_by_list_id" => self.get_cards_by_list_id(parse(name, arguments)?).await,
            "add_card_to_list" => self.add_card_to_list(parse(name, arguments)?).await,
            "archive_card" => self.archive_card(parse(name, arguments)?).await,
            "attach_image_to_card" => self.attach_image_to_card(parse(name, arguments)?).await,
            "move_card" => self.move_card(parse(name, arguments)?).await,
            "update_card_details" => self.update_card_details(parse(name, arguments)?).await,
            "list_boards" => self.list_boards().await,
            "list_boards_in_workspace" => {
                self.list_boards_in_workspace(parse(name, arguments)?).await
            }
            "get_my_cards" => self.get_my_cards().await,
            "get_recent_activity" => self.get_recent_activity(parse(name, arguments)?).await,
            "set_active_board" => self.set_active_board(parse(name, arguments)?).await,
            "set_active_workspace" => self.set_active_workspace(parse(name, arguments)?).await,
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }

    pub async fn get_server_info(&self) -> Result<Value, ToolError> {
        info!(tool_name = "get_server_info", "Executing tool");
        let active = self.selection.snapshot().await;

        Ok(json!({
            "server_name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "environment": self.config.environment,
            "active_board_id": active.board_id,
            "active_workspace_id": active.workspace_id,
        }))
    }

    pub async fn get_active_board_info(&self) -> Result<Value, ToolError> {
        let board_id = self
            .selection
            .active_board()
            .await
            .ok_or_else(|| ToolError::validation("boardId", NO_ACTIVE_BOARD))?;
        info!(tool_name = "get_active_board_info", board_id = %board_id, "Executing tool");

        Ok(self.client().await?.get_board(&board_id).await?)
    }

    pub async fn get_lists(&self, params: BoardParams) -> Result<Value, ToolError> {
        let board_id = self.resolve_board(params.board_id).await?;
        info!(tool_name = "get_lists", board_id = %board_id, "Executing tool");

        Ok(self.client().await?.get_lists(&board_id).await?)
    }

    pub async fn add_list_to_board(&self, params: AddListParams) -> Result<Value, ToolError> {
        let name = require(params.name, "name")?;
        let board_id = self.resolve_board(params.board_id).await?;
        info!(tool_name = "add_list_to_board", board_id = %board_id, list_name = %name, "Executing tool");

        Ok(self.client().await?.add_list_to_board(&board_id, &name).await?)
    }

    pub async fn archive_list(&self, params: ListIdParams) -> Result<Value, ToolError> {
        let list_id = require(params.list_id, "listId")?;
        info!(tool_name = "archive_list", list_id = %list_id, "Executing tool");

        Ok(self.client().await?.archive_list(&list_id).await?)
    }

    pub async fn get_cards_by_list_id(&self, params: ListIdParams) -> Result<Value, ToolError> {
        let list_id = require(params.list_id, "listId")?;
        info!(tool_name = "get_cards_by_list_id", list_id = %list_id, "Executing tool");

        Ok(self.client().await?.get_cards_by_list(&list_id).await?)
    }

    pub async fn add_card_to_list(&self, params: AddCardParams) -> Result<Value, ToolError> {
        let card = NewCard {
            list_id: require(params.list_id, "listId")?,
            name: require(params.name, "name")?,
            description: params.description,
            due: params.due_date,
            labels: params.labels,
        };
        info!(
            tool_name = "add_card_to_list",
            list_id = %card.list_id,
            card_name = %card.name,
            due = ?card.due,
            labels_count = card.labels.as_ref().map_or(0, |l| l.len()),
            "Executing tool"
        );

        Ok(self.client().await?.add_card_to_list(&card).await?)
    }

    pub async fn archive_card(&self, params: CardIdParams) -> Result<Value, ToolError> {
        let card_id = require(params.card_id, "cardId")?;
        info!(tool_name = "archive_card", card_id = %card_id, "Executing tool");

        Ok(self.client().await?.archive_card(&card_id).await?)
    }

    pub async fn attach_image_to_card(&self, params: AttachImageParams) -> Result<Value, ToolError> {
        let card_id = require(params.card_id, "cardId")?;
        let image_url = require(params.image_url, "imageUrl")?;
        info!(
            tool_name = "attach_image_to_card",
            card_id = %card_id,
            image_url_len = image_url.len(),
            attachment_name = ?params.name,
            "Executing tool"
        );

        Ok(self
            .client()
            .await?
            .attach_image_to_card(&card_id, &image_url, params.name.as_deref())
            .await?)
    }

    pub async fn move_card(&self, params: MoveCardParams) -> Result<Value, ToolError> {
        let card_id = require(params.card_id, "cardId")?;
        let list_id = require(params.list_id, "listId")?;
        info!(
            tool_name = "move_card",
            card_id = %card_id,
            list_id = %list_id,
            pos = ?params.pos,
            "Executing tool"
        );

        Ok(self
            .client()
            .await?
            .move_card(&card_id, &list_id, params.pos.as_deref())
            .await?)
    }

    pub async fn update_card_details(&self, params: UpdateCardParams) -> Result<Value, ToolError> {
        let card_id = require(params.card_id, "cardId")?;
        let update = CardUpdate {
            name: params.name,
            description: params.description,
            due: params.due_date,
            labels: params.labels,
        };
        info!(
            tool_name = "update_card_details",
            card_id = %card_id,
            card_name = ?update.name,
            due = ?update.due,
            labels_count = update.labels.as_ref().map_or(0, |l| l.len()),
            "Executing tool"
        );

        Ok(self.client().await?.update_card(&card_id, &update).await?)
    }

    pub async fn list_boards(&self) -> Result<Value, ToolError> {
        info!(tool_name = "list_boards", "Executing tool");
        Ok(self.client().await?.list_boards().await?)
    }

    pub async fn list_boards_in_workspace(&self, params: WorkspaceParams) -> Result<Value, ToolError> {
        let workspace_id = require(params.workspace_id, "workspaceId")?;
        info!(tool_name = "list_boards_in_workspace", workspace_id = %workspace_id, "Executing tool");

        Ok(self
            .client()
            .await?
            .list_boards_in_workspace(&workspace_id)
            .await?)
    }

    pub async fn get_my_cards(&self) -> Result<Value, ToolError> {
        info!(tool_name = "get_my_cards", "Executing tool");
        Ok(self.client().await?.get_my_cards().await?)
    }

    pub async fn get_recent_activity(&self, params: RecentActivityParams) -> Result<Value, ToolError> {
        let limit = params.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        if !(1..=MAX_ACTIVITY_LIMIT).contains(&limit) {
            return Err(ToolError::validation(
                "limit",
                format!("limit must be between 1 and {}", MAX_ACTIVITY_LIMIT),
            ));
        }
        let board_id = self.resolve_board(params.board_id).await?;
        info!(tool_name = "get_recent_activity", board_id = %board_id, limit, "Executing tool");

        Ok(self
            .client()
            .await?
            .get_recent_activity(&board_id, limit)
            .await?)
    }

    /// Select the active board, then fetch it as confirmation.
    ///
    /// The selection changes before the fetch, so a failed confirmation
    /// still leaves the new board active.
    pub async fn set_active_board(&self, params: SetActiveBoardParams) -> Result<Value, ToolError> {
        let board_id = require(params.board_id, "boardId")?;
        info!(tool_name = "set_active_board", board_id = %board_id, "Executing tool");

        self.selection.set_active_board(board_id.clone()).await;
        let board = self.client().await?.get_board(&board_id).await?;
        if let Ok(confirmed) = serde_json::from_value::<Board>(board.clone()) {
            info!(board_id = %confirmed.id, board_name = %confirmed.name, "Active board confirmed");
        }

        Ok(json!({ "active_board": board }))
    }

    pub async fn set_active_workspace(&self, params: WorkspaceParams) -> Result<Value, ToolError> {
        let workspace_id = require(params.workspace_id, "workspaceId")?;
        info!(tool_name = "set_active_workspace", workspace_id = %workspace_id, "Executing tool");

        self.selection.set_active_workspace(workspace_id.clone()).await;

        Ok(json!({ "active_workspace_id": workspace_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn tools_without_credentials() -> TrelloTools {
        TrelloTools::new(Arc::new(Config::default()))
    }

    #[test]
    fn test_catalog_lists_every_tool_once() {
        let defs = TrelloTools::definitions();
        assert_eq!(defs.len(), 17);

        let mut names: Vec<_> = defs.iter().map(|d| d.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 17);
    }

    #[test]
    fn test_schemas_mark_required_fields() {
        let defs = TrelloTools::definitions();
        let add_card = defs.iter().find(|d| d.name == "add_card_to_list").unwrap();

        let required = add_card.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("listId")));
        assert!(required.contains(&json!("name")));
        assert!(!required.contains(&json!("labels")));
        assert!(add_card.input_schema["properties"]["dueDate"].is_object());
    }

    #[tokio::test]
    async fn test_server_info_needs_no_credentials() {
        let config = Config {
            active_workspace_id: Some("ws-1".to_string()),
            environment: "test".to_string(),
            ..Default::default()
        };
        let tools = TrelloTools::new(Arc::new(config));

        let info = tools.call("get_server_info", Value::Null).await.unwrap();
        assert_eq!(info["server_name"], SERVER_NAME);
        assert_eq!(info["environment"], "test");
        assert_eq!(info["active_board_id"], Value::Null);
        assert_eq!(info["active_workspace_id"], "ws-1");
    }

    #[tokio::test]
    async fn test_get_lists_without_board_fails_validation() {
        let tools = tools_without_credentials();

        let err = tools.call("get_lists", json!({})).await.unwrap_err();
        match err {
            ToolError::Validation { field, message } => {
                assert_eq!(field, "boardId");
                assert_eq!(message, NO_BOARD);
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_active_board_info_without_board_fails_validation() {
        let tools = tools_without_credentials();

        let err = tools.call("get_active_board_info", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "boardId", .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_surface_as_configuration_error() {
        let tools = tools_without_credentials();

        let err = tools.call("list_boards", json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Configuration(ConfigError::MissingCredentials { .. })
        ));
    }

    fn assert_required_matches_schema<T: ToolArguments + JsonSchema>() {
        let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap();
        let mut in_schema: Vec<String> = schema["required"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        in_schema.sort();

        let mut declared: Vec<String> = T::REQUIRED.iter().map(|f| f.to_string()).collect();
        declared.sort();

        assert_eq!(declared, in_schema);
    }

    #[test]
    fn test_required_fields_match_schemas() {
        assert_required_matches_schema::<BoardParams>();
        assert_required_matches_schema::<AddListParams>();
        assert_required_matches_schema::<ListIdParams>();
        assert_required_matches_schema::<AddCardParams>();
        assert_required_matches_schema::<CardIdParams>();
        assert_required_matches_schema::<AttachImageParams>();
        assert_required_matches_schema::<MoveCardParams>();
        assert_required_matches_schema::<UpdateCardParams>();
        assert_required_matches_schema::<WorkspaceParams>();
        assert_required_matches_schema::<RecentActivityParams>();
        assert_required_matches_schema::<SetActiveBoardParams>();
    }

    #[tokio::test]
    async fn test_missing_required_argument_names_field() {
        let tools = tools_without_credentials();

        let err = tools
            .call("add_card_to_list", json!({ "name": "Task" }))
            .await
            .unwrap_err();
        match err {
            ToolError::Validation { field, message } => {
                assert_eq!(field, "listId");
                assert_eq!(message, "listId is required");
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_absent_identifiers_fail_validation() {
        let tools = tools_without_credentials();
        let cases = [
            ("archive_card", json!({}), "cardId"),
            ("archive_list", Value::Null, "listId"),
            ("get_cards_by_list_id", json!({ "listId": null }), "listId"),
            ("move_card", json!({ "cardId": "C1" }), "listId"),
            ("attach_image_to_card", json!({ "cardId": "C1" }), "imageUrl"),
            ("update_card_details", json!({ "name": "x" }), "cardId"),
            ("list_boards_in_workspace", json!({}), "workspaceId"),
            ("set_active_workspace", json!({}), "workspaceId"),
            ("set_active_board", json!({}), "boardId"),
            ("add_list_to_board", json!({ "boardId": "B1" }), "name"),
        ];

        for (tool, arguments, expected) in cases {
            let err = tools.call(tool, arguments).await.unwrap_err();
            match err {
                ToolError::Validation { field, .. } => assert_eq!(field, expected, "{}", tool),
                other => panic!("{}: expected Validation, got {:?}", tool, other),
            }
        }

        // Nothing was selected by the failed calls
        assert!(tools.selection().active_board().await.is_none());
        assert!(tools.selection().active_workspace().await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_argument_type_is_invalid_arguments() {
        let tools = tools_without_credentials();

        let err = tools
            .call("archive_card", json!({ "cardId": 42 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { tool, .. } if tool == "archive_card"));
    }

    #[tokio::test]
    async fn test_empty_identifier_rejected_before_upstream() {
        let tools = tools_without_credentials();

        let err = tools
            .call("archive_card", json!({ "cardId": "  " }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "cardId", .. }));
    }

    #[tokio::test]
    async fn test_activity_limit_out_of_range() {
        let tools = tools_without_credentials();

        let err = tools
            .call("get_recent_activity", json!({ "limit": 0, "boardId": "b1" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "limit", .. }));
    }

    #[tokio::test]
    async fn test_set_active_workspace_is_local() {
        let tools = tools_without_credentials();

        let result = tools
            .call("set_active_workspace", json!({ "workspaceId": "ws-9" }))
            .await
            .unwrap();
        assert_eq!(result, json!({ "active_workspace_id": "ws-9" }));
        assert_eq!(tools.selection().active_workspace().await.as_deref(), Some("ws-9"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tools = tools_without_credentials();

        let err = tools.call("delete_everything", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "delete_everything"));
    }
}
