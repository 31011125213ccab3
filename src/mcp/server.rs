use crate::config::Config;
use crate::mcp::error::ToolError;
use crate::mcp::tools::{ToolDefinition, TrelloTools};
use rmcp::{
    model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// MCP server for Trello
#[derive(Clone)]
pub struct TrelloMcpServer {
    tools: Arc<TrelloTools>,
}

impl TrelloMcpServer {
    /// Create a new MCP server. Credentials are checked on the first tool
    /// call that needs them, not here.
    pub fn new(config: Arc<Config>) -> Self {
        Self::from_tools(TrelloTools::new(config))
    }

    pub fn from_tools(tools: TrelloTools) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    /// Run one tool and wrap its payload as protocol content
    async fn run_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments.map(Value::Object).unwrap_or(Value::Null);

        match self.tools.call(name, arguments).await {
            Ok(payload) => Ok(CallToolResult::success(vec![Content::json(payload)?])),
            Err(e) => {
                warn!(tool_name = %name, error = %e, "Tool call failed");
                Err(to_mcp_error(&e))
            }
        }
    }
}

fn to_mcp_tool(def: ToolDefinition) -> Tool {
    let schema = match def.input_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(def.name, def.description, Arc::new(schema))
}

/// Map a tool failure onto a protocol error, keeping the taxonomy in `data`
pub fn to_mcp_error(err: &ToolError) -> McpError {
    let data = Some(err.details());
    if err.is_caller_error() {
        McpError::invalid_params(err.to_string(), data)
    } else {
        McpError::internal_error(err.to_string(), data)
    }
}

impl ServerHandler for TrelloMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trello-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Trello MCP Server - boards, lists and cards. Set an active board to omit boardId."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = TrelloTools::definitions()
            .into_iter()
            .map(to_mcp_tool)
            .collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(&request.name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trello::TrelloError;
    use serde_json::json;

    #[test]
    fn test_server_creation() {
        let server = TrelloMcpServer::new(Arc::new(Config::default()));
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tool_conversion_keeps_schema() {
        let tools: Vec<Tool> = TrelloTools::definitions()
            .into_iter()
            .map(to_mcp_tool)
            .collect();

        let move_card = tools.iter().find(|t| t.name == "move_card").unwrap();
        assert!(move_card.input_schema.contains_key("properties"));
    }

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err = ToolError::validation("boardId", "No board specified and no active board is set.");
        let mcp_err = to_mcp_error(&err);
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(mcp_err.data.unwrap()["field"], "boardId");
    }

    #[tokio::test]
    async fn test_unknown_tool_maps_to_invalid_params() {
        let server = TrelloMcpServer::new(Arc::new(Config::default()));

        let mcp_err = server.run_tool("delete_everything", None).await.unwrap_err();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["kind"], "unknown_tool");
        assert_eq!(data["tool"], "delete_everything");
    }

    #[tokio::test]
    async fn test_missing_identifier_maps_to_invalid_params() {
        let server = TrelloMcpServer::new(Arc::new(Config::default()));

        let mcp_err = server
            .run_tool("archive_card", Some(JsonObject::new()))
            .await
            .unwrap_err();
        assert_eq!(mcp_err.code, ErrorCode::INVALID_PARAMS);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["kind"], "validation");
        assert_eq!(data["field"], "cardId");
    }

    #[tokio::test]
    async fn test_successful_call_wraps_payload() {
        let server = TrelloMcpServer::new(Arc::new(Config::default()));

        let result = server.run_tool("get_server_info", None).await.unwrap();
        assert_eq!(result.is_error, Some(false));
    }

    #[tokio::test]
    async fn test_missing_credentials_map_to_internal_error() {
        let server = TrelloMcpServer::new(Arc::new(Config::default()));

        let mcp_err = server.run_tool("list_boards", None).await.unwrap_err();
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(mcp_err.data.unwrap()["kind"], "configuration");
    }

    #[test]
    fn test_upstream_maps_to_internal_error() {
        let err = ToolError::from(TrelloError::Api {
            status: 404,
            body: json!({"text": "not found"}),
        });
        let mcp_err = to_mcp_error(&err);
        assert_eq!(mcp_err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(mcp_err.data.unwrap()["status"], 404);
    }
}
