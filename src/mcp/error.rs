use crate::config::ConfigError;
use crate::trello::TrelloError;
use serde_json::{json, Value};

/// Failure of a single tool call
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Credentials or settings needed for upstream access are missing
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A required identifier is missing or empty and has no default
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Arguments do not match the tool's schema
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Upstream(#[from] TrelloError),
}

impl ToolError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ToolError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the error was raised locally, before any upstream call
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ToolError::Validation { .. }
                | ToolError::InvalidArguments { .. }
                | ToolError::UnknownTool(_)
        )
    }

    /// Structured detail for the protocol layer. Never contains credentials.
    pub fn details(&self) -> Value {
        match self {
            ToolError::Configuration(_) => json!({ "kind": "configuration" }),
            ToolError::Validation { field, .. } => json!({ "kind": "validation", "field": field }),
            ToolError::InvalidArguments { tool, .. } => {
                json!({ "kind": "invalid_arguments", "tool": tool })
            }
            ToolError::UnknownTool(name) => json!({ "kind": "unknown_tool", "tool": name }),
            ToolError::Upstream(TrelloError::Api { status, body }) => {
                json!({ "kind": "upstream", "status": status, "body": body })
            }
            ToolError::Upstream(TrelloError::Http(_)) => json!({ "kind": "transport" }),
        }
    }
}
