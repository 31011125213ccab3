pub mod error;
#[cfg(feature = "stdio-mcp")]
pub mod server;
pub mod tools;

pub use error::ToolError;
#[cfg(feature = "stdio-mcp")]
pub use server::TrelloMcpServer;
pub use tools::{ToolDefinition, TrelloTools};
