pub mod config;
pub mod context;
pub mod mcp;
pub mod trello;

pub use config::{Config, ConfigError};
pub use context::{ActiveContext, ActiveSelection};
#[cfg(feature = "stdio-mcp")]
pub use mcp::TrelloMcpServer;
pub use mcp::{ToolError, TrelloTools};
pub use trello::{Credentials, TrelloClient, TrelloError};
