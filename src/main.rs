use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trello_mcp_server::{config, Config, TrelloMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env next to the binary's working directory
    dotenvy::dotenv().ok();

    let default_filter = if config::debug_enabled() {
        "trello_mcp_server=debug"
    } else {
        "trello_mcp_server=info"
    };

    // LOG_FORMAT=json for structured logs, anything else for plain text.
    // Logs go to stderr; stdout carries the MCP JSON protocol.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(false),
                )
                .init();
        }
    }

    info!(log_format = %log_format, "Starting Trello MCP Server");

    let config = Arc::new(Config::from_env()?);
    info!(
        debug = config.debug,
        active_board = ?config.active_board_id,
        active_workspace = ?config.active_workspace_id,
        credentials_present = config.api_key.is_some() && config.token.is_some(),
        "Configuration loaded"
    );

    let mcp_server = TrelloMcpServer::new(config);

    let service = mcp_server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
