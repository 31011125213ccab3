//! Process-wide active board / workspace selection
//!
//! Tools that take an optional board id fall back to the active board. The
//! values are seeded from configuration and only change through the
//! `set_active_*` tools; nothing checks that an id exists until it is used.

use tokio::sync::RwLock;

/// Copy of the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveContext {
    pub board_id: Option<String>,
    pub workspace_id: Option<String>,
}

/// Shared, mutable selection. Last write wins.
#[derive(Debug, Default)]
pub struct ActiveSelection {
    inner: RwLock<ActiveContext>,
}

impl ActiveSelection {
    pub fn new(board_id: Option<String>, workspace_id: Option<String>) -> Self {
        Self {
            inner: RwLock::new(ActiveContext {
                board_id,
                workspace_id,
            }),
        }
    }

    pub async fn active_board(&self) -> Option<String> {
        self.inner.read().await.board_id.clone()
    }

    pub async fn active_workspace(&self) -> Option<String> {
        self.inner.read().await.workspace_id.clone()
    }

    /// Overwrite the active board without validating it
    pub async fn set_active_board(&self, board_id: impl Into<String>) {
        self.inner.write().await.board_id = Some(board_id.into());
    }

    /// Overwrite the active workspace without validating it
    pub async fn set_active_workspace(&self, workspace_id: impl Into<String>) {
        self.inner.write().await.workspace_id = Some(workspace_id.into());
    }

    pub async fn snapshot(&self) -> ActiveContext {
        self.inner.read().await.clone()
    }
}
