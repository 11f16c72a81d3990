//! Typed REST API surface.
//!
//! One sub-module per backend resource family, mirroring the server's URL
//! layout. Reads consult the query cache first and populate it on fetch;
//! mutations invalidate the partitions they affect so the next read goes
//! back to the REST source of truth.

pub mod auth;
pub mod documents;
pub mod http;
pub mod notifications;
pub mod workspaces;

pub use http::ApiClient;

/// Cache key builders. Keys are colon-joined so `QueryCache::invalidate`
/// prefix semantics cover a whole partition.
pub(crate) mod keys {
    pub const WORKSPACES: &str = "workspaces";
    pub const DOCUMENTS: &str = "documents";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const NOTIFICATION_PREFERENCES: &str = "notification-preferences";
    pub const UNREAD_COUNT: &str = "notifications:unread-count";

    pub fn workspace(id: &str) -> String {
        format!("workspaces:{id}")
    }

    pub fn workspace_members(id: &str) -> String {
        format!("workspaces:{id}:members")
    }

    pub fn boards(workspace_id: &str) -> String {
        format!("workspaces:{workspace_id}:boards")
    }

    pub fn board(workspace_id: &str, board_id: &str) -> String {
        format!("workspaces:{workspace_id}:boards:{board_id}")
    }

    pub fn card_comments(workspace_id: &str, board_id: &str, card_id: &str) -> String {
        format!("workspaces:{workspace_id}:boards:{board_id}:cards:{card_id}:comments")
    }

    pub fn document(id: &str) -> String {
        format!("documents:{id}")
    }

    pub fn document_list(workspace: Option<&str>, board: Option<&str>) -> String {
        match (workspace, board) {
            (None, None) => DOCUMENTS.to_string(),
            (ws, board) => format!(
                "documents:list:{}:{}",
                ws.unwrap_or("-"),
                board.unwrap_or("-")
            ),
        }
    }

    pub fn document_blocks(id: &str) -> String {
        format!("documents:{id}:blocks")
    }

    pub fn document_comments(id: &str) -> String {
        format!("documents:{id}:comments")
    }

    pub fn document_permissions(id: &str) -> String {
        format!("documents:{id}:permissions")
    }

    pub fn notification(id: &str) -> String {
        format!("notifications:{id}")
    }

    pub fn notification_list(unread: bool, limit: Option<u32>) -> String {
        match (unread, limit) {
            (false, None) => NOTIFICATIONS.to_string(),
            (unread, limit) => format!(
                "notifications:list:unread={unread}:limit={}",
                limit.map(|l| l.to_string()).unwrap_or_else(|| "-".into())
            ),
        }
    }
}
