use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::user::User;

/// Notification categories emitted by the server. `Other` absorbs kinds a
/// newer server may add so a single list item cannot poison the whole fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    WorkspaceInvite,
    DocumentShared,
    DocumentMention,
    CommentAdded,
    CommentReply,
    TaskAssigned,
    TaskCompleted,
    WorkspaceUpdated,
    BoardUpdated,
    MemberJoined,
    MemberLeft,
    #[serde(other)]
    Other,
}

/// A notification as returned by the REST API.
///
/// Created server-side, mutated only by mark-read operations, never deleted
/// by this client. `is_read` transitions one way (false to true), enforced by
/// the server and merely reflected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<User>,
}

/// Per-type delivery channel toggles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelPrefs {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub in_app: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default)]
    pub push_enabled: bool,
    #[serde(default)]
    pub types: HashMap<NotificationType, ChannelPrefs>,
}

/// Partial preference update; only the supplied fields are PATCHed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePreferencesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<HashMap<NotificationType, ChannelPrefs>>,
}
