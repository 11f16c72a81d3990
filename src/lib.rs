//! WorkHub client SDK.
//!
//! Typed client for the WorkHub collaborative workspace API: a REST layer
//! with a query cache and optimistic invalidation, an explicit session
//! object, and a real-time notification channel over WebSocket.
//!
//! ```no_run
//! use workhub_client::WorkspaceClient;
//!
//! # async fn demo() -> Result<(), workhub_client::errors::ClientError> {
//! let client = WorkspaceClient::new(workhub_client::config::load())?;
//! client
//!     .auth()
//!     .login(&workhub_client::models::user::LoginRequest {
//!         email: "me@example.com".into(),
//!         password: "secret".into(),
//!     })
//!     .await?;
//!
//! client.realtime().connect();
//! let workspaces = client.workspaces().list().await?;
//! # let _ = workspaces;
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod realtime;
pub mod session;

use alerts::{Alert, AlertSink};
use api::{
    auth::AuthApi, documents::DocumentsApi, notifications::NotificationsApi,
    workspaces::WorkspacesApi, ApiClient,
};
use cache::QueryCache;
use config::Config;
use errors::ClientError;
use realtime::{NotificationSocket, ReconnectPolicy};
use session::SessionStore;
use tokio::sync::broadcast;

/// One client per authenticated session. Owns the session state, the REST
/// transport, the query cache, the alert fan-out, and the notification
/// socket; everything is wired to the same underlying stores.
pub struct WorkspaceClient {
    http: ApiClient,
    cache: QueryCache,
    session: SessionStore,
    alerts: AlertSink,
    socket: NotificationSocket,
}

impl WorkspaceClient {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        Self::with_reconnect_policy(config, ReconnectPolicy::default())
    }

    pub fn with_reconnect_policy(
        config: Config,
        policy: ReconnectPolicy,
    ) -> Result<Self, ClientError> {
        let session = SessionStore::new();
        let cache = QueryCache::new();
        let alerts = AlertSink::new();
        let http = ApiClient::new(&config, session.clone())?;
        let socket = NotificationSocket::with_policy(
            config.ws_base_url.clone(),
            session.clone(),
            cache.clone(),
            alerts.clone(),
            policy,
        );

        Ok(Self {
            http,
            cache,
            session,
            alerts,
            socket,
        })
    }

    // ── API surfaces ──────────────────────────────────────────

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    pub fn workspaces(&self) -> WorkspacesApi<'_> {
        WorkspacesApi::new(&self.http, &self.cache)
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(&self.http, &self.cache)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(&self.http, &self.cache)
    }

    /// The notification socket manager (connect/disconnect/state).
    pub fn realtime(&self) -> &NotificationSocket {
        &self.socket
    }

    // ── Shared state ──────────────────────────────────────────

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Subscribe to transient alerts pushed over the socket.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }
}
