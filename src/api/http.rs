//! Core REST transport.
//!
//! Wraps a single `reqwest::Client` over `<api_base>/api`, injecting the
//! bearer token from the session on every request. On a 401 the client
//! performs exactly one automatic token refresh and replays the original
//! request; a failed refresh clears the session and surfaces
//! `ClientError::SessionExpired` so the embedder can route back to login.
//! No other retry layer sits above REST calls.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::errors::ClientError;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// `<api_base>/api`, no trailing slash.
    base: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(std::time::Duration::from_secs(5))
            .user_agent(concat!("workhub-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Validate the base URL once, up front.
        let base = format!("{}/api", config.api_base_url.trim_end_matches('/'));
        url::Url::parse(&base)?;

        Ok(Self {
            http,
            base,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    // ── Verbs ─────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        self.send(Method::POST, path, body).await
    }

    pub async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        self.send(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(Method::DELETE, path, None).await
    }

    // ── Transport ─────────────────────────────────────────────

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = self.url(path);

        let response = self
            .execute(method.clone(), &url, body.as_ref(), self.session.access_token())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        // One refresh-and-retry, then give up.
        let Some(refresh) = self.session.refresh_token() else {
            return Err(ClientError::NotAuthenticated);
        };

        tracing::debug!(%method, path, "401 received, refreshing access token");
        let access = match self.refresh_access(&refresh).await {
            Ok(access) => access,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, clearing session");
                self.session.clear();
                return Err(ClientError::SessionExpired);
            }
        };
        self.session.update_access(access.clone());

        let retried = self
            .execute(method, &url, body.as_ref(), Some(access))
            .await?;
        Self::decode(retried).await
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<String>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// POST `auth/token/refresh/` with the refresh token, outside the normal
    /// request path (no bearer header, no recursion).
    async fn refresh_access(&self, refresh: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("auth/token/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        let value = Self::decode(response).await?;
        value
            .get("access")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus { status, body });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

// ── Response envelopes ────────────────────────────────────────

/// Decode a list response. The backend is inconsistent about list shapes;
/// tolerate a bare array, `{results: [...]}` (with or without pagination
/// fields), and `{data: [...]}`. Anything else decodes as an empty list.
pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ClientError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("results"), map.remove("data")) {
            (Some(Value::Array(items)), _) => items,
            (_, Some(Value::Array(items))) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}

/// Decode an object response, unwrapping the `{success, data}` envelope some
/// write endpoints use.
pub fn object_from_value<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    let value = match value {
        Value::Object(mut map)
            if map
                .get("data")
                .map(|d| d.is_object() || d.is_array())
                .unwrap_or(false) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}
