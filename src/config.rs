use std::time::Duration;

/// Client configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST base URL, e.g. `http://localhost:8000`. The `/api` prefix is
    /// appended by the client, not stored here.
    pub api_base_url: String,
    /// WebSocket base URL, e.g. `ws://localhost:8000`.
    pub ws_base_url: String,
    /// Per-request timeout for REST calls.
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            ws_base_url: "ws://localhost:8000".into(),
            request_timeout_secs: 30,
        }
    }
}

pub fn load() -> Config {
    dotenvy::dotenv().ok();

    Config {
        api_base_url: std::env::var("WORKHUB_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into()),
        ws_base_url: std::env::var("WORKHUB_WS_URL")
            .unwrap_or_else(|_| "ws://localhost:8000".into()),
        request_timeout_secs: std::env::var("WORKHUB_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_localhost() {
        let cfg = Config::default();
        assert_eq!(cfg.api_base_url, "http://localhost:8000");
        assert_eq!(cfg.ws_base_url, "ws://localhost:8000");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }
}
