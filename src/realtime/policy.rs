use std::time::Duration;

/// Reconnect backoff: `base_delay * 2^attempt` up to a fixed attempt
/// ceiling, no jitter. After the ceiling the connection stays closed until
/// the next explicit `connect()`.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (0-based), or `None`
    /// once the retry budget is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt))
    }
}
