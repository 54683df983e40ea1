use std::time::Duration;

/// Backend endpoint when no `--server` is given.
pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8765";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    /// Interval between local simulation steps.
    pub tick_interval: Duration,
    /// Upper bound on how long the loop waits for a key before polling the network again.
    pub input_poll: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: String::from(DEFAULT_SERVER_URL),
            tick_interval: Duration::from_millis(100),
            input_poll: Duration::from_millis(16),
        }
    }
}
