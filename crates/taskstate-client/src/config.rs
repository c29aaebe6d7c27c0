//! Client configuration.

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every store path is appended to.
    pub base_url: String,

    /// Whole-request timeout (seconds). Expiry is reported as unreachable.
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds).
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/v1".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}
