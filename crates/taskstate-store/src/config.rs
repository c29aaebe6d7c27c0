//! Store server configuration.

/// Store server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub bind_addr: String,

    /// Path prefix of the state API (e.g. "/api/v1").
    pub api_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            api_prefix: "/api/v1".to_string(),
        }
    }
}
