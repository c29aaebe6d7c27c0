//! Taskstate Reference Store
//!
//! HTTP server implementing the state store wire contract on top of
//! [`taskstate_backend::MemoryBackend`]. Workers talk to it through
//! [`taskstate_backend::HttpBackend`].

pub mod config;
pub mod http;
pub mod state;

pub use config::Config;
pub use http::create_router;
pub use state::AppState;
