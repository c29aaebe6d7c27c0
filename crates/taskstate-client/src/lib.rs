//! HTTP client for the Taskstate remote store.
//!
//! One [`StoreClient`] call is one request/response exchange. Every failure
//! is classified into a [`taskstate_core::StateError`] before it leaves this
//! crate.

pub mod config;
pub mod error;
pub mod http;
pub mod wire;

pub use config::ClientConfig;
pub use http::StoreClient;
