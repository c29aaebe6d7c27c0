//! Taskstate backends.
//!
//! [`Backend`] is the contract the execution engine talks to. Two variants
//! implement it:
//! - [`HttpBackend`] records state in a remote store over HTTP. It is
//!   stateless; every guarantee spanning several workers comes from the store.
//! - [`MemoryBackend`] keeps records in-process. It carries the store-side
//!   rules (transition table, atomic chord latch) and backs the reference
//!   store server.

pub mod backend;
pub mod deadline;
pub mod http;
pub mod memory;

pub use backend::{count_completed, Backend};
pub use deadline::with_deadline;
pub use http::HttpBackend;
pub use memory::MemoryBackend;
