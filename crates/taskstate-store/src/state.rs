//! Shared application state.

use std::sync::Arc;

use taskstate_backend::MemoryBackend;

/// Shared application state.
pub struct AppState {
    /// Task and group records.
    pub records: MemoryBackend,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve records shared with another `MemoryBackend` handle.
    pub fn with_records(records: MemoryBackend) -> Arc<Self> {
        Arc::new(Self { records })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            records: MemoryBackend::new(),
        }
    }
}
