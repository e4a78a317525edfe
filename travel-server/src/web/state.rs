//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::registry::Registry;

/// Shared application state.
///
/// The registry is a synchronous structure whose mutations cascade across
/// aggregates, so all access goes through one lock: handlers take a read
/// guard for searches and a write guard for any mutation, which serializes
/// writers against everything else.
#[derive(Clone)]
pub struct AppState {
    /// The travel registry behind its exclusive lock
    pub registry: Arc<RwLock<Registry>>,
}

impl AppState {
    /// Create app state around a registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }
}
