//! Application state for the HTTP server.

use crate::db::repository::NoiseRepository;
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn NoiseRepository>,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: Arc<dyn NoiseRepository>) -> Self {
        Self { repository }
    }
}
