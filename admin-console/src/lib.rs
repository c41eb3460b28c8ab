pub mod config;
pub mod documents;
pub mod export;
pub mod handlers;
pub mod services;
pub mod startup;

use services::backend_client::BackendClient;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
}

impl AppState {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}
