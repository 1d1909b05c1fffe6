use std::sync::Arc;

use ferrite_food::{Predictor, ServiceConfig};

/// Everything a handler needs. Built once in `main` and never mutated, so
/// request threads share it without locking.
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(predictor: Predictor, config: ServiceConfig) -> Self {
        AppState { predictor: Arc::new(predictor), config }
    }
}

/// Shared state type passed to every handler.
pub type SharedState = Arc<AppState>;
