use crate::models::config::ServerConfig;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Shared, read-only state of a running endpoint
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
