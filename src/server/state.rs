//! Server state and configuration.

use crate::printer::PrintService;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:3100")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub service: PrintService,
}

impl AppState {
    pub fn new(config: ServerConfig, service: PrintService) -> Self {
        Self { config, service }
    }
}
