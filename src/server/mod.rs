//! # HTTP API
//!
//! JSON endpoints for printer discovery, configuration and printing.
//!
//! ## Usage
//!
//! ```bash
//! receipt-bridge serve --port 3100
//! curl -X POST localhost:3100/api/print -H 'content-type: application/json' \
//!      -d '{"text": "Hello"}'
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/health` | [`handlers::health::health`] |
//! | GET | `/api/printer/status` | [`handlers::printer::status`] |
//! | GET | `/api/printer/scan-usb` | [`handlers::printer::scan_usb`] |
//! | GET | `/api/printer/scan-usb-lsusb` | [`handlers::printer::scan_usb_lsusb`] |
//! | POST | `/api/printer/set-usb-device` | [`handlers::printer::set_usb_device`] |
//! | POST | `/api/printer/set-usb-ids` | [`handlers::printer::set_usb_ids`] |
//! | GET | `/api/printer/usb-ids` | [`handlers::printer::usb_ids`] |
//! | GET | `/api/printer/check-usb-access` | [`handlers::printer::check_usb_access`] |
//! | POST | `/api/print` | [`handlers::print::print`] |
//! | POST | `/api/print/receipt` | [`handlers::print::receipt`] |
//! | POST | `/api/print/test` | [`handlers::print::test`] |

mod extract;
pub mod handlers;
mod response;
mod state;

pub use extract::ApiJson;
pub use response::ApiResult;
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::BridgeError;
use crate::printer::PrintService;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        // Discovery and configuration
        .route("/api/printer/status", get(handlers::printer::status))
        .route("/api/printer/scan-usb", get(handlers::printer::scan_usb))
        .route(
            "/api/printer/scan-usb-lsusb",
            get(handlers::printer::scan_usb_lsusb),
        )
        .route(
            "/api/printer/set-usb-device",
            post(handlers::printer::set_usb_device),
        )
        .route("/api/printer/set-usb-ids", post(handlers::printer::set_usb_ids))
        .route("/api/printer/usb-ids", get(handlers::printer::usb_ids))
        .route(
            "/api/printer/check-usb-access",
            get(handlers::printer::check_usb_access),
        )
        // Printing
        .route("/api/print", post(handlers::print::print))
        .route("/api/print/receipt", post(handlers::print::receipt))
        .route("/api/print/test", post(handlers::print::test))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the HTTP server.
///
/// The TCP fallback handle is built before the listener opens, so a handle
/// exists by the time the first request arrives.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use receipt_bridge::discovery::SystemEnumerator;
/// use receipt_bridge::printer::{Backends, PrintService, PrinterState};
/// use receipt_bridge::server::{serve, ServerConfig};
/// use receipt_bridge::transport::{HelperProcess, LpSpooler, SystemLinks};
///
/// # async fn example() -> Result<(), receipt_bridge::BridgeError> {
/// let state = Arc::new(PrinterState::new(Arc::new(SystemLinks), "tcp://localhost:9100"));
/// let backends = Backends {
///     enumerator: Arc::new(SystemEnumerator::default()),
///     spooler: Arc::new(LpSpooler),
///     usb_helper: Arc::new(HelperProcess::from_command_line("python3 print_usb.py")?),
/// };
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:3100".to_string(),
/// };
///
/// serve(config, PrintService::new(state, backends)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, service: PrintService) -> Result<(), BridgeError> {
    service.state().initialize().await;

    let app_state = Arc::new(AppState::new(config, service));
    let listen_addr = app_state.config.listen_addr.clone();
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| BridgeError::Transport(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    info!(addr = %listen_addr, "Server running");
    info!("API endpoints available at http://{}/api", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BridgeError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
