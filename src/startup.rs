//! Application startup and server initialization.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::Auth;
use crate::backend::create_backend;
use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;

/// Build the shared state for a configuration: credential backend and session auth.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    let backend = create_backend(&config.backend);
    let auth = Arc::new(Auth::new(backend, &config.session));
    AppState { config, auth }
}

/// Initializes and runs the HTTP server until it fails.
///
/// # Errors
///
/// Returns an error if the server cannot bind to `bind_address` or stops with an I/O error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone());
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
