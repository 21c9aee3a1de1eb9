//! HTTP route definitions and handlers.
//!
//! Groups the session endpoints used by the client (`/api/auth/*`), user
//! registration (`/api/v1/users`), the sitemap and `robots.txt`, and the
//! health check.

mod auth_routes;
mod health_routes;
mod seo_routes;
mod user_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all routes and the shared state attached.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(user_routes::routes())
        .merge(seo_routes::routes())
        .merge(health_routes::routes())
        .with_state(state)
}
