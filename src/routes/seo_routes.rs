use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use tracing::debug;

use crate::seo::{render_sitemap, robots_txt, server_sitemap_entries};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/server-sitemap.xml", get(server_sitemap))
        .route("/robots.txt", get(robots))
}

async fn server_sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let entries = server_sitemap_entries(&state.config.site, Utc::now());
    debug!("Serving sitemap with {} entries", entries.len());
    (
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap(&entries),
    )
}

async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&state.config.site),
    )
}
