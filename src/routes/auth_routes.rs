//! Session endpoints: sign-in, session read and sign-out.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, info};

use crate::auth::IssuedSession;
use crate::state::AppState;
use crate::utils::http_helpers::{bearer_token, HTTPError};
use crate::validation::LoginForm;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/session", get(session))
        .route("/api/auth/signout", post(sign_out))
}

/// Verifies the credentials and returns a new session token with its session.
async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Json<IssuedSession>, HTTPError> {
    let Json(form) = body.map_err(|e| HTTPError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    let issued = state.auth.sign_in(&form, Utc::now().timestamp()).await?;
    info!("User '{}' signed in", issued.session.user.id);
    Ok(Json(issued))
}

/// Returns the current session, refreshing its access token when due, and the rolled session token.
async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IssuedSession>, HTTPError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| HTTPError::new(StatusCode::UNAUTHORIZED, "Unauthorized access"))?;
    let issued = state.auth.read_session(token, Utc::now().timestamp()).await?;
    Ok(Json(issued))
}

/// Sessions are self-contained tokens, so signing out only has to be acknowledged.
async fn sign_out(headers: HeaderMap) -> StatusCode {
    if bearer_token(&headers).is_some() {
        debug!("Session signed out");
    }
    StatusCode::NO_CONTENT
}
