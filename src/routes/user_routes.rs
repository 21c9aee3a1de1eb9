use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AuthError;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use crate::validation::{validate_register_request, RegisterRequest};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/users", post(register))
}

/// Validates a registration. Accounts live in the credential backend; nothing is stored here.
async fn register(
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), HTTPError> {
    let Json(request) = body.map_err(|e| HTTPError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    validate_register_request(&request).map_err(AuthError::Validation)?;

    info!("Registration accepted for '{}'", request.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}
