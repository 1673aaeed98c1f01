//! Admin login, logout, and the session-token middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/admin/login
///
/// Checks the password against the configured list and issues a session
/// token for the admin surface.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    fg_common::auth::verify_password(&request.password, &state.admin_passwords).map_err(|e| {
        warn!("Admin login rejected: {}", e);
        ApiError::Unauthorized(e.to_string())
    })?;

    let token = state.sessions.issue();
    info!("Admin session opened");
    Ok(Json(LoginResponse { token }))
}

/// POST /api/admin/logout
///
/// Revokes the presented session token.
pub async fn logout(State(state): State<AppState>, request: Request) -> ApiResult<Json<serde_json::Value>> {
    if let Some(token) = bearer_token(&request) {
        state.sessions.revoke(&token);
        info!("Admin session closed");
    }
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Middleware guarding `/api/admin/*` routes (login excepted)
///
/// Expects `Authorization: Bearer <token>`; 401 on anything else.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .sessions
        .validate(&token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    Ok(next.run(request).await)
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}
