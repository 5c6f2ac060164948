use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::shared::state::AppState;

/// Middleware that requires valid JWT authentication
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = super::jwt::validate_token(&state.jwt_secret, token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Make claims available to handlers via extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that attaches claims when a valid token is present but lets
/// anonymous requests through untouched.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        if let Ok(claims) = super::jwt::validate_token(&state.jwt_secret, &token) {
            req.extensions_mut().insert(claims);
        }
    }

    next.run(req).await
}
