//! Bearer-token gate for protected routes.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::AppState;
use super::error::ApiError;

/// Token from the `Authorization` header. The `Bearer ` prefix is optional
/// because the web client sends the bare token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Middleware: validate the token and attach the caller's
/// [`Identity`](crate::auth::Identity) to the request extensions.
///
/// Every failure is a bare 401 and the request never reaches the handler.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        debug!(path = %req.uri().path(), "Missing authorization header");
        ApiError::Unauthorized
    })?;

    let identity = state.jwt.validate(token).map_err(|e| {
        debug!(error = %e, "Rejected token");
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
