use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::api::state::AppState;
use crate::crypto::TokenService;
use crate::error::AppError;

/// Identity attached to a request once its bearer token checks out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Resolve an `Authorization` header value into the caller's identity.
///
/// A missing header is `Unauthenticated`; anything present but unusable
/// (wrong scheme, bad signature, expired) is `Forbidden`.
pub fn authenticate(
    auth_header: Option<&str>,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> Result<AuthUser, AppError> {
    let auth_header = auth_header
        .ok_or_else(|| AppError::Unauthenticated("No token provided".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Forbidden("Invalid Authorization format".to_string()))?;

    let claims = tokens.verify_at(token, now)?;

    Ok(AuthUser { user_id: claims.sub })
}

/// Header-level entry to `authenticate`; a value that is not visible ASCII
/// counts as present but malformed
pub fn authenticate_headers(
    headers: &HeaderMap,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> Result<AuthUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .map(|h| {
            h.to_str()
                .map_err(|_| AppError::Forbidden("Invalid Authorization format".to_string()))
        })
        .transpose()?;

    authenticate(auth_header, tokens, now)
}

/// Authentication middleware - validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_headers(request.headers(), &state.tokens, Utc::now()).map_err(|e| {
        tracing::debug!("🔒 Rejected request to {}: {}", request.uri().path(), e);
        e
    })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
