use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::AppJson;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::crypto::{hash_password_blocking, verify_password_blocking};
use crate::db::UserRepository;
use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Trim and lowercase so lookups and the unique index agree
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    Ok(email)
}

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let email = normalize_email(&req.email)?;

    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if UserRepository::get_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let user = UserRepository::create(&state.db, &name, &email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "👤 New user registered");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created".to_string(),
            user: UserSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    let user = UserRepository::get_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::Credentials("User not found".to_string()))?;

    if !verify_password_blocking(req.password, user.password_hash).await? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::Credentials("Wrong password".to_string()));
    }

    let token = state.tokens.issue(&user.id)?;
    tracing::info!(user_id = %user.id, "🔑 User logged in");

    Ok(Json(LoginResponse { token }))
}

/// GET /api/dashboard (requires auth)
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = UserRepository::get_by_id(&state.db, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;

    Ok(Json(MessageResponse {
        message: format!("Welcome {}!", user.name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        for bad in ["", "ada", "@example.com", "ada@", "a@b@c"] {
            assert!(matches!(normalize_email(bad), Err(AppError::Validation(_))));
        }
    }
}
