use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::AppJson;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::api::upload::read_file_field;
use crate::db::{ProfileChanges, User, UserRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub profile_picture: String,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// GET /api/user (requires auth)
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::get_by_id(&state.db, &auth.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user))
}

/// PUT /api/user (requires auth)
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let name = match req.name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        Some(name) => Some(name.trim().to_string()),
        None => None,
    };

    let changes = ProfileChanges {
        name,
        phone_number: req.phone_number.map(|p| p.trim().to_string()),
    };

    let user = UserRepository::update_profile(&state.db, &auth.user_id, changes)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(user))
}

/// POST /api/user/avatar (requires auth, multipart field `avatar`)
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let upload = read_file_field(multipart, "avatar", "application/octet-stream").await?;
    let picture = upload.to_data_uri();

    let user = UserRepository::set_profile_picture(&state.db, &auth.user_id, &picture)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %user.id, bytes = upload.bytes.len(), "🖼️ Avatar updated");

    Ok(Json(AvatarResponse {
        profile_picture: user.profile_picture.unwrap_or(picture),
    }))
}
