use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::{AppJson, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::db::{
    ListNotesParams, NewNote, Note, NoteChanges, NotePage, NoteQuery, NoteRepository, DEFAULT_TAG,
};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub(crate) fn note_not_found() -> AppError {
    AppError::NotFound("Note not found".to_string())
}

/// Trim, drop blanks and duplicates, keeping first-seen order
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}

fn required_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}

/// POST /api/notes (requires auth)
pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(req): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let title = required_title(&req.title)?;

    let mut tags = clean_tags(req.tags.unwrap_or_default());
    if tags.is_empty() {
        tags.push(DEFAULT_TAG.to_string());
    }

    let note = NoteRepository::create(
        &state.db,
        &auth.user_id,
        NewNote {
            title,
            content: req.content.unwrap_or_default(),
            summary: req.summary.filter(|s| !s.trim().is_empty()),
            tags,
        },
        chrono::Utc::now().timestamp_millis(),
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, note_id = %note.id, "📝 Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes (requires auth)
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppQuery(params): AppQuery<ListNotesParams>,
) -> Result<Json<NotePage>, AppError> {
    let query = NoteQuery::from_params(&auth.user_id, params, state.config.max_page_size)?;
    let page = NoteRepository::list(&state.db, &query).await?;

    tracing::debug!(
        user_id = %auth.user_id,
        page = page.current_page,
        total = page.total_notes,
        "Listed notes"
    );
    Ok(Json(page))
}

/// GET /api/notes/:id (requires auth)
pub async fn get_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = NoteRepository::get_for_owner(&state.db, &id, &auth.user_id)
        .await?
        .ok_or_else(note_not_found)?;

    Ok(Json(note))
}

/// PUT /api/notes/:id (requires auth)
pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let title = req.title.as_deref().map(required_title).transpose()?;

    let tags = req.tags.map(clean_tags).map(|tags| {
        if tags.is_empty() {
            vec![DEFAULT_TAG.to_string()]
        } else {
            tags
        }
    });

    let changes = NoteChanges {
        title,
        content: req.content,
        summary: req.summary,
        tags,
    };

    let note = NoteRepository::update_for_owner(&state.db, &id, &auth.user_id, changes)
        .await?
        .ok_or_else(note_not_found)?;

    tracing::info!(user_id = %auth.user_id, note_id = %note.id, "Note updated");
    Ok(Json(note))
}

/// DELETE /api/notes/:id (requires auth)
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !NoteRepository::delete_for_owner(&state.db, &id, &auth.user_id).await? {
        return Err(note_not_found());
    }

    tracing::info!(user_id = %auth.user_id, note_id = %id, "🗑️ Note deleted");
    Ok(Json(DeleteResponse {
        message: "Note deleted".to_string(),
    }))
}
