use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

pub const DEFAULT_TAG: &str = "Live Recording";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: Option<String>,
    /// `data:<mime>;base64,<payload>`
    pub profile_picture: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub tags: Json<Vec<String>>,
    /// Unix milliseconds
    pub date: i64,
}

/// Fields accepted when creating a note; the owner is supplied separately
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

/// Partial note update; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial profile update
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}
