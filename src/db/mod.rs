pub mod models;
pub mod users;
pub mod notes;

pub use models::{NewNote, Note, NoteChanges, ProfileChanges, User, DEFAULT_TAG};
pub use users::UserRepository;
pub use notes::{ListNotesParams, NotePage, NoteQuery, NoteRepository, SortOrder, TagFilter};

use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::error::AppError;

pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<Pool<Sqlite>, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    Ok(pool)
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// A migrated single-connection in-memory database
#[cfg(test)]
pub(crate) async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    migrate(&pool).await.expect("migrations");
    pool
}
