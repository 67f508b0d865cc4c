use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::{ProfileChanges, User};
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Insert a user. A duplicate email surfaces as `AppError::Conflict`.
    pub async fn create(
        pool: &Pool<Sqlite>,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, name, email, password_hash, created_at)
VALUES (?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict("Email already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_profile(
        pool: &Pool<Sqlite>,
        id: &str,
        changes: ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
UPDATE users
SET name = COALESCE(?, name),
    phone_number = COALESCE(?, phone_number)
WHERE id = ?
RETURNING *
            "#,
        )
        .bind(changes.name)
        .bind(changes.phone_number)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn set_profile_picture(
        pool: &Pool<Sqlite>,
        id: &str,
        picture: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET profile_picture = ? WHERE id = ? RETURNING *"
        )
        .bind(picture)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
