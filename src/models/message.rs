use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, sqlite::SqliteExecutor};
use validator::Validate;

use crate::error::AppError;

/// How many messages the home timeline and profile pages show.
pub const PAGE_SIZE: i64 = 100;

/// Represents the 'messages' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Owning user. Always refers to an existing user.
    pub user_id: i64,
}

/// A message joined with its author, for rendering.
#[derive(Debug, Clone, FromRow)]
pub struct MessageWithAuthor {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub image_url: String,
}

impl Message {
    /// Inserts a message owned by `user_id`. An unknown owner is
    /// `AppError::Conflict`.
    pub async fn create(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        text: &str,
    ) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (text, timestamp, user_id)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(text)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(message)
    }

    pub async fn find(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(message)
    }

    pub async fn find_with_author(
        db: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<MessageWithAuthor>, AppError> {
        let message = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(message)
    }

    pub async fn for_user(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE user_id = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }

    /// Newest messages by `user_id` and everyone they follow.
    pub async fn timeline(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageWithAuthor>, AppError> {
        let messages = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.user_id = ?1
               OR m.user_id IN (
                   SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
               )
            ORDER BY m.timestamp DESC, m.id DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }

    /// Returns whether a row was removed.
    pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Form for posting a message.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(length(
        min = 1,
        max = 140,
        message = "Message must be between 1 and 140 characters."
    ))]
    pub text: String,
}
