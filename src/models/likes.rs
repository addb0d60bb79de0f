use sqlx::{FromRow, SqliteConnection, sqlite::SqliteExecutor};

use crate::error::AppError;

/// Represents the 'likes' association table: one row per (user, message).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Likes {
    pub id: i64,
    pub user_id: i64,
    pub message_id: i64,
}

impl Likes {
    /// Liking the same message twice is `AppError::Conflict`.
    pub async fn like(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        message_id: i64,
    ) -> Result<Likes, AppError> {
        let row = sqlx::query_as::<_, Likes>(
            "INSERT INTO likes (user_id, message_id) VALUES (?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(message_id)
        .fetch_one(db)
        .await?;

        Ok(row)
    }

    /// Returns whether a like was removed.
    pub async fn unlike(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        message_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND message_id = ?")
            .bind(user_id)
            .bind(message_id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_liked(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        message_id: i64,
    ) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND message_id = ?",
        )
        .bind(user_id)
        .bind(message_id)
        .fetch_one(db)
        .await?;

        Ok(count > 0)
    }

    /// Flips the like. Run it inside a transaction; returns `true` when the
    /// message ends up liked.
    pub async fn toggle(
        conn: &mut SqliteConnection,
        user_id: i64,
        message_id: i64,
    ) -> Result<bool, AppError> {
        if Self::unlike(&mut *conn, user_id, message_id).await? {
            return Ok(false);
        }

        Self::like(&mut *conn, user_id, message_id).await?;
        Ok(true)
    }

    pub async fn for_message(
        db: impl SqliteExecutor<'_>,
        message_id: i64,
    ) -> Result<Vec<Likes>, AppError> {
        let rows = sqlx::query_as::<_, Likes>("SELECT * FROM likes WHERE message_id = ?")
            .bind(message_id)
            .fetch_all(db)
            .await?;

        Ok(rows)
    }
}
