use sqlx::{FromRow, sqlite::SqliteExecutor};

use crate::error::AppError;

/// Represents the 'follows' association table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Follows {
    pub user_being_followed_id: i64,
    pub user_following_id: i64,
}

impl Follows {
    /// `follower_id` starts following `followed_id`. Following twice is
    /// `AppError::Conflict`.
    pub async fn follow(
        db: impl SqliteExecutor<'_>,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<Follows, AppError> {
        let row = sqlx::query_as::<_, Follows>(
            r#"
            INSERT INTO follows (user_being_followed_id, user_following_id)
            VALUES (?, ?)
            RETURNING *
            "#,
        )
        .bind(followed_id)
        .bind(follower_id)
        .fetch_one(db)
        .await?;

        Ok(row)
    }

    /// Returns whether the pair existed.
    pub async fn unfollow(
        db: impl SqliteExecutor<'_>,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE user_being_followed_id = ? AND user_following_id = ?",
        )
        .bind(followed_id)
        .bind(follower_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn all(db: impl SqliteExecutor<'_>) -> Result<Vec<Follows>, AppError> {
        let rows = sqlx::query_as::<_, Follows>("SELECT * FROM follows")
            .fetch_all(db)
            .await?;

        Ok(rows)
    }
}
