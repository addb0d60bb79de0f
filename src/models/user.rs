// src/models/user.rs

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use sqlx::{FromRow, sqlite::SqliteExecutor};
use validator::Validate;

use crate::{
    error::AppError,
    models::message::{Message, MessageWithAuthor},
    utils::hash::{hash_password, verify_password},
};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.svg";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.svg";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("username pattern compiles"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,

    /// Unique username.
    pub username: String,

    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,

    /// Argon2 password hash.
    pub password: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

/// Profile header counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct UserCounts {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

/// A user staged for insertion. Nothing touches the database until
/// [`NewUser::insert`], which is where uniqueness is enforced.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

impl NewUser {
    /// Stages a user with a freshly hashed password.
    pub fn signup(
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password: hash_password(password)?,
            image_url: non_blank(image_url),
        })
    }

    /// Stages a user with `password` stored exactly as given.
    pub fn raw(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            image_url: None,
        }
    }

    /// Commits the staged user. A duplicate username or email is
    /// `AppError::Conflict`.
    pub async fn insert(self, db: impl SqliteExecutor<'_>) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, image_url)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&self.username)
        .bind(&self.email)
        .bind(&self.password)
        .bind(self.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL))
        .fetch_one(db)
        .await?;

        Ok(user)
    }
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl User {
    /// Returns the user only if `password` verifies against the stored hash.
    pub async fn authenticate(
        db: impl SqliteExecutor<'_>,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user = Self::find_by_username(db, username).await?;

        Ok(user.filter(|u| verify_password(password, &u.password)))
    }

    pub async fn find(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(user)
    }

    /// Like [`User::find`], but absence is `NotFound`.
    pub async fn get(db: impl SqliteExecutor<'_>, id: i64) -> Result<User, AppError> {
        Self::find(db, id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_username(
        db: impl SqliteExecutor<'_>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await?;

        Ok(user)
    }

    /// Lists users, optionally filtered by a case-sensitive username
    /// substring. `%` and `_` are matched literally.
    pub async fn list(
        db: impl SqliteExecutor<'_>,
        search: Option<&str>,
    ) -> Result<Vec<User>, AppError> {
        let needle = search.map(str::trim).filter(|q| !q.is_empty());

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ?1 IS NULL OR instr(username, ?1) > 0
            ORDER BY username
            "#,
        )
        .bind(needle)
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    /// Is this user following `other`?
    pub async fn is_following(
        &self,
        db: impl SqliteExecutor<'_>,
        other: &User,
    ) -> Result<bool, AppError> {
        follow_exists(db, self.id, other.id).await
    }

    /// Is this user followed by `other`?
    pub async fn is_followed_by(
        &self,
        db: impl SqliteExecutor<'_>,
        other: &User,
    ) -> Result<bool, AppError> {
        follow_exists(db, other.id, self.id).await
    }

    /// Users this user follows.
    pub async fn following(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN follows f ON f.user_being_followed_id = u.id
            WHERE f.user_following_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(self.id)
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    /// Users following this user.
    pub async fn followers(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN follows f ON f.user_following_id = u.id
            WHERE f.user_being_followed_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(self.id)
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    /// Ids of the users this user follows.
    pub async fn following_ids(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_being_followed_id FROM follows WHERE user_following_id = ?",
        )
        .bind(self.id)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }

    /// Newest messages written by this user.
    pub async fn messages(
        &self,
        db: impl SqliteExecutor<'_>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(self.id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }

    /// Messages this user liked, newest first.
    pub async fn liked_messages(
        &self,
        db: impl SqliteExecutor<'_>,
    ) -> Result<Vec<MessageWithAuthor>, AppError> {
        let messages = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            JOIN likes l ON l.message_id = m.id
            WHERE l.user_id = ?
            ORDER BY m.timestamp DESC, m.id DESC
            "#,
        )
        .bind(self.id)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }

    pub async fn liked_message_ids(
        &self,
        db: impl SqliteExecutor<'_>,
    ) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT message_id FROM likes WHERE user_id = ?")
            .bind(self.id)
            .fetch_all(db)
            .await?;

        Ok(ids)
    }

    pub async fn counts(&self, db: impl SqliteExecutor<'_>) -> Result<UserCounts, AppError> {
        let counts = sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM messages WHERE user_id = ?1) AS messages,
                (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1) AS following,
                (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1) AS followers,
                (SELECT COUNT(*) FROM likes WHERE user_id = ?1) AS likes
            "#,
        )
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(counts)
    }

    /// Applies a profile edit. Taking another user's username or email is
    /// `AppError::Conflict`.
    pub async fn update_profile(
        &self,
        db: impl SqliteExecutor<'_>,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = ?, email = ?, image_url = ?, header_image_url = ?,
                bio = ?, location = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(non_blank(update.image_url.as_deref()).unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()))
        .bind(
            non_blank(update.header_image_url.as_deref())
                .unwrap_or_else(|| DEFAULT_HEADER_IMAGE_URL.to_string()),
        )
        .bind(non_blank(update.bio.as_deref()))
        .bind(non_blank(update.location.as_deref()))
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    /// Removes the user; messages, follows and likes go with it.
    pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn follow_exists(
    db: impl SqliteExecutor<'_>,
    follower_id: i64,
    followed_id: i64,
) -> Result<bool, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM follows
        WHERE user_following_id = ? AND user_being_followed_id = ?
        "#,
    )
    .bind(follower_id)
    .bind(followed_id)
    .fetch_one(db)
    .await?;

    Ok(count > 0)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Usernames are limited to letters, digits, `_`, `.` and `-`.
fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(validator::ValidationError::new("invalid_username")
            .with_message("Username may only contain letters, digits, _ . and -".into()));
    }
    Ok(())
}

/// Empty means "use the default image"; anything else must be an absolute
/// http(s) URL or a site-relative path.
fn validate_image_url(value: &str) -> Result<(), validator::ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('/') {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_image_url")
            .with_message("Image URL must be an http(s) URL.".into())),
    }
}

/// Form for signing up.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(
        length(min = 1, max = 50, message = "Username must be between 1 and 50 characters."),
        custom(function = validate_username)
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters."))]
    pub password: String,

    #[serde(default)]
    #[validate(custom(function = validate_image_url))]
    pub image_url: Option<String>,
}

/// Form for logging in.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 50, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required."))]
    pub password: String,
}

/// Form for editing the logged-in user's profile. `password` confirms the
/// edit and is never changed here.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(
        length(min = 1, max = 50, message = "Username must be between 1 and 50 characters."),
        custom(function = validate_username)
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = validate_image_url))]
    pub image_url: Option<String>,

    #[serde(default)]
    #[validate(custom(function = validate_image_url))]
    pub header_image_url: Option<String>,

    #[serde(default)]
    #[validate(length(max = 500, message = "Bio must be at most 500 characters."))]
    pub bio: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Location must be at most 100 characters."))]
    pub location: Option<String>,

    #[serde(default)]
    pub password: String,
}

impl From<&ProfileForm> for ProfileUpdate {
    fn from(form: &ProfileForm) -> Self {
        ProfileUpdate {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            image_url: form.image_url.clone(),
            header_image_url: form.header_image_url.clone(),
            bio: form.bio.clone(),
            location: form.location.clone(),
        }
    }
}

/// Query parameters for the user directory.
#[derive(Debug, Default, Deserialize)]
pub struct UserSearchParams {
    pub q: Option<String>,
}
