use std::collections::HashSet;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::render,
    models::message::{Message, PAGE_SIZE},
    utils::session::Visitor,
    views,
};

/// Anonymous visitors get the landing page; logged-in users get their
/// timeline (own messages plus everyone they follow).
pub async fn homepage(
    State(pool): State<SqlitePool>,
    Visitor { user, mut session }: Visitor,
) -> Result<impl IntoResponse, AppError> {
    let Some(user) = user else {
        let page = render(&mut session, "Warbler", None, &views::home_anon());
        return Ok((session, page));
    };

    let messages = Message::timeline(&pool, user.id, PAGE_SIZE).await?;
    let liked: HashSet<i64> = user.liked_message_ids(&pool).await?.into_iter().collect();
    let counts = user.counts(&pool).await?;

    let body = views::home(&user, &counts, &messages, &liked);
    let page = render(&mut session, "Home", Some(&user), &body);
    Ok((session, page))
}

pub async fn not_found(Visitor { user, mut session }: Visitor) -> impl IntoResponse {
    let page = render(&mut session, "Not found", user.as_ref(), &views::not_found());
    (StatusCode::NOT_FOUND, session, page)
}
