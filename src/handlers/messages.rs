// src/handlers/messages.rs

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{form_errors, render},
    models::message::{Message, MessageForm},
    utils::{
        redirect::found,
        session::{CurrentUser, Visitor, unauthorized},
    },
    views,
};

pub async fn new_message_form(
    CurrentUser { user: me, mut session }: CurrentUser,
) -> impl IntoResponse {
    let page = render(&mut session, "New message", Some(&me), &views::message_form("", &[]));
    (session, page)
}

/// Posts a message as the logged-in user, then shows their profile.
pub async fn create_message(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = form.validate() {
        let body = views::message_form(&form.text, &form_errors(&validation_errors));
        let page = render(&mut session, "New message", Some(&me), &body);
        return Ok((session, page).into_response());
    }

    let message = Message::create(&pool, me.id, &form.text).await?;
    tracing::info!(user_id = me.id, message_id = message.id, "Message created");

    Ok((session, found(format!("/users/{}", me.id))).into_response())
}

/// Public view of a single message.
pub async fn show_message(
    State(pool): State<SqlitePool>,
    Visitor { user: viewer, mut session }: Visitor,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let message = Message::find_with_author(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Message not found".to_string()))?;

    let can_delete = viewer.as_ref().is_some_and(|v| v.id == message.user_id);
    let body = views::message_show(&message, can_delete);
    let page = render(&mut session, "Message", viewer.as_ref(), &body);
    Ok((session, page))
}

/// Deletes a message. Only its owner may do so; anyone else gets the
/// unauthorized redirect and the message stays.
pub async fn delete_message(
    State(pool): State<SqlitePool>,
    Visitor { user: viewer, session }: Visitor,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Response, AppError> {
    let Some(me) = viewer else {
        return Ok(unauthorized(session));
    };

    let message = Message::find(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Message not found".to_string()))?;

    if message.user_id != me.id {
        tracing::warn!(
            user_id = me.id,
            message_id = id,
            "Refused to delete another user's message"
        );
        return Ok(unauthorized(session));
    }

    Message::delete(&pool, id).await?;
    tracing::info!(user_id = me.id, message_id = id, "Message deleted");

    Ok((session, found(format!("/users/{}", me.id))).into_response())
}
