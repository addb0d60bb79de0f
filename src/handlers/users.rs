// src/handlers/users.rs

use std::collections::HashSet;

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{form_errors, render},
    models::{
        follows::Follows,
        likes::Likes,
        message::{Message, PAGE_SIZE},
        user::{ProfileForm, ProfileUpdate, User, UserSearchParams},
    },
    utils::{
        redirect::found,
        session::{CurrentUser, Visitor},
    },
    views,
};

async fn following_set(pool: &SqlitePool, viewer: Option<&User>) -> Result<HashSet<i64>, AppError> {
    match viewer {
        Some(v) => Ok(v.following_ids(pool).await?.into_iter().collect()),
        None => Ok(HashSet::new()),
    }
}

async fn liked_set(pool: &SqlitePool, viewer: &User) -> Result<HashSet<i64>, AppError> {
    Ok(viewer.liked_message_ids(pool).await?.into_iter().collect())
}

async fn header_for(
    pool: &SqlitePool,
    user: &User,
    viewer: Option<&User>,
) -> Result<String, AppError> {
    let counts = user.counts(pool).await?;
    let following = following_set(pool, viewer).await?;
    Ok(views::profile_header(user, &counts, viewer, &following))
}

/// Lists users, filtered by `?q=` when given.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    Visitor { user, mut session }: Visitor,
    Query(params): Query<UserSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let users = User::list(&pool, params.q.as_deref()).await?;

    let body = views::user_index(&users, params.q.as_deref());
    let page = render(&mut session, "Users", user.as_ref(), &body);
    Ok((session, page))
}

/// Public profile with the user's newest messages.
pub async fn show_user(
    State(pool): State<SqlitePool>,
    Visitor { user: viewer, mut session }: Visitor,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::get(&pool, id).await?;
    let messages = user.messages(&pool, PAGE_SIZE).await?;
    let liked = match &viewer {
        Some(v) => Some(liked_set(&pool, v).await?),
        None => None,
    };

    let header = header_for(&pool, &user, viewer.as_ref()).await?;
    let body = views::profile(header, &user, &messages, liked.as_ref());
    let page = render(&mut session, &user.username, viewer.as_ref(), &body);
    Ok((session, page))
}

/// Users that `id` follows. Logged-in only.
pub async fn show_following(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::get(&pool, id).await?;
    let following = user.following(&pool).await?;

    let header = header_for(&pool, &user, Some(&me)).await?;
    let body = views::user_list(header, "Following", &following);
    let page = render(&mut session, "Following", Some(&me), &body);
    Ok((session, page))
}

/// Users following `id`. Logged-in only.
pub async fn show_followers(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::get(&pool, id).await?;
    let followers = user.followers(&pool).await?;

    let header = header_for(&pool, &user, Some(&me)).await?;
    let body = views::user_list(header, "Followers", &followers);
    let page = render(&mut session, "Followers", Some(&me), &body);
    Ok((session, page))
}

/// Messages `id` liked. Logged-in only.
pub async fn show_likes(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::get(&pool, id).await?;
    let liked = user.liked_messages(&pool).await?;
    let my_likes = liked_set(&pool, &me).await?;

    let header = header_for(&pool, &user, Some(&me)).await?;
    let body = views::likes(header, &liked, &my_likes);
    let page = render(&mut session, "Likes", Some(&me), &body);
    Ok((session, page))
}

/// The logged-in user starts following `follow_id`.
pub async fn follow(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    WithRejection(Path(follow_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Response, AppError> {
    let target = User::get(&pool, follow_id).await?;

    if target.id == me.id {
        session.flash("danger", "You cannot follow yourself.");
        return Ok((session, found(format!("/users/{}", me.id))).into_response());
    }

    match Follows::follow(&pool, me.id, target.id).await {
        Ok(_) => tracing::info!(follower = me.id, followed = target.id, "Follow created"),
        // Already following; nothing to do.
        Err(e) if e.is_conflict() => {}
        Err(e) => return Err(e),
    }

    Ok((session, found(format!("/users/{}/following", me.id))).into_response())
}

/// The logged-in user stops following `follow_id`.
pub async fn stop_following(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, session }: CurrentUser,
    WithRejection(Path(follow_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    if Follows::unfollow(&pool, me.id, follow_id).await? {
        tracing::info!(follower = me.id, followed = follow_id, "Follow removed");
    }

    Ok((session, found(format!("/users/{}/following", me.id))))
}

/// Toggles the logged-in user's like on a message.
pub async fn add_like(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, session }: CurrentUser,
    WithRejection(Path(msg_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    Message::find(&pool, msg_id)
        .await?
        .ok_or(AppError::NotFound("Message not found".to_string()))?;

    let mut tx = pool.begin().await?;
    let liked = Likes::toggle(&mut tx, me.id, msg_id).await?;
    tx.commit().await?;

    tracing::debug!(user_id = me.id, message_id = msg_id, liked, "Like toggled");

    Ok((session, found("/")))
}

pub async fn edit_profile_form(
    CurrentUser { user: me, mut session }: CurrentUser,
) -> impl IntoResponse {
    let form = ProfileForm {
        username: me.username.clone(),
        email: me.email.clone(),
        image_url: Some(me.image_url.clone()),
        header_image_url: Some(me.header_image_url.clone()),
        bio: me.bio.clone(),
        location: me.location.clone(),
        password: String::new(),
    };

    let page = render(
        &mut session,
        "Edit profile",
        Some(&me),
        &views::profile_form(&form, &[]),
    );
    (session, page)
}

/// Updates the logged-in user's profile after re-checking their password.
pub async fn edit_profile(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = form.validate() {
        let body = views::profile_form(&form, &form_errors(&validation_errors));
        let page = render(&mut session, "Edit profile", Some(&me), &body);
        return Ok((session, page).into_response());
    }

    if User::authenticate(&pool, &me.username, &form.password)
        .await?
        .is_none()
    {
        tracing::warn!(user_id = me.id, "Profile edit with wrong password");
        session.flash("danger", "Wrong password, please try again.");
        return Ok((session, found("/")).into_response());
    }

    match me.update_profile(&pool, ProfileUpdate::from(&form)).await {
        Ok(updated) => {
            tracing::info!(user_id = updated.id, "Profile updated");
            Ok((session, found(format!("/users/{}", updated.id))).into_response())
        }
        Err(e) if e.is_conflict() => {
            session.flash("danger", "Username or email already taken");
            let page = render(
                &mut session,
                "Edit profile",
                Some(&me),
                &views::profile_form(&form, &[]),
            );
            Ok((session, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Deletes the logged-in user and ends the session.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    CurrentUser { user: me, mut session }: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    User::delete(&pool, me.id).await?;
    tracing::info!(user_id = me.id, "User deleted: {}", me.username);

    session.logout();
    session.flash("success", "Your account has been deleted.");
    Ok((session, found("/signup")))
}
