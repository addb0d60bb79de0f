// src/handlers/auth.rs

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{form_errors, render},
    models::user::{LoginForm, NewUser, SignupForm, User},
    utils::{redirect::found, session::Session},
    views,
};

pub async fn signup_form(mut session: Session) -> impl IntoResponse {
    let page = render(
        &mut session,
        "Sign up",
        None,
        &views::signup_form(&SignupForm::default(), &[]),
    );
    (session, page)
}

/// Registers a new user and logs them in.
///
/// Hashes the password using Argon2 before storing it. A taken username or
/// email re-renders the form with a flash instead of failing the request.
pub async fn signup(
    State(pool): State<SqlitePool>,
    mut session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = form.validate() {
        let body = views::signup_form(&form, &form_errors(&validation_errors));
        let page = render(&mut session, "Sign up", None, &body);
        return Ok((session, page).into_response());
    }

    let staged = NewUser::signup(
        form.username.trim(),
        form.email.trim(),
        &form.password,
        form.image_url.as_deref(),
    )?;

    match staged.insert(&pool).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "New user signed up: {}", user.username);
            session.login(user.id);
            Ok((session, found("/")).into_response())
        }
        Err(e) if e.is_conflict() => {
            tracing::info!("Signup rejected, duplicate username or email: {}", form.username);
            session.flash("danger", "Username already taken");
            let page = render(&mut session, "Sign up", None, &views::signup_form(&form, &[]));
            Ok((session, page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn login_form(mut session: Session) -> impl IntoResponse {
    let page = render(&mut session, "Log in", None, &views::login_form("", &[]));
    (session, page)
}

/// Verifies the username and password against the database and stores the
/// user id in the session.
pub async fn login(
    State(pool): State<SqlitePool>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = form.validate() {
        let body = views::login_form(&form.username, &form_errors(&validation_errors));
        let page = render(&mut session, "Log in", None, &body);
        return Ok((session, page).into_response());
    }

    match User::authenticate(&pool, &form.username, &form.password).await? {
        Some(user) => {
            tracing::info!(user_id = user.id, "User logged in");
            session.login(user.id);
            session.flash("success", format!("Hello, {}!", user.username));
            Ok((session, found("/")).into_response())
        }
        None => {
            tracing::warn!("Failed login attempt for username: {}", form.username);
            session.flash("danger", "Invalid credentials.");
            let page = render(
                &mut session,
                "Log in",
                None,
                &views::login_form(&form.username, &[]),
            );
            Ok((session, page).into_response())
        }
    }
}

pub async fn logout(mut session: Session) -> impl IntoResponse {
    session.logout();
    session.flash("success", "You have successfully logged out.");
    (session, found("/login"))
}
