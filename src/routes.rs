// src/routes.rs

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, home, messages, users},
    state::AppState,
};

/// Assembles the application router.
///
/// * Pages for auth, users and messages.
/// * Static assets under `/static`.
/// * Global tracing middleware and the shared state.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route(
            "/profile",
            get(users::edit_profile_form).post(users::edit_profile),
        )
        .route("/delete", post(users::delete_user))
        .route("/follow/{follow_id}", post(users::follow))
        .route("/stop-following/{follow_id}", post(users::stop_following))
        .route("/add_like/{msg_id}", post(users::add_like))
        .route("/{id}", get(users::show_user))
        .route("/{id}/following", get(users::show_following))
        .route("/{id}/followers", get(users::show_followers))
        .route("/{id}/likes", get(users::show_likes));

    let message_routes = Router::new()
        .route(
            "/new",
            get(messages::new_message_form).post(messages::create_message),
        )
        .route("/{id}", get(messages::show_message))
        .route("/{id}/delete", post(messages::delete_message));

    Router::new()
        .route("/", get(home::homepage))
        .merge(auth_routes)
        .nest("/users", user_routes)
        .nest("/messages", message_routes)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(home::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
