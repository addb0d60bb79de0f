// src/handlers/mod.rs

pub mod auth;
pub mod home;
pub mod messages;
pub mod users;

use axum::response::Html;
use validator::ValidationErrors;

use crate::{
    models::user::User,
    utils::{html, session::Session},
};

/// Renders a page, consuming the flashes queued in `session`.
pub(crate) fn render(
    session: &mut Session,
    title: &str,
    viewer: Option<&User>,
    body: &str,
) -> Html<String> {
    let flashes = session.take_flashes();
    html::layout(title, viewer, &flashes, body)
}

/// Flattens validator output into user-facing messages, sorted by field.
pub(crate) fn form_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {field}."),
            })
        })
        .collect()
}
