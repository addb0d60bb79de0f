use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// `302 Found` to `location`.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}
