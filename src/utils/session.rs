// src/utils/session.rs

use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{config::Config, error::AppError, models::user::User, utils::redirect::found};

/// Name of the cookie carrying the signed session.
pub const SESSION_COOKIE: &str = "session";

pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn new(category: &str, message: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            message: message.into(),
        }
    }
}

/// Server-trusted session contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Logged-in user id. Absent means anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_user: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.curr_user.is_none() && self.flashes.is_empty()
    }
}

/// JWT claims wrapping the session data.
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    #[serde(flatten)]
    data: SessionData,
    /// Expiration time as Unix timestamp.
    exp: usize,
}

/// Signs session data into a cookie value.
pub fn encode_session(data: &SessionData, secret: &str, ttl_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs()
        .saturating_add(ttl_seconds);

    let claims = Claims {
        data: data.clone(),
        exp: expiration as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verifies a cookie value. Expired or tampered tokens yield `None`.
pub fn decode_session(token: &str, secret: &str) -> Option<SessionData> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|token_data| token_data.claims.data)
}

/// Cookie-backed session.
///
/// Extract it in a handler, mutate it, and return it as part of the response
/// (`(session, body)`) so changes are written back as a `Set-Cookie`.
#[derive(Debug)]
pub struct Session {
    jar: CookieJar,
    data: SessionData,
    secret: String,
    ttl: u64,
    dirty: bool,
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.data.curr_user
    }

    /// Resolves the session user. A session that points at a deleted user is
    /// treated as anonymous.
    pub async fn user(&self, pool: &SqlitePool) -> Result<Option<User>, AppError> {
        match self.data.curr_user {
            Some(id) => User::find(pool, id).await,
            None => Ok(None),
        }
    }

    pub fn login(&mut self, user_id: i64) {
        self.data.curr_user = Some(user_id);
        self.dirty = true;
    }

    pub fn logout(&mut self) {
        if self.data.curr_user.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn flash(&mut self, category: &str, message: impl Into<String>) {
        self.data.flashes.push(Flash::new(category, message));
        self.dirty = true;
    }

    /// Removes and returns queued flashes.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if !self.data.flashes.is_empty() {
            self.dirty = true;
        }
        std::mem::take(&mut self.data.flashes)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Config: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Config::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let data = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| decode_session(cookie.value(), &config.secret_key))
            .unwrap_or_default();

        Ok(Session {
            jar,
            data,
            secret: config.secret_key,
            ttl: config.session_ttl,
            dirty: false,
        })
    }
}

impl IntoResponseParts for Session {
    type Error = AppError;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.dirty {
            return Ok(res);
        }

        let jar = if self.data.is_empty() {
            self.jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
        } else {
            let token = encode_session(&self.data, &self.secret, self.ttl)?;
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            self.jar.add(cookie)
        };

        jar.into_response_parts(res).map_err(|never| match never {})
    }
}

/// Flashes "Access unauthorized." and sends the client home.
pub fn unauthorized(mut session: Session) -> Response {
    session.flash("danger", ACCESS_UNAUTHORIZED);
    (session, found("/")).into_response()
}

/// Any visitor, logged in or not.
pub struct Visitor {
    pub user: Option<User>,
    pub session: Session,
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
    Config: FromRef<S>,
    SqlitePool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await;
        let pool = SqlitePool::from_ref(state);
        let user = session.user(&pool).await?;

        Ok(Visitor { user, session })
    }
}

/// A logged-in user. Rejects anonymous requests with the unauthorized
/// redirect.
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Config: FromRef<S>,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await;
        let pool = SqlitePool::from_ref(state);

        match session.user(&pool).await {
            Ok(Some(user)) => Ok(CurrentUser { user, session }),
            Ok(None) => {
                tracing::debug!("Rejected anonymous request to a protected route");
                Err(unauthorized(session))
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "session_unit_test_secret";

    #[test]
    fn encoded_session_round_trips_user_and_flashes() {
        let data = SessionData {
            curr_user: Some(7),
            flashes: vec![Flash::new("success", "Hello, Franky!")],
        };
        let token = encode_session(&data, SECRET, 60).unwrap();

        assert_eq!(decode_session(&token, SECRET), Some(data));
    }

    #[test]
    fn wrong_secret_is_anonymous() {
        let data = SessionData {
            curr_user: Some(1),
            flashes: vec![],
        };
        let token = encode_session(&data, SECRET, 60).unwrap();

        assert_eq!(decode_session(&token, "another_secret"), None);
        assert_eq!(decode_session("not-a-token", SECRET), None);
    }

    #[test]
    fn huge_ttl_saturates_instead_of_overflowing() {
        let data = SessionData {
            curr_user: Some(3),
            flashes: vec![],
        };
        let token = encode_session(&data, SECRET, u64::MAX).unwrap();

        assert_eq!(decode_session(&token, SECRET), Some(data));
    }

    #[test]
    fn anonymous_session_carries_only_expiry() {
        let token = encode_session(&SessionData::default(), SECRET, 60).unwrap();
        let claims = decode::<std::collections::HashMap<String, u64>>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        )
        .unwrap()
        .claims;

        assert_eq!(claims.keys().collect::<Vec<_>>(), vec!["exp"]);
    }
}
