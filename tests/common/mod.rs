// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use reqwest::{Client, redirect::Policy};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use warbler::{
    config::Config,
    models::user::{NewUser, User},
    routes,
    state::AppState,
    utils::session::{SESSION_COOKIE, SessionData, encode_session},
};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub config: Config,
}

/// Spawns the app on a random port, backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let pool = test_pool().await;

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        secret_key: TEST_SECRET.to_string(),
        session_ttl: 600,
        rust_log: "error".to_string(),
        port: 0,
    };

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        config,
    }
}

/// A single never-recycled connection, so the in-memory database lives as
/// long as the pool.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Cookie header value of a session logged in as `user_id`.
    pub fn session_cookie(&self, user_id: i64) -> String {
        let data = SessionData {
            curr_user: Some(user_id),
            flashes: vec![],
        };
        let token = encode_session(&data, &self.config.secret_key, self.config.session_ttl).unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

/// Client that follows redirects and keeps cookies between hops.
pub fn browser() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

pub async fn signup(pool: &SqlitePool, username: &str, email: &str, password: &str) -> User {
    NewUser::signup(username, email, password, None)
        .unwrap()
        .insert(pool)
        .await
        .unwrap()
}

pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
}
