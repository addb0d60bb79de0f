// tests/message_views_tests.rs

mod common;

use common::{browser, client, location, signup, spawn_app};
use reqwest::header::COOKIE;
use warbler::models::message::Message;

#[tokio::test]
async fn add_message_redirects_to_profile() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;

    let response = client()
        .post(app.url("/messages/new"))
        .header(COOKIE, app.session_cookie(user.id))
        .form(&[("text", "Hello")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(location(&response), format!("/users/{}", user.id));

    let messages = Message::for_user(&app.pool, user.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Hello");
}

#[tokio::test]
async fn add_message_requires_login() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;

    let response = client()
        .post(app.url("/messages/new"))
        .form(&[("text", "Hello")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(location(&response), "/");
    assert!(Message::for_user(&app.pool, user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_message_rejects_overlong_text() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;
    let text = "x".repeat(141);

    let response = client()
        .post(app.url("/messages/new"))
        .header(COOKIE, app.session_cookie(user.id))
        .form(&[("text", text.as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Message must be between 1 and 140 characters."));
    assert!(Message::for_user(&app.pool, user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn new_message_form_renders_for_logged_in_user() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;

    let response = client()
        .get(app.url("/messages/new"))
        .header(COOKIE, app.session_cookie(user.id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains(r#"action="/messages/new""#));
}

#[tokio::test]
async fn get_message_renders_text() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;
    let message = Message::create(&app.pool, user.id, "Big Test").await.unwrap();

    let response = client()
        .get(app.url(&format!("/messages/{}", message.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"<p class="single-message">Big Test</p>"#));
    assert!(html.contains("@testuser"));
}

#[tokio::test]
async fn get_message_shows_markup_as_text() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;
    let message = Message::create(&app.pool, user.id, "use Vec<T> or <b>bold</b>")
        .await
        .unwrap();

    let html = client()
        .get(app.url(&format!("/messages/{}", message.id)))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(r#"<p class="single-message">use Vec&lt;T&gt; or &lt;b&gt;bold"#));
    assert!(!html.contains("<b>bold"));
}

#[tokio::test]
async fn get_message_escapes_script() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;
    let message = Message::create(&app.pool, user.id, "<script>alert(1)</script>hi")
        .await
        .unwrap();

    let html = client()
        .get(app.url(&format!("/messages/{}", message.id)))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;"));
    assert!(html.contains("script&gt;hi</p>"));
}

#[tokio::test]
async fn get_missing_message_is_404() {
    let app = spawn_app().await;

    let response = client().get(app.url("/messages/4242")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_message_as_owner() {
    let app = spawn_app().await;
    let user = signup(&app.pool, "testuser", "test@test.com", "testuser").await;
    let message = Message::create(&app.pool, user.id, "Delete Test").await.unwrap();

    let response = client()
        .post(app.url(&format!("/messages/{}/delete", message.id)))
        .header(COOKIE, app.session_cookie(user.id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(location(&response), format!("/users/{}", user.id));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn delete_message_by_another_user_is_refused() {
    let app = spawn_app().await;
    let owner = signup(&app.pool, "owner", "owner@test.com", "testuser").await;
    let intruder = signup(&app.pool, "intruder", "intruder@test.com", "testuser").await;
    let message = Message::create(&app.pool, owner.id, "Mine").await.unwrap();

    let response = client()
        .post(app.url(&format!("/messages/{}/delete", message.id)))
        .header(COOKIE, app.session_cookie(intruder.id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(location(&response), "/");
    assert!(Message::find(&app.pool, message.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_message_anonymously_is_refused_with_flash() {
    let app = spawn_app().await;
    let owner = signup(&app.pool, "owner", "owner@test.com", "testuser").await;
    let message = Message::create(&app.pool, owner.id, "Mine").await.unwrap();

    let response = browser()
        .post(app.url(&format!("/messages/{}/delete", message.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("Access unauthorized"));
    assert!(Message::find(&app.pool, message.id).await.unwrap().is_some());
}
