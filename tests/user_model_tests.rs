// tests/user_model_tests.rs

mod common;

use common::{signup, test_pool};
use sqlx::SqlitePool;
use warbler::{
    error::AppError,
    models::{
        follows::Follows,
        message::Message,
        user::{NewUser, ProfileUpdate, User},
    },
};

/// Two signed-up users, like every case here starts with.
async fn setup() -> (SqlitePool, User, User) {
    let pool = test_pool().await;
    let user1 = signup(&pool, "fake_user1", "fake_user1@test.com", "HASHED_PASSWORD1").await;
    let user2 = signup(&pool, "fake_user2", "fake_user2@test.com", "HASHED_PASSWORD2").await;
    (pool, user1, user2)
}

#[tokio::test]
async fn new_user_has_no_messages_and_no_followers() {
    let (pool, _, _) = setup().await;

    let user = NewUser::raw("testuser", "test@test.com", "HASHED_PASSWORD")
        .insert(&pool)
        .await
        .unwrap();

    assert!(user.messages(&pool, 100).await.unwrap().is_empty());
    assert!(user.followers(&pool).await.unwrap().is_empty());
    assert!(user.following(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn display_shows_id_username_and_email() {
    let (pool, _, _) = setup().await;

    let user = NewUser::raw("testuser", "test@test.com", "HASHED_PASSWORD")
        .insert(&pool)
        .await
        .unwrap();

    assert_eq!(
        user.to_string(),
        format!("<User #{}: testuser, test@test.com>", user.id)
    );
}

#[tokio::test]
async fn follow_shows_up_on_both_sides() {
    let (pool, user1, user2) = setup().await;

    Follows::follow(&pool, user1.id, user2.id).await.unwrap();

    let followers = user2.followers(&pool).await.unwrap();
    let following = user1.following(&pool).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, user1.id);
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, user2.id);

    // Not symmetric.
    assert!(user1.followers(&pool).await.unwrap().is_empty());
    assert!(user2.following(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn is_following_is_directional() {
    let (pool, user1, user2) = setup().await;

    Follows::follow(&pool, user1.id, user2.id).await.unwrap();

    assert!(user1.is_following(&pool, &user2).await.unwrap());
    assert!(!user2.is_following(&pool, &user1).await.unwrap());
}

#[tokio::test]
async fn is_followed_by_is_directional() {
    let (pool, user1, user2) = setup().await;

    Follows::follow(&pool, user1.id, user2.id).await.unwrap();

    assert!(!user1.is_followed_by(&pool, &user2).await.unwrap());
    assert!(user2.is_followed_by(&pool, &user1).await.unwrap());
}

#[tokio::test]
async fn following_twice_is_an_integrity_error() {
    let (pool, user1, user2) = setup().await;

    Follows::follow(&pool, user1.id, user2.id).await.unwrap();
    let err = Follows::follow(&pool, user1.id, user2.id).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(Follows::all(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unfollow_removes_the_pair() {
    let (pool, user1, user2) = setup().await;

    Follows::follow(&pool, user1.id, user2.id).await.unwrap();
    assert!(Follows::unfollow(&pool, user1.id, user2.id).await.unwrap());
    assert!(!Follows::unfollow(&pool, user1.id, user2.id).await.unwrap());

    assert!(!user1.is_following(&pool, &user2).await.unwrap());
}

#[tokio::test]
async fn signup_stores_a_hash_not_the_password() {
    let (pool, _, _) = setup().await;

    let staged = NewUser::signup("fake_user", "test@test.com", "HASHED_PASSWORD", None).unwrap();
    let id = staged.insert(&pool).await.unwrap().id;

    let user = User::find(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.username, "fake_user");
    assert_eq!(user.email, "test@test.com");
    assert_ne!(user.password, "HASHED_PASSWORD");
    assert_eq!(user.image_url, "/static/images/default-pic.svg");
}

#[tokio::test]
async fn duplicate_username_fails_on_commit_not_on_signup() {
    let (pool, _, _) = setup().await;

    // Staging succeeds; nothing has been checked yet.
    let staged = NewUser::signup("fake_user1", "test@test.com", "HASHED_PASSWORD", None)
        .expect("staging never touches the database");

    let err = staged.insert(&pool).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_email_is_an_integrity_error() {
    let (pool, _, _) = setup().await;

    let staged =
        NewUser::signup("someone_else", "fake_user1@test.com", "HASHED_PASSWORD", None).unwrap();

    assert!(staged.insert(&pool).await.unwrap_err().is_conflict());
}

#[tokio::test]
async fn authenticate_with_right_password() {
    let (pool, _, user2) = setup().await;

    let found = User::authenticate(&pool, "fake_user2", "HASHED_PASSWORD2")
        .await
        .unwrap()
        .expect("valid credentials");

    assert_eq!(found.id, user2.id);
}

#[tokio::test]
async fn authenticate_with_wrong_password() {
    let (pool, _, _) = setup().await;

    let found = User::authenticate(&pool, "fake_user2", "WRONG_PASSWORD")
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn authenticate_with_wrong_username() {
    let (pool, _, _) = setup().await;

    // Right password, but it belongs to fake_user2.
    let found = User::authenticate(&pool, "fake_user1", "HASHED_PASSWORD2")
        .await
        .unwrap();
    assert!(found.is_none());

    let found = User::authenticate(&pool, "nobody", "HASHED_PASSWORD2")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn authenticate_never_matches_unhashed_password() {
    let (pool, _, _) = setup().await;

    NewUser::raw("testuser", "test@test.com", "HASHED_PASSWORD")
        .insert(&pool)
        .await
        .unwrap();

    let found = User::authenticate(&pool, "testuser", "HASHED_PASSWORD")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn list_filters_by_username_substring() {
    let (pool, _, _) = setup().await;
    signup(&pool, "Patrick", "patrick@test.com", "testuser").await;

    let all = User::list(&pool, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let matched = User::list(&pool, Some("atri")).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].username, "Patrick");

    // Case matters.
    assert!(User::list(&pool, Some("patrick")).await.unwrap().is_empty());
    assert!(User::list(&pool, Some("FAKE")).await.unwrap().is_empty());

    let blank = User::list(&pool, Some("  ")).await.unwrap();
    assert_eq!(blank.len(), 3);

    // `_` is a literal, not a wildcard.
    let literal = User::list(&pool, Some("_user1")).await.unwrap();
    assert_eq!(literal.len(), 1);
    assert!(User::list(&pool, Some("%")).await.unwrap().is_empty());
}

#[tokio::test]
async fn counts_track_messages_and_follows() {
    let (pool, user1, user2) = setup().await;

    Message::create(&pool, user1.id, "one").await.unwrap();
    Message::create(&pool, user1.id, "two").await.unwrap();
    Follows::follow(&pool, user1.id, user2.id).await.unwrap();
    Follows::follow(&pool, user2.id, user1.id).await.unwrap();

    let counts = user1.counts(&pool).await.unwrap();
    assert_eq!(counts.messages, 2);
    assert_eq!(counts.following, 1);
    assert_eq!(counts.followers, 1);
    assert_eq!(counts.likes, 0);
}

#[tokio::test]
async fn update_profile_changes_fields_and_keeps_uniqueness() {
    let (pool, user1, _) = setup().await;

    let updated = user1
        .update_profile(
            &pool,
            ProfileUpdate {
                username: "renamed".to_string(),
                email: "renamed@test.com".to_string(),
                image_url: None,
                header_image_url: Some("https://example.com/header.jpg".to_string()),
                bio: Some("Hello there".to_string()),
                location: Some("  ".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, user1.id);
    assert_eq!(updated.username, "renamed");
    assert_eq!(updated.header_image_url, "https://example.com/header.jpg");
    assert_eq!(updated.bio.as_deref(), Some("Hello there"));
    assert_eq!(updated.location, None);

    let err = updated
        .update_profile(
            &pool,
            ProfileUpdate {
                username: "fake_user2".to_string(),
                email: "renamed@test.com".to_string(),
                image_url: None,
                header_image_url: None,
                bio: None,
                location: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn deleting_a_user_cascades() {
    let (pool, user1, user2) = setup().await;

    Message::create(&pool, user1.id, "bye").await.unwrap();
    Follows::follow(&pool, user2.id, user1.id).await.unwrap();

    assert!(User::delete(&pool, user1.id).await.unwrap());

    assert!(User::find(&pool, user1.id).await.unwrap().is_none());
    assert!(Message::for_user(&pool, user1.id).await.unwrap().is_empty());
    assert!(Follows::all(&pool).await.unwrap().is_empty());
    assert!(user2.following(&pool).await.unwrap().is_empty());
}
