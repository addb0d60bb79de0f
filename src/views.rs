// src/views.rs
//
// Page bodies. Each function returns the inner HTML of a page; handlers wrap
// it with `utils::html::layout`.

use std::collections::HashSet;

use crate::{
    models::{
        message::{Message, MessageWithAuthor},
        user::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, ProfileForm, SignupForm, User, UserCounts},
    },
    utils::html::escape,
};

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}

fn like_button(message_id: i64, liked: bool) -> String {
    let label = if liked { "Unlike" } else { "Like" };
    format!(
        r#"<form method="POST" action="/users/add_like/{message_id}" class="like-form"><button class="{cls}">{label}</button></form>"#,
        cls = if liked { "liked" } else { "not-liked" },
    )
}

fn message_item(message: &MessageWithAuthor, like: Option<bool>) -> String {
    format!(
        r#"<li class="message">
<img src="{img}" alt="" class="avatar">
<a href="/users/{uid}">@{username}</a>
<span class="timestamp">{ts}</span>
<a href="/messages/{id}"><p>{text}</p></a>
{like}
</li>"#,
        img = escape(&message.image_url),
        uid = message.user_id,
        username = escape(&message.username),
        ts = message.timestamp.format("%d %B %Y"),
        id = message.id,
        text = escape(&message.text),
        like = like.map(|l| like_button(message.id, l)).unwrap_or_default(),
    )
}

fn own_message_item(owner: &User, message: &Message, like: Option<bool>) -> String {
    message_item(
        &MessageWithAuthor {
            id: message.id,
            text: message.text.clone(),
            timestamp: message.timestamp,
            user_id: owner.id,
            username: owner.username.clone(),
            image_url: owner.image_url.clone(),
        },
        like,
    )
}

fn user_card(user: &User) -> String {
    format!(
        r#"<li class="user-card">
<img src="{img}" alt="" class="avatar">
<a href="/users/{id}">@{username}</a>
<p>{bio}</p>
</li>"#,
        img = escape(&user.image_url),
        id = user.id,
        username = escape(&user.username),
        bio = user.bio.as_deref().map(escape).unwrap_or_default(),
    )
}

/// Follow/unfollow controls as seen by `viewer`.
fn follow_button(viewer: Option<&User>, target: &User, following: &HashSet<i64>) -> String {
    match viewer {
        Some(v) if v.id == target.id => {
            r#"<a href="/users/profile" class="btn">Edit Profile</a>
<form method="POST" action="/users/delete"><button class="btn-danger">Delete Profile</button></form>"#
                .to_string()
        }
        Some(_) if following.contains(&target.id) => format!(
            r#"<form method="POST" action="/users/stop-following/{}"><button>Unfollow</button></form>"#,
            target.id
        ),
        Some(_) => format!(
            r#"<form method="POST" action="/users/follow/{}"><button>Follow</button></form>"#,
            target.id
        ),
        None => String::new(),
    }
}

/// Profile header shared by the profile, following, followers and likes pages.
pub fn profile_header(
    user: &User,
    counts: &UserCounts,
    viewer: Option<&User>,
    following: &HashSet<i64>,
) -> String {
    format!(
        r#"<section class="profile-header" style="background-image: url('{header}')">
<img src="{img}" alt="Image for {username}">
<h2>@{username}</h2>
<p class="bio">{bio}</p>
<p class="location">{location}</p>
<ul class="counts">
<li><a href="/users/{id}">Messages {messages}</a></li>
<li><a href="/users/{id}/following">Following {n_following}</a></li>
<li><a href="/users/{id}/followers">Followers {n_followers}</a></li>
<li><a href="/users/{id}/likes">Likes {likes}</a></li>
</ul>
{button}
</section>"#,
        header = escape(&user.header_image_url),
        img = escape(&user.image_url),
        username = escape(&user.username),
        bio = user.bio.as_deref().map(escape).unwrap_or_default(),
        location = opt(&user.location),
        id = user.id,
        messages = counts.messages,
        n_following = counts.following,
        n_followers = counts.followers,
        likes = counts.likes,
        button = follow_button(viewer, user, following),
    )
}

pub fn home_anon() -> String {
    r#"<div class="home-hero">
<h1>What's Happening?</h1>
<h4>New to Warbler?</h4>
<a href="/signup" class="btn">Sign up now</a>
</div>"#
        .to_string()
}

pub fn home(
    user: &User,
    counts: &UserCounts,
    messages: &[MessageWithAuthor],
    liked: &HashSet<i64>,
) -> String {
    let items: String = messages
        .iter()
        .map(|m| message_item(m, Some(liked.contains(&m.id))))
        .collect();

    format!(
        r#"<aside class="user-aside">
<img src="{img}" alt="">
<a href="/users/{id}">@{username}</a>
<ul class="counts">
<li>Messages {messages_count}</li>
<li>Following {following}</li>
<li>Followers {followers}</li>
</ul>
</aside>
<ul class="messages">{items}</ul>"#,
        img = escape(&user.image_url),
        id = user.id,
        username = escape(&user.username),
        messages_count = counts.messages,
        following = counts.following,
        followers = counts.followers,
    )
}

pub fn signup_form(form: &SignupForm, errors: &[String]) -> String {
    format!(
        r#"<h2>Join Warbler today.</h2>
{errors}
<form method="POST" action="/signup" id="user_form">
<input name="username" placeholder="Username" value="{username}">
<input name="email" type="email" placeholder="E-mail" value="{email}">
<input name="password" type="password" placeholder="Password">
<input name="image_url" placeholder="(Optional) Image URL" value="{image_url}">
<button>Sign me up!</button>
</form>"#,
        errors = error_list(errors),
        username = escape(&form.username),
        email = escape(&form.email),
        image_url = opt(&form.image_url),
    )
}

pub fn login_form(username: &str, errors: &[String]) -> String {
    format!(
        r#"<h2>Welcome back.</h2>
{errors}
<form method="POST" action="/login" id="user_form">
<input name="username" placeholder="Username" value="{username}">
<input name="password" type="password" placeholder="Password">
<button>Log in</button>
</form>"#,
        errors = error_list(errors),
        username = escape(username),
    )
}

pub fn user_index(users: &[User], query: Option<&str>) -> String {
    if users.is_empty() {
        return match query {
            Some(q) if !q.trim().is_empty() => {
                format!(r#"<h3>Sorry, no users found matching "{}"</h3>"#, escape(q))
            }
            _ => "<h3>Sorry, no users found</h3>".to_string(),
        };
    }
    let cards: String = users.iter().map(user_card).collect();
    format!(r#"<ul class="user-index">{cards}</ul>"#)
}

pub fn profile(
    header: String,
    user: &User,
    messages: &[Message],
    liked: Option<&HashSet<i64>>,
) -> String {
    let items: String = messages
        .iter()
        .map(|m| own_message_item(user, m, liked.map(|l| l.contains(&m.id))))
        .collect();
    format!(r#"{header}<ul class="messages">{items}</ul>"#)
}

/// Following/followers list.
pub fn user_list(header: String, heading: &str, users: &[User]) -> String {
    let cards: String = users.iter().map(user_card).collect();
    format!(
        r#"{header}<h3>{heading}</h3><ul class="user-index">{cards}</ul>"#,
        heading = escape(heading),
    )
}

/// Messages a user liked. `viewer_liked` holds the viewer's own likes.
pub fn likes(
    header: String,
    liked: &[MessageWithAuthor],
    viewer_liked: &HashSet<i64>,
) -> String {
    let items: String = liked
        .iter()
        .map(|m| message_item(m, Some(viewer_liked.contains(&m.id))))
        .collect();
    format!(r#"{header}<h3>Liked messages</h3><ul class="messages">{items}</ul>"#)
}

pub fn message_form(text: &str, errors: &[String]) -> String {
    format!(
        r#"<h2>Add a message</h2>
{errors}
<form method="POST" action="/messages/new">
<textarea name="text" placeholder="What's happening?" maxlength="140">{text}</textarea>
<button>Add my message!</button>
</form>"#,
        errors = error_list(errors),
        text = escape(text),
    )
}

pub fn message_show(message: &MessageWithAuthor, can_delete: bool) -> String {
    let delete = if can_delete {
        format!(
            r#"<form method="POST" action="/messages/{}/delete"><button class="btn-danger">Delete</button></form>"#,
            message.id
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class="message-area">
<img src="{img}" alt="" class="avatar">
<a href="/users/{uid}">@{username}</a>
<span class="timestamp">{ts}</span>
<p class="single-message">{text}</p>
{delete}
</div>"#,
        img = escape(&message.image_url),
        uid = message.user_id,
        username = escape(&message.username),
        ts = message.timestamp.format("%d %B %Y"),
        text = escape(&message.text),
    )
}

pub fn profile_form(form: &ProfileForm, errors: &[String]) -> String {
    let image_url = form.image_url.clone().filter(|v| v != DEFAULT_IMAGE_URL);
    let header_image_url = form
        .header_image_url
        .clone()
        .filter(|v| v != DEFAULT_HEADER_IMAGE_URL);
    format!(
        r#"<h2>Edit Your Profile.</h2>
{errors}
<form method="POST" action="/users/profile" id="user_form">
<input name="username" placeholder="Username" value="{username}">
<input name="email" type="email" placeholder="E-mail" value="{email}">
<input name="image_url" placeholder="(Optional) Image URL" value="{image_url}">
<input name="header_image_url" placeholder="(Optional) Header Image URL" value="{header_image_url}">
<textarea name="bio" placeholder="(Optional) Tell us about yourself">{bio}</textarea>
<input name="location" placeholder="(Optional) Location" value="{location}">
<p>To confirm changes, enter your password:</p>
<input name="password" type="password" placeholder="Password">
<button>Edit this user!</button>
</form>"#,
        errors = error_list(errors),
        username = escape(&form.username),
        email = escape(&form.email),
        image_url = opt(&image_url),
        header_image_url = opt(&header_image_url),
        bio = opt(&form.bio),
        location = opt(&form.location),
    )
}

pub fn not_found() -> String {
    r#"<h1 class="not-found">404</h1>
<p>Sorry, we couldn't find that page.</p>
<a href="/">Go home</a>"#
        .to_string()
}
