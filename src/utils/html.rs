use axum::{http::StatusCode, response::Html};

use crate::{models::user::User, utils::session::Flash};

/// Escapes user-controlled text for an HTML text node or quoted attribute.
///
/// Markup is shown, never interpreted: `<b>` comes out as `&lt;b&gt;`.
/// Attributes are always quoted, so spaces stay literal.
pub fn escape(input: &str) -> String {
    ammonia::clean_text(input).replace("&#32;", " ")
}

/// Wraps a page body in the shared document shell: navbar, pending flash
/// messages, then the body itself.
pub fn layout(title: &str, viewer: Option<&User>, flashes: &[Flash], body: &str) -> Html<String> {
    let nav = match viewer {
        Some(user) => format!(
            r#"<a href="/">Warbler</a>
<a href="/users">Users</a>
<a href="/users/{id}">Profile</a>
<a href="/messages/new">New Message</a>
<a href="/logout">Log out</a>"#,
            id = user.id,
        ),
        None => r#"<a href="/">Warbler</a>
<a href="/users">Users</a>
<a href="/signup">Sign up</a>
<a href="/login">Log in</a>"#
            .to_string(),
    };

    let alerts: String = flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                escape(&flash.category),
                escape(&flash.message)
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/stylesheets/style.css">
</head>
<body>
<nav>{nav}</nav>
<main>
{alerts}{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

/// Standalone page used by `AppError` responses.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{code} {reason}</title></head>
<body>
<h1>{code} {reason}</h1>
<p class="error-message">{message}</p>
<p><a href="/">Back to Warbler</a></p>
</body>
</html>"#,
        code = status.as_u16(),
        message = escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_shows_markup_as_text() {
        assert_eq!(escape("Big Test"), "Big Test");
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape("use Vec<T> or <b>bold</b>"), "use Vec&lt;T&gt; or &lt;b&gt;bold&lt;&#47;b&gt;");
    }

    #[test]
    fn escape_neutralises_attribute_breakers() {
        let escaped = escape(r#"x" onerror="y"#);
        assert!(!escaped.contains('"'));
        assert_eq!(escape("Franky"), "Franky");
    }

    #[test]
    fn layout_renders_flashes() {
        let flashes = vec![Flash::new("danger", "Access unauthorized.")];
        let Html(page) = layout("Home", None, &flashes, "<p>body</p>");
        assert!(page.contains(r#"<div class="alert alert-danger">Access unauthorized.</div>"#));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains(r#"href="/login""#));
    }
}
