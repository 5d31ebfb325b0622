use axum::extract::State;
use axum::response::Html;
use plaxt_sources::trakt::{authorize_url, redirect_uri};

use super::hosts::SelfRoot;
use super::AppState;

/// Shown on the landing page in place of a real webhook url.
const PLACEHOLDER_URL: &str = "https://plaxt.example.com/api?id=generate-your-own-silly";

pub struct AuthorizePage<'a> {
    pub self_root: &'a str,
    pub client_id: &'a str,
    pub authorized: bool,
    pub url: &'a str,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Stands in for the username inside the Trakt link until the form is submitted.
const USERNAME_PLACEHOLDER: &str = "USERNAME";

/// Trakt consent link with a placeholder username.
///
/// The placeholder sits inside the already encoded `redirect_uri` parameter,
/// so the form substitutes the username encoded twice: once for the redirect
/// URI itself and once for its place in the link. Trakt then sees the same
/// redirect URI the code exchange sends later.
pub fn authorize_link(self_root: &str, client_id: &str) -> String {
    authorize_url(client_id, &redirect_uri(self_root, USERNAME_PLACEHOLDER))
}

pub fn render(page: &AuthorizePage<'_>) -> String {
    let body = if page.authorized {
        format!(
            r#"<p>Congrats! You're authorized. Copy this url into the Webhooks section of your Plex server settings:</p>
<pre id="webhook-url">{url}</pre>"#,
            url = escape_html(page.url)
        )
    } else {
        let link = authorize_link(page.self_root, page.client_id);
        format!(
            r#"<p>Enter your Plex username, then authorize Plaxt on Trakt.</p>
<form id="authorize" data-authorize-url="{link}" onsubmit="event.preventDefault(); window.location = this.dataset.authorizeUrl.replace('{placeholder}', encodeURIComponent(encodeURIComponent(this.username.value.toLowerCase())));">
  <input name="username" placeholder="Plex username" required>
  <button type="submit">Authorize</button>
</form>
<p>Your webhook url will look like:</p>
<pre>{url}</pre>"#,
            link = escape_html(&link),
            placeholder = USERNAME_PLACEHOLDER,
            url = escape_html(page.url)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Plaxt</title>
</head>
<body>
<h1>Plaxt</h1>
<p>Plex to Trakt scrobbling.</p>
{body}
</body>
</html>
"#
    )
}

pub async fn index(State(state): State<AppState>, SelfRoot(origin): SelfRoot) -> Html<String> {
    Html(render(&AuthorizePage {
        self_root: &origin,
        client_id: &state.client_id,
        authorized: false,
        url: PLACEHOLDER_URL,
    }))
}
