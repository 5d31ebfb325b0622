use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use tracing::warn;

use super::AppState;

/// Host the client used to reach us, honoring reverse proxy headers.
fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(|a| a.to_string()))
}

fn request_scheme(headers: &HeaderMap) -> &'static str {
    match headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()) {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    }
}

/// Public origin of this service as seen by the caller, e.g. `https://plaxt.example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfRoot(pub String);

impl SelfRoot {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let host = request_host(headers, uri).unwrap_or_else(|| "localhost".to_string());
        SelfRoot(format!("{}://{}", request_scheme(headers), host))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SelfRoot
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SelfRoot::from_parts(&parts.headers, &parts.uri))
    }
}

/// Reject requests addressed to a host outside `server.allowed_hostnames`.
/// An empty list allows everything; the health check is never filtered.
pub async fn allowed_hosts(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.allowed_hostnames.is_empty() || request.uri().path() == "/healthcheck" {
        return next.run(request).await;
    }

    let host = request_host(request.headers(), request.uri())
        .unwrap_or_default()
        .to_lowercase();
    if state.allowed_hostnames.iter().any(|allowed| *allowed == host) {
        return next.run(request).await;
    }

    warn!(host = %host, path = %request.uri().path(), "Rejected request for unknown host");
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "text/plain")],
        "Oh no!",
    )
        .into_response()
}
