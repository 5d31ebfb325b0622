use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use plaxt_core::ScrobbleError;
use serde::Deserialize;
use tracing::{error, info};

use super::hosts::SelfRoot;
use super::pages::{render, AuthorizePage};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    username: Option<String>,
    code: Option<String>,
}

/// OAuth redirect target: trade the code for tokens and hand out the webhook url.
pub async fn authorize(
    State(state): State<AppState>,
    SelfRoot(origin): SelfRoot,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    let (Some(username), Some(code)) = (query.username, query.code) else {
        return (StatusCode::BAD_REQUEST, "username and code are required").into_response();
    };
    info!("Handling auth request for {}", username.to_lowercase());

    let credential = match state.pipeline.tokens().authorize(&origin, &username, &code).await {
        Ok(credential) => credential,
        Err(ScrobbleError::Store(e)) => {
            error!(error = %e, "Error saving user");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to write user credentials").into_response();
        }
        Err(e) => {
            error!(error = %e, "Authorization code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let url = format!("{}/api?id={}", origin, credential.id);
    info!(credential_id = %credential.id, "Authorized as {}", credential.id);

    Html(render(&AuthorizePage {
        self_root: &origin,
        client_id: &state.client_id,
        authorized: true,
        url: &url,
    }))
    .into_response()
}
