use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plaxt_config::StoreError;
use plaxt_core::ScrobbleError;
use plaxt_sources::parse_webhook;
use std::collections::HashMap;
use tracing::{debug, error, info, warn, Level};

use super::hosts::SelfRoot;
use super::AppState;

/// Multipart field Plex puts the JSON event in.
const PAYLOAD_FIELD: &str = "payload";

fn success() -> Response {
    Json("success").into_response()
}

async fn read_payload(request: Request) -> Result<Option<Bytes>, String> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| e.body_text())?;
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() == Some(PAYLOAD_FIELD) {
            return field.bytes().await.map(Some).map_err(|e| e.body_text());
        }
    }
    Ok(None)
}

/// `POST /api?id=...`: acknowledge quickly, scrobble in the background.
///
/// Validation (credential, payload, account, token freshness) happens
/// before the response; catalog lookups and the scrobble itself do not.
pub async fn handle_webhook(
    State(state): State<AppState>,
    SelfRoot(origin): SelfRoot,
    Query(args): Query<HashMap<String, String>>,
    request: Request,
) -> Response {
    let Some(id) = args.get("id").cloned() else {
        return (StatusCode::BAD_REQUEST, "Missing id").into_response();
    };
    if tracing::enabled!(Level::DEBUG) {
        debug!(args = ?args, "Webhook call for {}", id);
    } else {
        info!(request = %request.uri().path(), "Webhook call for {}", id);
    }

    let credential = match state.store.get(&id).await {
        Ok(Some(credential)) => credential,
        Ok(None) | Err(StoreError::InvalidId(_)) => {
            info!(credential_id = %id, "User not found.");
            return (StatusCode::NOT_FOUND, Json("user not found")).into_response();
        }
        Err(e) => {
            error!(credential_id = %id, error = %e, "Error getting user");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to find a valid user").into_response();
        }
    };

    let event = match read_payload(request).await {
        Ok(Some(bytes)) => match parse_webhook(&bytes) {
            Ok(event) => event,
            Err(e) => {
                let e = ScrobbleError::from(e);
                warn!(credential_id = %id, error = %e, "Failed to parse webhook payload");
                return (StatusCode::BAD_REQUEST, "Failed to process webhook").into_response();
            }
        },
        Ok(None) => {
            warn!(credential_id = %id, "Webhook request has no payload field");
            return (StatusCode::BAD_REQUEST, "Failed to process webhook").into_response();
        }
        Err(reason) => {
            warn!(credential_id = %id, error = %reason, "Failed to read webhook body");
            return (StatusCode::BAD_REQUEST, "Failed to process webhook").into_response();
        }
    };

    if !credential.matches_account(&event.account) {
        info!(
            credential_id = %id,
            "Plex username {} does not equal {}, skipping",
            event.account.to_lowercase(),
            credential.username
        );
        return success();
    }

    let credential = match state.pipeline.prepare(credential, &origin).await {
        Ok(credential) => credential,
        Err(ScrobbleError::Unauthorized(reason)) => {
            warn!(credential_id = %id, error = %reason, "Refresh failed, user removed");
            return (StatusCode::UNAUTHORIZED, Json("fail")).into_response();
        }
        Err(e) => {
            error!(credential_id = %id, error = %e, "Could not refresh token, event dropped");
            return success();
        }
    };

    debug!(credential_id = %id, event = %event.kind, section = %event.section_type, "Dispatching scrobble");
    state.pipeline.spawn(credential, event);
    success()
}
