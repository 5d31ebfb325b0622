use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use plaxt_config::CredentialStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use super::AppState;

pub const HEALTHCHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
}

/// Ping the store, bounded by [`HEALTHCHECK_TIMEOUT`]. Shared with the CLI subcommand.
pub async fn check_storage(store: &dyn CredentialStore) -> Result<(), String> {
    match tokio::time::timeout(HEALTHCHECK_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", HEALTHCHECK_TIMEOUT.as_secs())),
    }
}

pub async fn healthcheck(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match check_storage(state.store.as_ref()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK",
                errors: BTreeMap::new(),
            }),
        ),
        Err(message) => {
            warn!(backend = state.store.backend_name(), error = %message, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "Service Unavailable",
                    errors: BTreeMap::from([("storage", message)]),
                }),
            )
        }
    }
}
