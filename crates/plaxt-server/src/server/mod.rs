//! HTTP surface: landing page, OAuth callback, Plex webhook and health check.

pub mod authorize;
pub mod health;
pub mod hosts;
pub mod pages;
pub mod webhook;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use plaxt_config::CredentialStore;
use plaxt_core::ScrobblePipeline;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Plex webhooks carry a thumbnail next to the JSON payload.
const MAX_WEBHOOK_BODY: usize = 6 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub pipeline: Arc<ScrobblePipeline>,
    pub client_id: String,
    /// Lower-cased `host[:port]` values; empty allows any host
    pub allowed_hostnames: Arc<Vec<String>>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/authorize", get(authorize::authorize))
        .route(
            "/api",
            post(webhook::handle_webhook).layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY)),
        )
        .route("/healthcheck", get(health::healthcheck))
        .layer(middleware::from_fn_with_state(state.clone(), hosts::allowed_hosts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, listen: &str) -> Result<()> {
    if !state.allowed_hostnames.is_empty() {
        info!("Allowed Hostnames: {:?}", state.allowed_hostnames);
    }
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    info!("Started on {}!", listen);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
