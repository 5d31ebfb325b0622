use chrono::Duration;
use plaxt_config::CredentialStore;
use plaxt_models::{Credential, MediaEvent};
use plaxt_sources::TraktApi;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::dispatch::ScrobbleDispatcher;
use crate::error::ScrobbleError;
use crate::progress;
use crate::resolver::MediaResolver;
use crate::tokens::TokenLifecycleManager;

/// Token refresh, catalog lookup, progress and dispatch for one event.
pub struct ScrobblePipeline {
    tokens: TokenLifecycleManager,
    resolver: MediaResolver,
    dispatcher: ScrobbleDispatcher,
}

impl ScrobblePipeline {
    pub fn new(store: Arc<dyn CredentialStore>, trakt: Arc<dyn TraktApi>, max_age: Duration) -> Self {
        Self {
            tokens: TokenLifecycleManager::new(store, trakt.clone(), max_age),
            resolver: MediaResolver::new(trakt.clone()),
            dispatcher: ScrobbleDispatcher::new(trakt),
        }
    }

    pub fn tokens(&self) -> &TokenLifecycleManager {
        &self.tokens
    }

    /// Make sure the credential's tokens are usable before any catalog call.
    pub async fn prepare(&self, credential: Credential, origin: &str) -> Result<Credential, ScrobbleError> {
        self.tokens.ensure_fresh(credential, origin).await
    }

    /// Resolve, calculate and dispatch with an already fresh credential.
    pub async fn run(&self, credential: &Credential, event: &MediaEvent) -> Result<Option<String>, ScrobbleError> {
        if progress::verb_for(&event.kind).is_none() {
            debug!(event = %event.kind, "Event has no scrobble counterpart, ignoring");
            return Ok(None);
        }

        let matched = self.resolver.resolve(event).await?;
        let action = progress::action(
            &event.kind,
            event.view_offset_ms,
            event.duration_ms,
            matched.runtime_ms(),
        );
        debug!(item = %matched.describe(), ?action, "Resolved event");

        self.dispatcher
            .dispatch(&matched, &action, &credential.access_token)
            .await
    }

    pub async fn handle(
        &self,
        credential: Credential,
        event: &MediaEvent,
        origin: &str,
    ) -> Result<Option<String>, ScrobbleError> {
        let credential = self.prepare(credential, origin).await?;
        self.run(&credential, event).await
    }

    /// Run the pipeline detached from the caller.
    ///
    /// Failures and panics of the run are logged by a supervising task and
    /// never reach the caller.
    pub fn spawn(self: &Arc<Self>, credential: Credential, event: MediaEvent) -> JoinHandle<()> {
        let span = info_span!(
            "scrobble",
            credential_id = %credential.id,
            event = %event.kind,
            title = %event.title
        );
        let pipeline = Arc::clone(self);
        let worker = tokio::spawn(
            async move { pipeline.run(&credential, &event).await }.instrument(span.clone()),
        );

        tokio::spawn(
            async move {
                match worker.await {
                    Ok(Ok(Some(_))) => {}
                    Ok(Ok(None)) => debug!("Nothing scrobbled"),
                    Ok(Err(ScrobbleError::UnsupportedMedia(kind))) => {
                        info!(section = %kind, "Unrecognized media type, not scrobbling")
                    }
                    Ok(Err(e @ ScrobbleError::NotFound(_))) => warn!(error = %e, "Scrobble skipped"),
                    Ok(Err(e)) => error!(error = %e, "Scrobble failed"),
                    Err(join_err) if join_err.is_panic() => error!("Scrobble task panicked"),
                    Err(join_err) => warn!(error = %join_err, "Scrobble task cancelled"),
                }
            }
            .instrument(span),
        )
    }
}
