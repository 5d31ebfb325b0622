use plaxt_models::{CatalogMatch, ScrobbleAction};
use plaxt_sources::trakt::{Episode, Movie, ScrobbleBody};
use plaxt_sources::TraktApi;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ScrobbleError;

/// Sends scrobbles to Trakt. One attempt per action, no retries.
pub struct ScrobbleDispatcher {
    trakt: Arc<dyn TraktApi>,
}

impl ScrobbleDispatcher {
    pub fn new(trakt: Arc<dyn TraktApi>) -> Self {
        Self { trakt }
    }

    /// Request body for a matched item. Progress above 100 is sent as 100.
    pub fn body(matched: &CatalogMatch, progress: u32) -> ScrobbleBody {
        let progress = progress.min(100);
        match matched {
            CatalogMatch::ShowEpisode(e) => ScrobbleBody::episode(
                progress,
                Episode {
                    season: e.season,
                    number: e.episode_number,
                    title: e.episode_title.clone(),
                    ids: e.episode_ids.clone(),
                    runtime: None,
                },
            ),
            CatalogMatch::Movie(m) => ScrobbleBody::movie(
                progress,
                Movie {
                    title: m.title.clone(),
                    year: m.year,
                    ids: m.ids.clone(),
                },
            ),
        }
    }

    /// Returns the raw response body, or `None` when the action has no verb
    /// and nothing was sent.
    pub async fn dispatch(
        &self,
        matched: &CatalogMatch,
        action: &ScrobbleAction,
        access_token: &str,
    ) -> Result<Option<String>, ScrobbleError> {
        let Some(verb) = action.verb else {
            debug!(item = %matched.describe(), "No scrobble verb for event, nothing sent");
            return Ok(None);
        };

        let body = Self::body(matched, action.progress);
        let response = self.trakt.scrobble(verb, &body, access_token).await?;
        info!(
            item = %matched.describe(),
            verb = %verb,
            progress = body.progress,
            "Scrobbled: {}",
            response
        );
        Ok(Some(response))
    }
}
