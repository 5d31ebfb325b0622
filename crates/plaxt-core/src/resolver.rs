use plaxt_models::{CatalogMatch, EpisodeMatch, MediaEvent, MovieMatch, SectionType};
use plaxt_sources::TraktApi;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ScrobbleError;

/// Finds the Trakt catalog entry a Plex event refers to.
pub struct MediaResolver {
    trakt: Arc<dyn TraktApi>,
}

impl MediaResolver {
    pub fn new(trakt: Arc<dyn TraktApi>) -> Self {
        Self { trakt }
    }

    pub async fn resolve(&self, event: &MediaEvent) -> Result<CatalogMatch, ScrobbleError> {
        match &event.section_type {
            SectionType::Show => self.resolve_episode(event).await.map(CatalogMatch::ShowEpisode),
            SectionType::Movie => self.resolve_movie(event).await.map(CatalogMatch::Movie),
            SectionType::Other(kind) => Err(ScrobbleError::UnsupportedMedia(kind.clone())),
        }
    }

    /// Episode lookup by the external id Plex attaches to the episode,
    /// then a second call for the extended metadata (runtime).
    async fn resolve_episode(&self, event: &MediaEvent) -> Result<EpisodeMatch, ScrobbleError> {
        let external = event.primary_external_id().ok_or_else(|| {
            ScrobbleError::NotFound(format!("no external id on episode '{}'", event.title))
        })?;

        debug!("Finding episode with new Plex TV agent");
        let found = self
            .trakt
            .search_episode(&external.service, &external.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ScrobbleError::NotFound(format!("No show found on trakt for {}", external)))?;

        let show_id = found.show.ids.trakt.ok_or_else(|| {
            ScrobbleError::NotFound(format!("show '{}' has no trakt id", found.show.title))
        })?;

        info!(
            "Tracking {} - S{:02}E{:02} using {}",
            found.show.title, found.episode.season, found.episode.number, external.service
        );

        let details = self
            .trakt
            .episode_details(show_id, found.episode.season, found.episode.number)
            .await?;

        Ok(EpisodeMatch {
            show_title: found.show.title,
            trakt_show_id: show_id,
            season: details.season,
            episode_number: details.number,
            episode_title: details.title,
            episode_ids: details.ids,
            runtime_minutes: details.runtime.unwrap_or(0),
        })
    }

    /// Title search; the first result released in the event's year wins.
    async fn resolve_movie(&self, event: &MediaEvent) -> Result<MovieMatch, ScrobbleError> {
        info!(title = %event.title, year = ?event.year, "Finding movie");

        let results = self.trakt.search_movie(&event.title).await?;
        let movie = results
            .into_iter()
            .map(|r| r.movie)
            .find(|m| m.year == event.year)
            .ok_or_else(|| {
                ScrobbleError::NotFound(format!(
                    "Could not find movie '{}' ({:?})",
                    event.title, event.year
                ))
            })?;

        Ok(MovieMatch {
            title: movie.title,
            year: movie.year,
            trakt_movie_id: movie.ids.trakt,
            ids: movie.ids,
        })
    }
}
