use serde::{Deserialize, Serialize};

/// Identifier set attached to every Trakt catalog object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraktIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u64>,
}

/// Episode resolved against the Trakt catalog, with extended metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeMatch {
    pub show_title: String,
    pub trakt_show_id: u64,
    pub season: u32,
    pub episode_number: u32,
    pub episode_title: Option<String>,
    pub episode_ids: TraktIds,
    pub runtime_minutes: u32,
}

impl EpisodeMatch {
    pub fn runtime_ms(&self) -> u64 {
        u64::from(self.runtime_minutes) * 60 * 1000
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMatch {
    pub title: String,
    pub year: Option<u32>,
    pub trakt_movie_id: Option<u64>,
    pub ids: TraktIds,
}

/// Result of resolving a Plex event against Trakt. Lives for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogMatch {
    ShowEpisode(EpisodeMatch),
    Movie(MovieMatch),
}

impl CatalogMatch {
    /// Catalog runtime used as a floor for the progress denominator.
    pub fn runtime_ms(&self) -> u64 {
        match self {
            CatalogMatch::ShowEpisode(episode) => episode.runtime_ms(),
            CatalogMatch::Movie(_) => 0,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CatalogMatch::ShowEpisode(e) => format!(
                "{} - S{:02}E{:02}",
                e.show_title, e.season, e.episode_number
            ),
            CatalogMatch::Movie(m) => match m.year {
                Some(year) => format!("{} ({})", m.title, year),
                None => m.title.clone(),
            },
        }
    }
}
