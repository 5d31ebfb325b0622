use plaxt_models::TraktIds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowSummary {
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: TraktIds,
}

/// Episode object. `runtime` (minutes) is only filled by `extended=full` lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub season: u32,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ids: TraktIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EpisodeSearchResult {
    pub show: ShowSummary,
    pub episode: Episode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MovieSearchResult {
    pub movie: Movie,
}

/// Body of `POST /scrobble/{verb}`: progress plus exactly one of episode or movie.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScrobbleBody {
    pub progress: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<Episode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<Movie>,
}

impl ScrobbleBody {
    pub fn episode(progress: u32, episode: Episode) -> Self {
        Self {
            progress,
            episode: Some(episode),
            movie: None,
        }
    }

    pub fn movie(progress: u32, movie: Movie) -> Self {
        Self {
            progress,
            episode: None,
            movie: Some(movie),
        }
    }
}
