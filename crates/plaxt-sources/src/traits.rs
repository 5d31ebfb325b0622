use async_trait::async_trait;
use plaxt_models::ScrobbleVerb;

use crate::error::TraktError;
use crate::trakt::{Episode, EpisodeSearchResult, MovieSearchResult, ScrobbleBody, TokenGrant, TokenSet};

/// The slice of the Trakt API the scrobbler needs.
///
/// `TraktClient` is the HTTP implementation; the engine only sees this trait.
#[async_trait]
pub trait TraktApi: Send + Sync {
    /// `POST /oauth/token`
    async fn exchange_token(&self, grant: &TokenGrant, redirect_uri: &str) -> Result<TokenSet, TraktError>;

    /// `GET /search/{service}/{id}?type=episode`
    async fn search_episode(&self, service: &str, id: &str) -> Result<Vec<EpisodeSearchResult>, TraktError>;

    /// `GET /shows/{show}/seasons/{season}/episodes/{episode}?extended=full`
    async fn episode_details(&self, show_id: u64, season: u32, number: u32) -> Result<Episode, TraktError>;

    /// `GET /search/movie?query={title}`
    async fn search_movie(&self, title: &str) -> Result<Vec<MovieSearchResult>, TraktError>;

    /// `POST /scrobble/{verb}`. Returns the raw response body.
    async fn scrobble(&self, verb: ScrobbleVerb, body: &ScrobbleBody, access_token: &str) -> Result<String, TraktError>;
}
