//! In-process stand-in for the Trakt API.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use plaxt_models::{Credential, EventKind, ExternalId, MediaEvent, ScrobbleVerb, SectionType, TraktIds};
use plaxt_sources::trakt::{Episode, EpisodeSearchResult, Movie, MovieSearchResult, ScrobbleBody, ShowSummary};
use plaxt_sources::{TokenGrant, TokenSet, TraktApi, TraktError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum TokenBehavior {
    Grant,
    Reject,
    Malformed,
}

pub struct FakeTrakt {
    pub token_behavior: TokenBehavior,
    pub episode_results: Vec<EpisodeSearchResult>,
    pub episode_runtime: Option<u32>,
    pub movie_results: Vec<MovieSearchResult>,
    pub catalog_status: Option<u16>,
    pub exchanges: AtomicUsize,
    pub grants: Mutex<Vec<(TokenGrant, String)>>,
    pub catalog_calls: Mutex<Vec<String>>,
    pub scrobbles: Mutex<Vec<(ScrobbleVerb, ScrobbleBody, String)>>,
}

impl Default for FakeTrakt {
    fn default() -> Self {
        Self {
            token_behavior: TokenBehavior::Grant,
            episode_results: Vec::new(),
            episode_runtime: None,
            movie_results: Vec::new(),
            catalog_status: None,
            exchanges: AtomicUsize::new(0),
            grants: Mutex::new(Vec::new()),
            catalog_calls: Mutex::new(Vec::new()),
            scrobbles: Mutex::new(Vec::new()),
        }
    }
}

impl FakeTrakt {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> Vec<String> {
        self.catalog_calls.lock().unwrap().clone()
    }

    pub fn scrobbles(&self) -> Vec<(ScrobbleVerb, ScrobbleBody, String)> {
        self.scrobbles.lock().unwrap().clone()
    }

    fn check_catalog(&self, call: String) -> Result<(), TraktError> {
        self.catalog_calls.lock().unwrap().push(call.clone());
        match self.catalog_status {
            Some(status) => Err(TraktError::Status {
                url: call,
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TraktApi for FakeTrakt {
    async fn exchange_token(&self, grant: &TokenGrant, redirect_uri: &str) -> Result<TokenSet, TraktError> {
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        self.grants
            .lock()
            .unwrap()
            .push((grant.clone(), redirect_uri.to_string()));
        // Give concurrent callers a chance to pile up behind the refresh lock
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let url = "fake://oauth/token".to_string();
        match self.token_behavior {
            TokenBehavior::Grant => Ok(TokenSet {
                access_token: format!("access-{}", n),
                refresh_token: format!("refresh-{}", n),
                expires_in: Some(7_776_000),
            }),
            TokenBehavior::Reject => Err(TraktError::Status {
                url,
                status: 401,
                body: "{\"error\":\"invalid_grant\"}".to_string(),
            }),
            TokenBehavior::Malformed => Err(TraktError::InvalidResponse {
                url,
                reason: "missing field `refresh_token`".to_string(),
            }),
        }
    }

    async fn search_episode(&self, service: &str, id: &str) -> Result<Vec<EpisodeSearchResult>, TraktError> {
        self.check_catalog(format!("search_episode {} {}", service, id))?;
        Ok(self.episode_results.clone())
    }

    async fn episode_details(&self, show_id: u64, season: u32, number: u32) -> Result<Episode, TraktError> {
        self.check_catalog(format!("episode_details {} {} {}", show_id, season, number))?;
        Ok(Episode {
            season,
            number,
            title: Some(format!("Episode {}", number)),
            ids: TraktIds {
                trakt: Some(show_id * 1000 + u64::from(number)),
                ..Default::default()
            },
            runtime: self.episode_runtime,
        })
    }

    async fn search_movie(&self, title: &str) -> Result<Vec<MovieSearchResult>, TraktError> {
        self.check_catalog(format!("search_movie {}", title))?;
        Ok(self.movie_results.clone())
    }

    async fn scrobble(&self, verb: ScrobbleVerb, body: &ScrobbleBody, access_token: &str) -> Result<String, TraktError> {
        self.scrobbles
            .lock()
            .unwrap()
            .push((verb, body.clone(), access_token.to_string()));
        Ok(format!("{{\"action\":\"{}\",\"progress\":{}}}", verb, body.progress))
    }
}

pub fn episode_result(show: &str, show_id: u64, season: u32, number: u32) -> EpisodeSearchResult {
    EpisodeSearchResult {
        show: ShowSummary {
            title: show.to_string(),
            year: Some(2017),
            ids: TraktIds {
                trakt: Some(show_id),
                ..Default::default()
            },
        },
        episode: Episode {
            season,
            number,
            title: None,
            ids: TraktIds::default(),
            runtime: None,
        },
    }
}

pub fn movie_result(title: &str, year: u32, trakt_id: u64) -> MovieSearchResult {
    MovieSearchResult {
        movie: Movie {
            title: title.to_string(),
            year: Some(year),
            ids: TraktIds {
                trakt: Some(trakt_id),
                ..Default::default()
            },
        },
    }
}

pub fn show_event(kind: EventKind, view_offset_ms: u64, duration_ms: u64) -> MediaEvent {
    MediaEvent {
        kind,
        section_type: SectionType::Show,
        external_ids: vec![ExternalId {
            service: "tvdb".to_string(),
            id: "5937406".to_string(),
        }],
        title: "Secrets".to_string(),
        year: Some(2017),
        duration_ms,
        view_offset_ms,
        account: "HalKeye".to_string(),
    }
}

pub fn movie_event(kind: EventKind, title: &str, year: u32) -> MediaEvent {
    MediaEvent {
        kind,
        section_type: SectionType::Movie,
        external_ids: Vec::new(),
        title: title.to_string(),
        year: Some(year),
        duration_ms: 0,
        view_offset_ms: 0,
        account: "halkeye".to_string(),
    }
}

pub fn credential_aged(days: i64) -> Credential {
    Credential::with_id(
        "cred1".to_string(),
        "halkeye",
        "access-0".to_string(),
        "refresh-0".to_string(),
        Utc::now() - Duration::days(days),
    )
}
