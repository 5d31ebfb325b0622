use async_trait::async_trait;
use plaxt_models::ScrobbleVerb;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::TraktError;
use crate::traits::TraktApi;
use crate::trakt::api::{Episode, EpisodeSearchResult, MovieSearchResult, ScrobbleBody};
use crate::trakt::auth::{TokenGrant, TokenSet};

const API_VERSION: &str = "2";

#[derive(Debug, Clone)]
pub struct TraktSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

/// HTTP client for the Trakt API. Cheap to clone.
#[derive(Clone)]
pub struct TraktClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl TraktClient {
    pub fn new(settings: TraktSettings) -> Result<Self, TraktError> {
        let client = Client::builder()
            .user_agent(concat!("plaxt/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(TraktError::Client)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id,
            client_secret: settings.client_secret,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers every Trakt call carries.
    fn with_api_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Content-Type", "application/json")
            .header("trakt-api-version", API_VERSION)
            .header("trakt-api-key", &self.client_id)
    }

    /// Send, require a 2xx status and return the body text.
    async fn send(&self, url: &str, request: RequestBuilder) -> Result<String, TraktError> {
        let response = request.send().await.map_err(|source| TraktError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| TraktError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(TraktError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TraktError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let body = self.send(&url, self.with_api_headers(self.client.get(&url))).await?;
        parse_json(&url, &body)
    }
}

fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, TraktError> {
    serde_json::from_str(body).map_err(|e| TraktError::InvalidResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl TraktApi for TraktClient {
    async fn exchange_token(&self, grant: &TokenGrant, redirect_uri: &str) -> Result<TokenSet, TraktError> {
        let url = self.url("/oauth/token");
        let payload = grant.payload(&self.client_id, &self.client_secret, redirect_uri);
        debug!(grant_type = grant.grant_type(), "POST {}", url);

        let request = self.with_api_headers(self.client.post(&url)).json(&payload);
        let body = self.send(&url, request).await?;

        let tokens: TokenSet = parse_json(&url, &body)?;
        tokens
            .validate()
            .map_err(|reason| TraktError::InvalidResponse { url, reason })
    }

    async fn search_episode(&self, service: &str, id: &str) -> Result<Vec<EpisodeSearchResult>, TraktError> {
        self.get_json(&format!(
            "/search/{}/{}?type=episode",
            urlencoding::encode(service),
            urlencoding::encode(id)
        ))
        .await
    }

    async fn episode_details(&self, show_id: u64, season: u32, number: u32) -> Result<Episode, TraktError> {
        self.get_json(&format!(
            "/shows/{}/seasons/{}/episodes/{}?extended=full",
            show_id, season, number
        ))
        .await
    }

    async fn search_movie(&self, title: &str) -> Result<Vec<MovieSearchResult>, TraktError> {
        self.get_json(&format!("/search/movie?query={}", urlencoding::encode(title)))
            .await
    }

    async fn scrobble(&self, verb: ScrobbleVerb, body: &ScrobbleBody, access_token: &str) -> Result<String, TraktError> {
        let url = self.url(&format!("/scrobble/{}", verb.as_str()));
        debug!(progress = body.progress, "POST {}", url);

        let request = self
            .with_api_headers(self.client.post(&url))
            .header("Authorization", format!("Bearer {}", access_token))
            .json(body);
        self.send(&url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trakt::api::Movie;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use plaxt_models::TraktIds;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> TraktClient {
        TraktClient::new(TraktSettings {
            base_url,
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn has_api_headers(headers: &HeaderMap) -> bool {
        headers.get("trakt-api-version").map(|v| v == "2").unwrap_or(false)
            && headers.get("trakt-api-key").map(|v| v == "client-id").unwrap_or(false)
    }

    #[tokio::test]
    async fn test_search_episode_sends_api_headers() {
        let router = Router::new().route(
            "/search/:service/:id",
            get(
                |headers: HeaderMap,
                 Path((service, id)): Path<(String, String)>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    if !has_api_headers(&headers) || query.get("type").map(String::as_str) != Some("episode") {
                        return (StatusCode::BAD_REQUEST, Json(json!([])));
                    }
                    (
                        StatusCode::OK,
                        Json(json!([{
                            "type": "episode",
                            "episode": {"season": 2, "number": 3, "title": "t", "ids": {"trakt": 9, "tvdb": id.parse::<u64>().unwrap()}},
                            "show": {"title": format!("show via {}", service), "year": 2019, "ids": {"trakt": 77}}
                        }])),
                    )
                },
            ),
        );
        let trakt = client(serve(router).await);

        let results = trakt.search_episode("tvdb", "8382421").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].show.title, "show via tvdb");
        assert_eq!(results[0].show.ids.trakt, Some(77));
        assert_eq!(results[0].episode.ids.tvdb, Some(8382421));
    }

    #[tokio::test]
    async fn test_episode_details_reads_runtime() {
        let router = Router::new().route(
            "/shows/:show/seasons/:season/episodes/:episode",
            get(
                |Path((show, season, episode)): Path<(u64, u32, u32)>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(query.get("extended").map(String::as_str), Some("full"));
                    Json(json!({
                        "season": season,
                        "number": episode,
                        "title": format!("show {}", show),
                        "ids": {"trakt": 1},
                        "runtime": 50
                    }))
                },
            ),
        );
        let trakt = client(serve(router).await);

        let episode = trakt.episode_details(77, 2, 3).await.unwrap();
        assert_eq!(episode.season, 2);
        assert_eq!(episode.number, 3);
        assert_eq!(episode.runtime, Some(50));
        assert_eq!(episode.title.as_deref(), Some("show 77"));
    }

    #[tokio::test]
    async fn test_search_movie_escapes_query() {
        let router = Router::new().route(
            "/search/movie",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                let title = query.get("query").cloned().unwrap_or_default();
                Json(json!([{"type": "movie", "movie": {"title": title, "year": 2004, "ids": {"trakt": 5}}}]))
            }),
        );
        let trakt = client(serve(router).await);

        let results = trakt.search_movie("Harry Potter & the Prisoner").await.unwrap();
        assert_eq!(results[0].movie.title, "Harry Potter & the Prisoner");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let router = Router::new().route(
            "/search/movie",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
        );
        let trakt = client(serve(router).await);

        let err = trakt.search_movie("Arrival").await.unwrap_err();
        match err {
            TraktError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_token_posts_grant() {
        let router = Router::new().route(
            "/oauth/token",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["grant_type"], "refresh_token");
                assert_eq!(body["refresh_token"], "old-refresh");
                assert_eq!(body["client_id"], "client-id");
                assert_eq!(body["client_secret"], "client-secret");
                assert_eq!(body["redirect_uri"], "http://h/authorize?username=u");
                Json(json!({
                    "access_token": "new-access",
                    "refresh_token": "new-refresh",
                    "expires_in": 7776000,
                    "token_type": "bearer"
                }))
            }),
        );
        let trakt = client(serve(router).await);

        let tokens = trakt
            .exchange_token(
                &TokenGrant::RefreshToken("old-refresh".to_string()),
                "http://h/authorize?username=u",
            )
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token, "new-refresh");
        assert_eq!(tokens.expires_in, Some(7776000));
    }

    #[tokio::test]
    async fn test_exchange_token_with_missing_fields_is_invalid_response() {
        let router = Router::new().route(
            "/oauth/token",
            post(|| async { Json(json!({"access_token": "only-access"})) }),
        );
        let trakt = client(serve(router).await);

        let err = trakt
            .exchange_token(&TokenGrant::RefreshToken("r".to_string()), "http://h")
            .await
            .unwrap_err();
        assert!(matches!(err, TraktError::InvalidResponse { .. }));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_exchange_token_rejection() {
        let router = Router::new().route(
            "/oauth/token",
            post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_grant"}))) }),
        );
        let trakt = client(serve(router).await);

        let err = trakt
            .exchange_token(&TokenGrant::RefreshToken("r".to_string()), "http://h")
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_scrobble_sends_bearer_token() {
        let router = Router::new().route(
            "/scrobble/:verb",
            post(
                |Path(verb): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "action": verb,
                            "auth": auth,
                            "api": has_api_headers(&headers),
                            "progress": body["progress"],
                        })),
                    )
                },
            ),
        );
        let trakt = client(serve(router).await);

        let body = ScrobbleBody::movie(
            42,
            Movie {
                title: "Arrival".to_string(),
                year: Some(2016),
                ids: TraktIds::default(),
            },
        );
        let raw = trakt.scrobble(ScrobbleVerb::Start, &body, "token-1").await.unwrap();
        let reply: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(reply["action"], "start");
        assert_eq!(reply["auth"], "Bearer token-1");
        assert_eq!(reply["api"], true);
        assert_eq!(reply["progress"], 42);
    }
}
