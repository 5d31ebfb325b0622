pub mod api;
pub mod auth;
pub mod client;

pub use api::{Episode, EpisodeSearchResult, Movie, MovieSearchResult, ScrobbleBody, ShowSummary};
pub use auth::{authorize_url, redirect_uri, TokenGrant, TokenSet};
pub use client::{TraktClient, TraktSettings};
