pub mod error;
pub mod plex;
pub mod traits;
pub mod trakt;

pub use error::{PayloadError, TraktError};
pub use plex::parse_webhook;
pub use traits::TraktApi;
pub use trakt::{TokenGrant, TokenSet, TraktClient, TraktSettings};
