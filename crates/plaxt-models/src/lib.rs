pub mod catalog;
pub mod credential;
pub mod event;
pub mod scrobble;

pub use catalog::{CatalogMatch, EpisodeMatch, MovieMatch, TraktIds};
pub use credential::{Credential, TOKEN_REFRESH_AGE_DAYS};
pub use event::{EventKind, ExternalId, MediaEvent, SectionType};
pub use scrobble::{ScrobbleAction, ScrobbleVerb};
