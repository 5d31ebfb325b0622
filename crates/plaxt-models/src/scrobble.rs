use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrobbleVerb {
    Start,
    Stop,
}

impl ScrobbleVerb {
    /// Path segment for `/scrobble/{verb}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrobbleVerb::Start => "start",
            ScrobbleVerb::Stop => "stop",
        }
    }
}

impl fmt::Display for ScrobbleVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to tell Trakt about an event.
///
/// `verb` is `None` for events that have no scrobble counterpart; such
/// actions are never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrobbleAction {
    pub verb: Option<ScrobbleVerb>,
    pub progress: u32,
}

