use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback event reported by a Plex Media Server webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Play,
    Pause,
    Resume,
    Stop,
    Scrobble,
    Other(String),
}

impl EventKind {
    /// Map a Plex event name (`media.play`, `media.scrobble`, ...).
    pub fn from_plex(name: &str) -> Self {
        match name {
            "media.play" => EventKind::Play,
            "media.pause" => EventKind::Pause,
            "media.resume" => EventKind::Resume,
            "media.stop" => EventKind::Stop,
            "media.scrobble" => EventKind::Scrobble,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Play => write!(f, "media.play"),
            EventKind::Pause => write!(f, "media.pause"),
            EventKind::Resume => write!(f, "media.resume"),
            EventKind::Stop => write!(f, "media.stop"),
            EventKind::Scrobble => write!(f, "media.scrobble"),
            EventKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Library section the media belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionType {
    Show,
    Movie,
    Other(String),
}

impl SectionType {
    pub fn from_plex(name: &str) -> Self {
        match name {
            "show" => SectionType::Show,
            "movie" => SectionType::Movie,
            other => SectionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionType::Show => write!(f, "show"),
            SectionType::Movie => write!(f, "movie"),
            SectionType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// External identifier in Plex's `{service}://{id}` form, e.g. `tvdb://8382421`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalId {
    pub service: String,
    pub id: String,
}

impl ExternalId {
    pub fn parse(guid: &str) -> Option<Self> {
        let (service, id) = guid.split_once("://")?;
        if service.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            service: service.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.service, self.id)
    }
}

/// Decoded webhook event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEvent {
    pub kind: EventKind,
    pub section_type: SectionType,
    pub external_ids: Vec<ExternalId>,
    pub title: String,
    pub year: Option<u32>,
    pub duration_ms: u64,
    pub view_offset_ms: u64,
    pub account: String,
}

impl MediaEvent {
    /// First external id usable for a catalog lookup.
    pub fn primary_external_id(&self) -> Option<&ExternalId> {
        self.external_ids.first()
    }
}
