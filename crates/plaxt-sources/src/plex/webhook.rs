//! Plex Media Server webhook payloads.
//!
//! Plex posts `multipart/form-data` with the JSON document in the `payload`
//! field. Only the fields the scrobbler uses are decoded.

use plaxt_models::{EventKind, ExternalId, MediaEvent, SectionType};
use serde::Deserialize;

use crate::error::PayloadError;

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    event: String,
    #[serde(rename = "Account", default)]
    account: Account,
    #[serde(rename = "Metadata", default)]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
struct Account {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(rename = "librarySectionType", default)]
    library_section_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    duration: u64,
    #[serde(rename = "viewOffset", default)]
    view_offset: u64,
    #[serde(rename = "Guid", default)]
    guids: Vec<Guid>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    id: String,
}

/// Decode the `payload` form field into a [`MediaEvent`].
pub fn parse_webhook(payload: &[u8]) -> Result<MediaEvent, PayloadError> {
    if payload.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(PayloadError::Empty);
    }
    let raw: WebhookPayload = serde_json::from_slice(payload)?;
    let metadata = raw.metadata;

    Ok(MediaEvent {
        kind: EventKind::from_plex(&raw.event),
        section_type: SectionType::from_plex(&metadata.library_section_type),
        external_ids: metadata
            .guids
            .iter()
            .filter_map(|g| ExternalId::parse(&g.id))
            .collect(),
        title: metadata.title,
        year: metadata.year,
        duration_ms: metadata.duration,
        view_offset_ms: metadata.view_offset,
        account: raw.account.title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPISODE_PLAY: &str = r#"{
        "event": "media.play",
        "user": true,
        "owner": true,
        "Account": {"id": 1, "thumb": "https://plex.tv/users/1/avatar", "title": "HalKeye"},
        "Server": {"title": "Office", "uuid": "54664a3d8acc39983675640ec9ce00b70af9cc36"},
        "Player": {"local": true, "publicAddress": "200.200.200.200", "title": "Plex Web (Safari)", "uuid": "r6yfkdnfggbh2bdnvkffwbms"},
        "Metadata": {
            "librarySectionType": "show",
            "ratingKey": "1936545",
            "type": "episode",
            "title": "The Pilot",
            "grandparentTitle": "Dark",
            "parentIndex": 1,
            "index": 1,
            "year": 2017,
            "duration": 3060000,
            "viewOffset": 306000,
            "guid": "plex://episode/5d9c0874ffd9ef001e99607a",
            "Guid": [
                {"id": "imdb://tt5646710"},
                {"id": "tmdb://1309550"},
                {"id": "tvdb://5937406"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_episode_event() {
        let event = parse_webhook(EPISODE_PLAY.as_bytes()).unwrap();
        assert_eq!(event.kind, EventKind::Play);
        assert_eq!(event.section_type, SectionType::Show);
        assert_eq!(event.account, "HalKeye");
        assert_eq!(event.title, "The Pilot");
        assert_eq!(event.year, Some(2017));
        assert_eq!(event.duration_ms, 3_060_000);
        assert_eq!(event.view_offset_ms, 306_000);
        assert_eq!(event.external_ids.len(), 3);
        assert_eq!(event.primary_external_id().unwrap().service, "imdb");
        assert_eq!(event.primary_external_id().unwrap().id, "tt5646710");
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let payload = r#"{
            "event": "media.scrobble",
            "Account": {"title": "halkeye"},
            "Metadata": {"librarySectionType": "movie", "title": "Arrival", "year": 2016}
        }"#;
        let event = parse_webhook(payload.as_bytes()).unwrap();
        assert_eq!(event.kind, EventKind::Scrobble);
        assert_eq!(event.section_type, SectionType::Movie);
        assert_eq!(event.duration_ms, 0);
        assert_eq!(event.view_offset_ms, 0);
        assert!(event.external_ids.is_empty());
    }

    #[test]
    fn test_event_without_metadata() {
        let payload = r#"{"event": "admin.database.backup", "Account": {"title": "admin"}}"#;
        let event = parse_webhook(payload.as_bytes()).unwrap();
        assert_eq!(event.kind, EventKind::Other("admin.database.backup".to_string()));
        assert_eq!(event.section_type, SectionType::Other(String::new()));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(parse_webhook(b""), Err(PayloadError::Empty)));
        assert!(matches!(parse_webhook(b"{not json"), Err(PayloadError::Json(_))));
        assert!(matches!(
            parse_webhook(br#"{"Account": {"title": "x"}}"#),
            Err(PayloadError::Json(_))
        ));
    }
}
