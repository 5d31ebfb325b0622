//! Watch progress and scrobble verb for a playback event.

use plaxt_models::{EventKind, ScrobbleAction, ScrobbleVerb};
use tracing::debug;

/// Progress reported for `media.scrobble`, whatever the offset.
pub const SCROBBLE_PROGRESS: u32 = 90;

/// `floor(offset / max(duration, runtime) * 100)`.
///
/// Not clamped: an offset past the end yields more than 100. A zero
/// denominator yields 0.
pub fn percentage(view_offset_ms: u64, duration_ms: u64, runtime_ms: u64) -> u32 {
    let duration = duration_ms.max(runtime_ms);
    if duration == 0 {
        return 0;
    }
    let percent = u128::from(view_offset_ms) * 100 / u128::from(duration);
    debug!(duration, offset = view_offset_ms, "Calculated percentage: {}", percent);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

pub fn verb_for(kind: &EventKind) -> Option<ScrobbleVerb> {
    match kind {
        EventKind::Play | EventKind::Resume => Some(ScrobbleVerb::Start),
        EventKind::Pause | EventKind::Stop | EventKind::Scrobble => Some(ScrobbleVerb::Stop),
        EventKind::Other(_) => None,
    }
}

/// Map an event to its scrobble action. `runtime_ms` is the catalog runtime (0 for movies).
pub fn action(kind: &EventKind, view_offset_ms: u64, duration_ms: u64, runtime_ms: u64) -> ScrobbleAction {
    let progress = match kind {
        EventKind::Scrobble => SCROBBLE_PROGRESS,
        _ => percentage(view_offset_ms, duration_ms, runtime_ms),
    };
    ScrobbleAction {
        verb: verb_for(kind),
        progress,
    }
}
