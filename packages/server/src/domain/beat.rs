//! Beat extrapolation.
//!
//! No timer runs per room. "Which beat are we on" is derived on demand from
//! the last synced anchor `(beat number, beat timestamp)` and the tempo.

use super::value_object::Bpm;

/// Result of extrapolating a beat anchor to a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTimes {
    /// Number of the most recent beat at or before `now`
    pub last_beat_number: i64,
    /// Timestamp (epoch ms) of the first beat strictly after `now`
    pub next_beat_timestamp: f64,
}

/// Extrapolate an anchor to `now`.
///
/// Anchors in the future are valid: `floor` of a negative elapsed time gives
/// a negative beat count, so the anchor itself comes out as the next beat.
pub fn extrapolate(bpm: Bpm, anchor_number: i64, anchor_timestamp: f64, now: f64) -> BeatTimes {
    let interval = bpm.beat_interval_ms();
    let elapsed = now - anchor_timestamp;
    let beats_elapsed = (elapsed / interval).floor();

    BeatTimes {
        last_beat_number: anchor_number + beats_elapsed as i64,
        next_beat_timestamp: anchor_timestamp + (beats_elapsed + 1.0) * interval,
    }
}
