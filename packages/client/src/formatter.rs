//! Message formatting utilities for client display.

use hyoshi_server::infrastructure::dto::websocket::{
    BeatPayload, BeatSyncRelay, MotionInputPayload, RoomStateDto, SetTempoPayload,
};
use hyoshi_shared::time::millis_to_rfc3339;

use crate::{beat_scheduler::FiredBeat, sync_estimator::SyncSample};

/// Message formatter for client display
pub struct MessageFormatter;

fn display_time(timestamp: f64) -> String {
    millis_to_rfc3339(timestamp).unwrap_or_else(|| format!("{:.3}", timestamp))
}

fn format_ids(ids: &[u64], me: Option<u64>) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }
    ids.iter()
        .map(|id| {
            if Some(*id) == me {
                format!("{} (me)", id)
            } else {
                id.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl MessageFormatter {
    /// Format a room state (join reply or update)
    ///
    /// # Arguments
    ///
    /// * `room_name` - Name of the room
    /// * `state` - Membership and beat of the room
    /// * `me` - This client's user ID, marked in the member lists
    pub fn format_room_state(room_name: &str, state: &RoomStateDto, me: Option<u64>) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str(&format!("Room '{}'\n", room_name));
        output.push_str(&format!(
            "  input:  {}\n",
            format_ids(&state.input_clients, me)
        ));
        output.push_str(&format!(
            "  output: {}\n",
            format_ids(&state.output_clients, me)
        ));
        output.push_str(&format!("  subscribers: {}\n", state.subscriptions_count));
        match &state.beat {
            Some(beat) => output.push_str(&format!(
                "  beat: {} bpm, #{} next at {}\n",
                beat.bpm,
                beat.last_beat_number + 1,
                display_time(beat.next_beat_timestamp)
            )),
            None => output.push_str("  beat: (stopped)\n"),
        }
        output.push_str("============================================================\n");
        output
    }

    /// Format a beat fired by the local scheduler
    pub fn format_beat(beat: &FiredBeat) -> String {
        let marker = if beat.beat_number.rem_euclid(4) == 0 {
            "*"
        } else {
            "."
        };
        format!(
            "\n{} beat #{} ({} bpm) at {}\n",
            marker,
            beat.beat_number,
            beat.bpm,
            display_time(beat.timestamp)
        )
    }

    /// Format a relayed motion sample
    pub fn format_motion(motion: &MotionInputPayload) -> String {
        format!(
            "\n~ user {}: frontToBack={:.3} around={:.3} (beat #{})\n",
            motion.user_id, motion.front_to_back, motion.around, motion.last_beat_number
        )
    }

    /// Format a relayed tempo change
    pub fn format_tempo_change(change: &SetTempoPayload) -> String {
        format!(
            "\n# tempo {} bpm from beat #{} at {}\n",
            change.bpm,
            change.next_beat_number,
            display_time(change.next_beat_timestamp)
        )
    }

    /// Format a relayed beat assertion
    pub fn format_beat_sync(sync: &BeatSyncRelay) -> String {
        format!(
            "\n| beat #{} asserted at {} ({} bpm)\n",
            sync.beat_number,
            display_time(sync.beat_timestamp),
            sync.bpm
        )
    }

    /// Format a scheduled beat
    pub fn format_scheduled_beat(beat: &BeatPayload) -> String {
        format!(
            "\n> beat #{} scheduled at {}\n",
            beat.beat_number,
            display_time(beat.beat_timestamp)
        )
    }

    /// Format the result of a clock-sync round
    pub fn format_sync_result(best: &SyncSample, samples: usize) -> String {
        format!(
            "\nClock synced: offset {:+.3} ms, rtt {:.3} ms (best of {})\n",
            best.offset, best.rtt, samples
        )
    }

    /// Format an error reported by the server
    pub fn format_server_error(message: &str) -> String {
        format!("\n! server: {}\n", message)
    }
}
