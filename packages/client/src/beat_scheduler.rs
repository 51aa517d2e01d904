//! Local beat clock.
//!
//! The scheduler is polled at a fixed rate with the offset-adjusted clock and
//! fires its sink once for every beat boundary it crosses. It never sleeps or
//! spawns; the session loop drives it.

use hyoshi_server::domain::Bpm;

/// A beat that has just been crossed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredBeat {
    pub beat_number: i64,
    /// Coordinator-clock time the beat was due at
    pub timestamp: f64,
    pub bpm: Bpm,
}

/// Collaborator that renders beats and tempo changes
pub trait BeatSink: Send {
    /// Called exactly once per beat, in order
    fn beat_fired(&mut self, beat: FiredBeat);

    /// Called when the tempo changes; `ramp_ms` is how long until the change takes effect
    fn apply_tempo(&mut self, bpm: Bpm, ramp_ms: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Running { beat_number: i64, target: f64 },
}

/// Fires a sink when the adjusted clock crosses the next beat
pub struct BeatScheduler<S: BeatSink> {
    state: State,
    bpm: Bpm,
    sink: S,
}

impl<S: BeatSink> BeatScheduler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: State::Idle,
            bpm: Bpm::DEFAULT,
            sink,
        }
    }

    /// Start (or restart) with beat `beat_number` due at `next_beat_timestamp`
    pub fn start(&mut self, bpm: Bpm, next_beat_timestamp: f64, beat_number: i64) {
        self.bpm = bpm;
        self.state = State::Running {
            beat_number,
            target: next_beat_timestamp,
        };
    }

    /// Fire at most one beat if `now` has reached the target.
    ///
    /// After firing, the target advances by one interval of the bpm in
    /// effect at that instant. Returns the fired beat, if any.
    pub fn poll(&mut self, now: f64) -> Option<FiredBeat> {
        let State::Running {
            beat_number,
            target,
        } = self.state
        else {
            return None;
        };
        if now < target {
            return None;
        }

        let fired = FiredBeat {
            beat_number,
            timestamp: target,
            bpm: self.bpm,
        };
        self.state = State::Running {
            beat_number: beat_number + 1,
            target: target + self.bpm.beat_interval_ms(),
        };
        self.sink.beat_fired(fired);
        Some(fired)
    }

    /// Change the bpm used for the next advance
    pub fn set_bpm(&mut self, bpm: Bpm) {
        self.bpm = bpm;
    }

    /// [`Self::set_bpm`], then let the sink ramp towards `bpm` over `ramp_ms`
    pub fn change_tempo(&mut self, bpm: Bpm, ramp_ms: f64) {
        self.set_bpm(bpm);
        self.sink.apply_tempo(bpm, ramp_ms);
    }

    /// Overwrite the pending beat (last message wins). Ignored while idle.
    pub fn retarget(&mut self, next_beat_timestamp: f64, beat_number: i64) {
        if let State::Running { .. } = self.state {
            self.state = State::Running {
                beat_number,
                target: next_beat_timestamp,
            };
        }
    }

    pub fn stop(&mut self) {
        self.state = State::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    /// Number and due time of the pending beat, while running
    pub fn next_beat(&self) -> Option<(i64, f64)> {
        match self.state {
            State::Running {
                beat_number,
                target,
            } => Some((beat_number, target)),
            State::Idle => None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
