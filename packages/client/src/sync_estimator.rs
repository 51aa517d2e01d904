//! Clock-offset estimation against the coordinator.
//!
//! One exchange yields four timestamps: `t1` (client send), `t2`
//! (coordinator receive), `t3` (coordinator send) and `t4` (client receive).
//! Assuming a symmetric path, the offset between the two clocks and the
//! round-trip time on the wire are
//!
//! ```text
//! offset = ((t2 - t1) + (t3 - t4)) / 2
//! rtt    = (t4 - t1) - (t3 - t2)
//! ```
//!
//! A round collects several samples and keeps the one with the smallest
//! RTT, which is the one least distorted by queueing delay.

/// One clock-sync exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSample {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub t4: f64,
    /// Coordinator clock minus local clock, in milliseconds
    pub offset: f64,
    /// Round trip spent on the network, in milliseconds
    pub rtt: f64,
}

impl SyncSample {
    pub fn new(t1: f64, t2: f64, t3: f64, t4: f64) -> Self {
        Self {
            t1,
            t2,
            t3,
            t4,
            offset: ((t2 - t1) + (t3 - t4)) / 2.0,
            rtt: (t4 - t1) - (t3 - t2),
        }
    }
}

/// Collects sync samples in rounds and holds the standing clock correction
#[derive(Debug, Clone)]
pub struct SyncEstimator {
    round_size: usize,
    samples: Vec<SyncSample>,
    offset: f64,
    rtt: Option<f64>,
}

impl SyncEstimator {
    /// Number of samples per round when nothing else is configured
    pub const DEFAULT_ROUND_SIZE: usize = 30;

    /// `round_size` is clamped to at least one sample
    pub fn new(round_size: usize) -> Self {
        Self {
            round_size: round_size.max(1),
            samples: Vec::with_capacity(round_size.max(1)),
            offset: 0.0,
            rtt: None,
        }
    }

    pub fn round_size(&self) -> usize {
        self.round_size
    }

    /// Start a new round, dropping samples of an unfinished one.
    ///
    /// The standing offset stays in effect until the round finishes.
    pub fn begin_round(&mut self) {
        self.samples.clear();
    }

    /// Add one exchange to the current round
    pub fn record(&mut self, t1: f64, t2: f64, t3: f64, t4: f64) -> SyncSample {
        let sample = SyncSample::new(t1, t2, t3, t4);
        self.samples.push(sample);
        sample
    }

    pub fn samples_collected(&self) -> usize {
        self.samples.len()
    }

    pub fn is_round_complete(&self) -> bool {
        self.samples.len() >= self.round_size
    }

    /// Close the round: adopt the offset of the sample with minimum RTT.
    ///
    /// Returns `None` (and keeps the previous offset) when the round has no
    /// samples. The buffer is cleared either way.
    pub fn finish_round(&mut self) -> Option<SyncSample> {
        let best = self
            .samples
            .iter()
            .copied()
            .min_by(|a, b| a.rtt.total_cmp(&b.rtt));
        self.samples.clear();

        let best = best?;
        self.offset = best.offset;
        self.rtt = Some(best.rtt);
        Some(best)
    }

    /// Standing correction (coordinator clock minus local clock)
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// RTT of the sample the standing offset came from
    pub fn rtt(&self) -> Option<f64> {
        self.rtt
    }

    /// `local_now` expressed on the coordinator clock
    pub fn adjusted_now(&self, local_now: f64) -> f64 {
        local_now + self.offset
    }
}

impl Default for SyncEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROUND_SIZE)
    }
}
