//! Time-based progress counter and the loader's stage labels

use ember_runtime::REFERENCE_FRAME_MS;

pub const PROGRESS_MAX: f64 = 100.0;

/// Labels shown under the loader while progress climbs
pub const LOADING_STAGES: [&str; 4] = [
    "Initializing",
    "Loading assets",
    "Preparing portfolio",
    "Almost ready",
];

/// Monotonic counter in `[0, 100]`, advanced by `rate` per reference frame
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    value: f64,
    rate: f64,
}

impl Progress {
    pub fn new(rate: f64) -> Self {
        Self {
            value: 0.0,
            rate: rate.max(0.0),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_saturated(&self) -> bool {
        self.value >= PROGRESS_MAX
    }

    /// Advance by `rate * delta_ms / 16.67`. Returns true only on the call that
    /// reaches 100.
    pub fn advance(&mut self, delta_ms: f64) -> bool {
        if self.is_saturated() || !(delta_ms > 0.0) {
            return false;
        }
        self.value = (self.value + self.rate * delta_ms / REFERENCE_FRAME_MS).min(PROGRESS_MAX);
        self.is_saturated()
    }

    /// Index into [`LOADING_STAGES`]
    pub fn stage_index(&self) -> usize {
        let idx = (self.value / PROGRESS_MAX * LOADING_STAGES.len() as f64).floor() as usize;
        idx.min(LOADING_STAGES.len() - 1)
    }

    pub fn stage(&self) -> &'static str {
        LOADING_STAGES[self.stage_index()]
    }
}
