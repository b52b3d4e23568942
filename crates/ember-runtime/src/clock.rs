//! Frame clock driven by host refresh timestamps

/// Duration of one reference frame. Per-frame rates are expressed against it.
pub const REFERENCE_FRAME_MS: f64 = 16.67;

/// Longest delta a single frame may observe (e.g. after a hidden tab resumes)
pub const MAX_FRAME_MS: f64 = 250.0;

/// Convert a delta in milliseconds into reference-frame units
pub fn frame_units(delta_ms: f64) -> f32 {
    (delta_ms / REFERENCE_FRAME_MS) as f32
}

/// Tracks elapsed time between refresh callbacks
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Total elapsed animation time in milliseconds
    pub total_ms: f64,
    /// Time since last frame in milliseconds
    pub delta_ms: f64,
    /// Number of ticks observed
    pub frame_count: u64,
    last_timestamp: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            last_timestamp: None,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock to the host timestamp of this refresh. Returns the delta.
    ///
    /// The first tick yields zero. Timestamps that run backwards yield zero too.
    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        self.frame_count += 1;

        let delta = match self.last_timestamp {
            Some(last) if timestamp_ms.is_finite() => (timestamp_ms - last).clamp(0.0, MAX_FRAME_MS),
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_timestamp = Some(timestamp_ms);
        }

        self.delta_ms = delta;
        self.total_ms += delta;
        delta
    }

    /// Forget the last timestamp so the next tick starts fresh
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
