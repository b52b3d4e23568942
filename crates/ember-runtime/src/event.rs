//! Events a frame system reports back to its host

/// Something the host may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The system acquired its drawing context and began animating
    Started,
    /// The particle pool was regenerated for a new surface size
    PoolRegenerated { particles: usize },
    /// The active color theme rotated
    ThemeChanged { index: usize },
    /// Progress saturated; the completion grace delay has begun
    ProgressSaturated,
    /// The completion callback fired
    Completed,
    /// The system failed and will not draw again
    Error(String),
    /// The system released its listeners and pending callbacks
    TornDown,
}
