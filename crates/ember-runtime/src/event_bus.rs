//! Queue of engine events waiting for the host

use crate::event::EngineEvent;

/// Events pushed by a system between two host polls.
///
/// Back-to-back pool regenerations (a window being dragged) collapse into the
/// latest one, so a slow host never replays a resize storm.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        let supersedes_last = matches!(event, EngineEvent::PoolRegenerated { .. })
            && matches!(
                self.pending.last(),
                Some(EngineEvent::PoolRegenerated { .. })
            );
        if supersedes_last {
            self.pending.pop();
        }
        self.pending.push(event);
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn contains(&self, event: &EngineEvent) -> bool {
        self.pending.contains(event)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
