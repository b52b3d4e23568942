//! Headless host with a virtual clock

use crate::host::{FrameHandle, FrameHost, ListenerHandle, ListenerKind, TimerHandle};
use std::collections::HashMap;

/// A [`FrameHost`] that only records requests. Time moves when the owner says so.
///
/// Used by the CLI to render without a window and by tests to observe exactly
/// which callbacks are outstanding.
#[derive(Debug, Default)]
pub struct ManualHost {
    now_ms: f64,
    next_id: u64,
    frames: Vec<FrameHandle>,
    timers: Vec<(TimerHandle, f64)>,
    listeners: HashMap<ListenerHandle, ListenerKind>,
    frames_requested: u64,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn advance_clock(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.now_ms += ms;
        }
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the earliest pending timer
    pub fn next_timer_due(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|(_, due)| *due)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    /// Total refresh callbacks requested over the host's lifetime
    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    /// Remove and return the oldest pending refresh callback
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Remove and return the earliest timer whose due time has passed
    pub fn take_due_timer(&mut self) -> Option<TimerHandle> {
        let now = self.now_ms;
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= now)
            .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(idx).0)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }

    fn set_timeout(&mut self, delay_ms: u64) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        self.timers.push((handle, self.now_ms + delay_ms as f64));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id());
        self.listeners.insert(handle, kind);
        handle
    }

    fn remove_listener(&mut self, handle: ListenerHandle) {
        self.listeners.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_fifo_and_cancel() {
        let mut host = ManualHost::new();
        let a = host.request_frame();
        let b = host.request_frame();
        host.cancel_frame(a);
        assert_eq!(host.take_frame(), Some(b));
        assert_eq!(host.take_frame(), None);
        assert_eq!(host.frames_requested(), 2);
    }

    #[test]
    fn test_timers_fire_when_due() {
        let mut host = ManualHost::new();
        let late = host.set_timeout(500);
        let early = host.set_timeout(100);
        assert_eq!(host.next_timer_due(), Some(100.0));

        assert!(host.take_due_timer().is_none());
        host.advance_clock(100.0);
        assert_eq!(host.take_due_timer(), Some(early));
        assert!(host.take_due_timer().is_none());

        host.advance_clock(400.0);
        assert_eq!(host.take_due_timer(), Some(late));
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn test_listeners() {
        let mut host = ManualHost::new();
        let pointer = host.add_listener(ListenerKind::PointerMove);
        host.add_listener(ListenerKind::Resize);
        assert_eq!(host.listener_count(), 2);

        host.remove_listener(pointer);
        assert!(!host.is_listening(ListenerKind::PointerMove));
        assert!(host.is_listening(ListenerKind::Resize));
    }
}
