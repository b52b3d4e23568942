//! The host's scheduling and listener contract

/// Handle to a pending refresh callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Handle to a pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Handle to a registered input listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Input sources a frame loop subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    Resize,
}

/// What a host (browser window, native event loop, headless harness) must provide.
///
/// Each request returns a handle that can be cancelled. Cancelling a handle that
/// already fired or was never issued is a no-op.
pub trait FrameHost {
    /// Schedule one callback on the next display refresh
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Schedule one callback after `delay_ms`
    fn set_timeout(&mut self, delay_ms: u64) -> TimerHandle;

    fn clear_timeout(&mut self, handle: TimerHandle);

    /// Start delivering events of `kind` to the loop
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle;

    fn remove_listener(&mut self, handle: ListenerHandle);
}
