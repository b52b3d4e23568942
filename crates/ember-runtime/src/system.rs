//! Frame system trait

use crate::input::Pointer;
use ember_core::{Result, Viewport};

/// What a system wants the host to schedule after a callback returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Run again on the next display refresh
    NextFrame,
    /// Stop refreshing and call back once after `delay_ms`
    Timer { delay_ms: u64 },
    /// Schedule nothing new but keep whatever is already pending
    Wait,
    /// Nothing further to schedule
    Stop,
}

/// A system driven by a [`FrameLoop`](crate::FrameLoop)
///
/// The loop calls `initialize` once, then `frame` once per display refresh for as
/// long as the system keeps asking for frames. Pointer and resize callbacks may
/// arrive between any two frames and only overwrite the system's latest input.
pub trait FrameSystem {
    /// Called once when the loop starts. An error here is permanent.
    fn initialize(&mut self) -> Result<FrameRequest>;

    /// Called once per refresh with the elapsed time since the previous one
    fn frame(&mut self, delta_ms: f64) -> Result<FrameRequest>;

    /// Called when a timer requested through [`FrameRequest::Timer`] elapses
    fn timer_fired(&mut self) -> Result<FrameRequest>;

    /// Latest pointer position from the host
    fn pointer_moved(&mut self, pointer: Pointer);

    /// Latest viewport from the host
    fn resized(&mut self, viewport: Viewport);

    /// Called when the loop is being torn down
    fn shutdown(&mut self);

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
