//! Ember Runtime - Frame loop infrastructure
//!
//! Provides the host-facing building blocks for a refresh-synchronized animation:
//! - `FrameClock`: delta time from the host's refresh timestamps
//! - `FrameHost`: the host's scheduling and listener-registration contract
//! - `FrameLoop`: drives a `FrameSystem` from host callbacks, owns teardown
//! - `ManualHost`: headless host with a virtual clock, for tools and tests
//! - `PointerCell`: latest-value pointer snapshot
//! - `EngineEvent` / `EventBus`: events a system reports back to its host

mod clock;
mod event;
mod event_bus;
mod frame_loop;
mod host;
mod input;
mod manual;
mod system;

pub use clock::{frame_units, FrameClock, MAX_FRAME_MS, REFERENCE_FRAME_MS};
pub use event::EngineEvent;
pub use event_bus::EventBus;
pub use frame_loop::{FrameLoop, LoopState};
pub use host::{FrameHandle, FrameHost, ListenerHandle, ListenerKind, TimerHandle};
pub use input::{Pointer, PointerCell};
pub use manual::ManualHost;
pub use system::{FrameRequest, FrameSystem};
