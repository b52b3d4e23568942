//! Drives a frame system from host callbacks

use crate::clock::FrameClock;
use crate::host::{FrameHandle, FrameHost, ListenerHandle, ListenerKind, TimerHandle};
use crate::input::Pointer;
use crate::manual::ManualHost;
use crate::system::{FrameRequest, FrameSystem};
use ember_core::{EmberError, Result, Viewport};

/// Lifecycle of a [`FrameLoop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, nothing registered with the host yet
    Idle,
    /// Listening and scheduling callbacks
    Running,
    /// The system asked for nothing further
    Stopped,
    /// The system returned an error; host resources were released
    Failed,
    /// Torn down by the owner
    TornDown,
}

/// Owns a system and the host registrations made on its behalf.
///
/// Every frame, timer, and listener handle the loop obtains is tracked so that
/// teardown (explicit or on drop) leaves nothing scheduled on the host.
pub struct FrameLoop<S: FrameSystem, H: FrameHost> {
    system: S,
    host: H,
    clock: FrameClock,
    state: LoopState,
    frame: Option<FrameHandle>,
    timer: Option<TimerHandle>,
    listeners: Vec<ListenerHandle>,
}

impl<S: FrameSystem, H: FrameHost> FrameLoop<S, H> {
    pub fn new(system: S, host: H) -> Self {
        Self {
            system,
            host,
            clock: FrameClock::new(),
            state: LoopState::Idle,
            frame: None,
            timer: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.system
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Register listeners, initialize the system, and schedule its first request
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            return Err(EmberError::InvalidState {
                action: "start".into(),
                state: format!("{:?}", self.state),
            });
        }

        for kind in [ListenerKind::PointerMove, ListenerKind::Resize] {
            self.listeners.push(self.host.add_listener(kind));
        }

        match self.system.initialize() {
            Ok(request) => {
                self.state = LoopState::Running;
                log::debug!("[{}] started", self.system.name());
                self.apply(request);
                Ok(())
            }
            Err(err) => {
                log::warn!("[{}] failed to initialize: {err}", self.system.name());
                self.fail();
                Err(err)
            }
        }
    }

    /// Host refresh callback. Stale or cancelled handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) -> Result<()> {
        if self.frame != Some(handle) {
            return Ok(());
        }
        self.frame = None;
        if self.state != LoopState::Running {
            return Ok(());
        }

        let delta = self.clock.tick(timestamp_ms);
        match self.system.frame(delta) {
            Ok(request) => {
                self.apply(request);
                Ok(())
            }
            Err(err) => {
                log::warn!("[{}] frame failed: {err}", self.system.name());
                self.fail();
                Err(err)
            }
        }
    }

    /// Host timer callback. Stale or cleared handles are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) -> Result<()> {
        if self.timer != Some(handle) {
            return Ok(());
        }
        self.timer = None;
        if self.state != LoopState::Running {
            return Ok(());
        }

        match self.system.timer_fired() {
            Ok(request) => {
                self.apply(request);
                Ok(())
            }
            Err(err) => {
                log::warn!("[{}] timer failed: {err}", self.system.name());
                self.fail();
                Err(err)
            }
        }
    }

    /// Pointer-move listener. Dropped unless the loop is listening.
    pub fn pointer_moved(&mut self, pointer: Pointer) {
        if self.state == LoopState::Running {
            self.system.pointer_moved(pointer);
        }
    }

    /// Resize listener. Dropped unless the loop is listening.
    pub fn resized(&mut self, viewport: Viewport) {
        if self.state == LoopState::Running {
            self.system.resized(viewport);
        }
    }

    /// Cancel everything outstanding on the host and shut the system down
    pub fn teardown(&mut self) {
        if self.state == LoopState::TornDown {
            return;
        }
        self.release();
        if self.state != LoopState::Idle {
            self.system.shutdown();
        }
        self.state = LoopState::TornDown;
        log::debug!("[{}] torn down", self.system.name());
    }

    fn apply(&mut self, request: FrameRequest) {
        match request {
            FrameRequest::NextFrame => {
                if self.frame.is_none() {
                    self.frame = Some(self.host.request_frame());
                }
            }
            FrameRequest::Timer { delay_ms } => {
                if let Some(old) = self.timer.take() {
                    self.host.clear_timeout(old);
                }
                self.timer = Some(self.host.set_timeout(delay_ms));
            }
            FrameRequest::Wait => {}
            FrameRequest::Stop => {
                self.release();
                self.state = LoopState::Stopped;
            }
        }
    }

    fn fail(&mut self) {
        self.release();
        self.state = LoopState::Failed;
    }

    fn release(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.host.cancel_frame(frame);
        }
        if let Some(timer) = self.timer.take() {
            self.host.clear_timeout(timer);
        }
        for listener in self.listeners.drain(..) {
            self.host.remove_listener(listener);
        }
    }
}

impl<S: FrameSystem> FrameLoop<S, ManualHost> {
    /// Advance virtual time by `ms`, then deliver due timers and one pending frame
    pub fn step(&mut self, ms: f64) -> Result<()> {
        self.host.advance_clock(ms);
        while let Some(timer) = self.host.take_due_timer() {
            self.on_timer(timer)?;
        }
        if let Some(frame) = self.host.take_frame() {
            let now = self.host.now();
            self.on_frame(frame, now)?;
        }
        Ok(())
    }

    /// Step at a fixed interval until `max_steps` or until nothing is scheduled.
    /// Returns the number of steps taken.
    pub fn run(&mut self, frame_ms: f64, max_steps: usize) -> Result<usize> {
        let mut steps = 0;
        while steps < max_steps && self.has_pending_work() {
            self.step(frame_ms)?;
            steps += 1;
        }
        Ok(steps)
    }

    /// True while a frame or timer is outstanding
    pub fn has_pending_work(&self) -> bool {
        self.host.has_pending_frame() || self.host.pending_timers() > 0
    }
}

impl<S: FrameSystem, H: FrameHost> Drop for FrameLoop<S, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
