//! The particle engine: owns the pool, decorations, and progress for one surface
//! and advances them once per frame.

use crate::config::EngineConfig;
use crate::decor::{scatter_symbols, Grid, Symbol};
use crate::draw::{compose, particle_base_color, FrameScene};
use crate::particle::{Particle, ParticleInstance, ParticlePool};
use crate::progress::Progress;
use crate::rand::ParticleRng;
use crate::theme::{Theme, ThemeRotation};
use ember_core::{EmberError, Result, Size, Viewport};
use ember_render::{Canvas, Surface};
use ember_runtime::{
    frame_units, EngineEvent, EventBus, FrameRequest, FrameSystem, Pointer, PointerCell,
};

/// Degrees of perspective tilt at the viewport edges, per unit of normalized offset
const TILT_DEGREES: f32 = 5.0;

/// Lifecycle of an [`Engine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built but not started; no context acquired yet
    Idle,
    /// Drawing every frame
    Running,
    /// Progress saturated; waiting out the grace delay
    Completing,
    /// The completion callback has fired
    Completed,
    /// The 2D context was unavailable at start
    Failed,
    /// Released; will never draw again
    TornDown,
}

pub struct Engine<S: Surface> {
    surface: S,
    config: EngineConfig,
    state: EngineState,
    rng: ParticleRng,
    viewport: Viewport,
    pool: ParticlePool,
    grid: Option<Grid>,
    symbols: Vec<Symbol>,
    themes: ThemeRotation,
    progress: Progress,
    pointer: PointerCell,
    events: EventBus,
    on_complete: Option<Box<dyn FnOnce()>>,
    draw_count: u64,
}

impl<S: Surface> Engine<S> {
    /// Validate `config` and wrap `surface`. The initial viewport is the surface's
    /// current backing size at a device pixel ratio of 1.
    pub fn new(surface: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let (width, height) = surface.backing_size();
        let rng = match config.seed {
            Some(seed) => ParticleRng::new(seed),
            None => ParticleRng::from_clock(),
        };
        let themes = ThemeRotation::new(config.themes.clone(), config.theme_interval_ms);
        let progress = Progress::new(config.progress_rate);

        Ok(Self {
            surface,
            config,
            state: EngineState::Idle,
            rng,
            viewport: Viewport::new(width as f32, height as f32, 1.0),
            pool: ParticlePool::new(),
            grid: None,
            symbols: Vec::new(),
            themes,
            progress,
            pointer: PointerCell::new(),
            events: EventBus::new(),
            on_complete: None,
            draw_count: 0,
        })
    }

    /// Register the callback fired once progress saturates and the grace delay
    /// elapses. Replaces any earlier callback.
    pub fn on_complete(&mut self, callback: impl FnOnce() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Acquire the 2D context and build the pool for the current viewport.
    /// A missing context is permanent: the engine moves to `Failed`.
    pub fn start(&mut self) -> Result<FrameRequest> {
        if self.state != EngineState::Idle {
            return Err(self.invalid("start"));
        }
        if self.surface.context_2d().is_none() {
            log::warn!(
                "[{}] 2D context unavailable; rendering the static fallback",
                self.config.name
            );
            self.state = EngineState::Failed;
            self.on_complete = None;
            self.events
                .push(EngineEvent::Error(EmberError::ContextUnavailable.to_string()));
            return Err(EmberError::ContextUnavailable);
        }

        self.apply_viewport();
        self.state = EngineState::Running;
        self.events.push(EngineEvent::Started);
        log::debug!(
            "[{}] started with {} particles",
            self.config.name,
            self.pool.len()
        );
        Ok(FrameRequest::NextFrame)
    }

    /// Record the latest pointer sample; the next frame reads it
    pub fn on_pointer_move(&mut self, pointer: Pointer) {
        if self.is_live() || self.state == EngineState::Idle {
            self.pointer.set(pointer);
        }
    }

    /// Adopt a new viewport. While live, a changed size regenerates the pool and
    /// decorations from scratch.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        match self.state {
            EngineState::Idle => self.viewport = viewport,
            EngineState::Running | EngineState::Completing => {
                self.viewport = viewport;
                self.apply_viewport();
            }
            _ => {}
        }
    }

    /// Advance and draw one frame. `delta_ms` is used as given; hosts that want
    /// long stalls capped do so before calling (see `FrameClock`).
    ///
    /// A refresh that lands during the grace delay changes nothing and leaves the
    /// pending timer alone ([`FrameRequest::Wait`]). Once the engine is done
    /// (completed or torn down) this is a no-op that asks for nothing further.
    /// Losing the context mid-run tears the engine down and returns
    /// [`EmberError::SurfaceLost`].
    pub fn tick(&mut self, delta_ms: f64) -> Result<FrameRequest> {
        match self.state {
            EngineState::Running => {}
            EngineState::Completing => return Ok(FrameRequest::Wait),
            EngineState::Completed | EngineState::TornDown => return Ok(FrameRequest::Stop),
            _ => return Err(self.invalid("tick")),
        }

        let delta_ms = if delta_ms.is_finite() {
            delta_ms.max(0.0)
        } else {
            0.0
        };
        let frames = frame_units(delta_ms);

        if let Some(index) = self.themes.advance(delta_ms) {
            log::info!(
                "[{}] theme -> {}",
                self.config.name,
                self.themes.current().name
            );
            self.events.push(EngineEvent::ThemeChanged { index });
        }

        let bounds = self.viewport.size();
        let pointer = self.pointer.get().map(|p| p.to_pixels(bounds));
        self.pool.update(pointer, frames, &self.config);
        if let Some(symbols) = &self.config.symbols {
            for symbol in &mut self.symbols {
                symbol.advance(symbols, frames);
            }
        }

        let Some(canvas) = self.surface.context_2d() else {
            return Err(self.lose_surface());
        };
        let scene = FrameScene {
            bounds,
            theme: self.themes.current(),
            palette: self.config.palette,
            grid: self.grid.as_ref(),
            symbols: &self.symbols,
            glow: pointer.zip(self.config.glow.as_ref()),
            particles: self.pool.particles(),
            title: self.config.title.as_ref(),
            progress_bar: self
                .config
                .progress_bar
                .as_ref()
                .map(|bar| (self.progress.value(), bar)),
        };
        compose(canvas, &scene);
        self.draw_count += 1;

        if self.progress.advance(delta_ms) {
            if self.config.completion {
                return Ok(self.begin_completion());
            }
            log::debug!("[{}] progress saturated", self.config.name);
        }
        Ok(FrameRequest::NextFrame)
    }

    /// The grace delay elapsed. Fires the completion callback exactly once.
    pub fn timer_fired(&mut self) -> Result<FrameRequest> {
        match self.state {
            EngineState::Completing => {
                self.finish();
                Ok(FrameRequest::Stop)
            }
            EngineState::Completed | EngineState::TornDown => Ok(FrameRequest::Stop),
            _ => Err(self.invalid("handle a timer")),
        }
    }

    /// Release everything. A pending completion callback is dropped unfired.
    pub fn teardown(&mut self) {
        if self.state == EngineState::TornDown {
            return;
        }
        self.state = EngineState::TornDown;
        self.on_complete = None;
        self.pool.clear();
        self.symbols.clear();
        self.grid = None;
        self.pointer.clear();
        self.events.push(EngineEvent::TornDown);
        log::debug!(
            "[{}] torn down after {} frames",
            self.config.name,
            self.draw_count
        );
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn bounds(&self) -> Size {
        self.viewport.size()
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.particles()
    }

    /// Bumped every time the pool is regenerated
    pub fn pool_generation(&self) -> u64 {
        self.pool.generation()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    pub fn loading_stage(&self) -> &'static str {
        self.progress.stage()
    }

    pub fn theme(&self) -> &Theme {
        self.themes.current()
    }

    pub fn theme_index(&self) -> usize {
        self.themes.index()
    }

    /// Number of frames drawn so far
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer.get()
    }

    /// Perspective tilt `(rotate_x, rotate_y)` in degrees that follows the pointer.
    /// Level when no pointer has been seen.
    pub fn tilt(&self) -> (f32, f32) {
        match self.pointer.get() {
            Some(pointer) => {
                let n = pointer.to_normalized(self.bounds());
                ((n.y - 0.5) * TILT_DEGREES, (n.x - 0.5) * TILT_DEGREES)
            }
            None => (0.0, 0.0),
        }
    }

    /// Pack the current particles for an instanced draw
    pub fn instances(&mut self) -> &[ParticleInstance] {
        let palette = self.config.palette;
        let theme = self.themes.current();
        self.pool
            .pack_instances(|p| particle_base_color(palette, theme, p))
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn is_live(&self) -> bool {
        matches!(self.state, EngineState::Running | EngineState::Completing)
    }

    fn invalid(&self, action: &str) -> EmberError {
        EmberError::InvalidState {
            action: action.into(),
            state: format!("{:?}", self.state),
        }
    }

    /// Size the backing store for the viewport and rebuild everything keyed to it
    fn apply_viewport(&mut self) {
        let (width, height) = self.viewport.device_pixels();
        self.surface.set_backing_size(width, height);
        if let Some(canvas) = self.surface.context_2d() {
            canvas.resize(width, height);
            canvas.set_scale(self.viewport.ratio());
        }

        let bounds = self.viewport.size();
        self.pool.regenerate(bounds, &self.config, &mut self.rng);
        self.grid = self.config.grid.as_ref().map(|g| Grid::build(bounds, g));
        self.symbols = match &self.config.symbols {
            Some(symbols) => scatter_symbols(bounds, symbols, &mut self.rng),
            None => Vec::new(),
        };

        log::debug!(
            "[{}] regenerated {} particles, {} symbols for {}x{} @{}x",
            self.config.name,
            self.pool.len(),
            self.symbols.len(),
            bounds.width,
            bounds.height,
            self.viewport.ratio()
        );
        self.events.push(EngineEvent::PoolRegenerated {
            particles: self.pool.len(),
        });
    }

    fn begin_completion(&mut self) -> FrameRequest {
        log::info!(
            "[{}] progress complete; handing off in {}ms",
            self.config.name,
            self.config.grace_delay_ms
        );
        self.state = EngineState::Completing;
        self.events.push(EngineEvent::ProgressSaturated);
        if self.config.grace_delay_ms == 0 {
            self.finish();
            FrameRequest::Stop
        } else {
            FrameRequest::Timer {
                delay_ms: self.config.grace_delay_ms,
            }
        }
    }

    fn finish(&mut self) {
        self.state = EngineState::Completed;
        self.events.push(EngineEvent::Completed);
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
        log::info!("[{}] completed", self.config.name);
    }

    fn lose_surface(&mut self) -> EmberError {
        let err = EmberError::SurfaceLost;
        log::warn!("[{}] {err}; tearing down", self.config.name);
        self.events.push(EngineEvent::Error(err.to_string()));
        self.teardown();
        err
    }
}

impl<S: Surface> FrameSystem for Engine<S> {
    fn initialize(&mut self) -> Result<FrameRequest> {
        self.start()
    }

    fn frame(&mut self, delta_ms: f64) -> Result<FrameRequest> {
        self.tick(delta_ms)
    }

    fn timer_fired(&mut self) -> Result<FrameRequest> {
        Engine::timer_fired(self)
    }

    fn pointer_moved(&mut self, pointer: Pointer) {
        self.on_pointer_move(pointer);
    }

    fn resized(&mut self, viewport: Viewport) {
        self.on_resize(viewport);
    }

    fn shutdown(&mut self) {
        self.teardown();
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Density;
    use ember_core::Vec2;
    use ember_render::{HeadlessSurface, RecordingCanvas};
    use ember_runtime::{FrameLoop, LoopState, ManualHost, REFERENCE_FRAME_MS};
    use std::cell::Cell;
    use std::rc::Rc;

    type TestEngine = Engine<HeadlessSurface<RecordingCanvas>>;

    fn seeded(mut config: EngineConfig) -> EngineConfig {
        config.seed = Some(42);
        config
    }

    fn engine(config: EngineConfig, width: u32, height: u32) -> TestEngine {
        let surface = HeadlessSurface::new(RecordingCanvas::new(width, height));
        Engine::new(surface, seeded(config)).unwrap()
    }

    fn counter(engine: &mut TestEngine) -> Rc<Cell<u32>> {
        let fired = Rc::new(Cell::new(0));
        let hook = Rc::clone(&fired);
        engine.on_complete(move || hook.set(hook.get() + 1));
        fired
    }

    #[test]
    fn start_builds_pool_from_logical_area() {
        let mut engine = engine(EngineConfig::loader(), 800, 600);
        engine.on_resize(Viewport::new(800.0, 600.0, 2.0));
        assert_eq!(engine.start().unwrap(), FrameRequest::NextFrame);
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.particles().len(), 24);
        assert_eq!(engine.surface().backing_size(), (1600, 1200));
        assert_eq!(
            engine.surface().canvas().commands().last(),
            Some(&ember_render::DrawCommand::SetScale(2.0))
        );
        assert_eq!(
            engine.drain_events(),
            vec![
                EngineEvent::PoolRegenerated { particles: 24 },
                EngineEvent::Started
            ]
        );
    }

    #[test]
    fn unsupported_context_fails_without_drawing() {
        let surface = HeadlessSurface::unsupported(RecordingCanvas::new(800, 600));
        let mut engine = Engine::new(surface, seeded(EngineConfig::loader())).unwrap();
        let fired = counter(&mut engine);

        assert!(matches!(engine.start(), Err(EmberError::ContextUnavailable)));
        assert_eq!(engine.state(), EngineState::Failed);
        assert!(matches!(engine.tick(16.67), Err(EmberError::InvalidState { .. })));
        assert_eq!(engine.draw_count(), 0);
        assert!(engine.particles().is_empty());
        assert_eq!(fired.get(), 0);
        assert!(matches!(
            engine.drain_events().as_slice(),
            [EngineEvent::Error(_)]
        ));
        // No retry
        assert!(matches!(engine.start(), Err(EmberError::InvalidState { .. })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::loader();
        config.max_speed = 0.0;
        let surface = HeadlessSurface::new(RecordingCanvas::new(10, 10));
        assert!(matches!(
            Engine::new(surface, config),
            Err(EmberError::InvalidConfig(_))
        ));
    }

    #[test]
    fn completion_fires_once_after_grace() {
        let mut engine = engine(EngineConfig::loader(), 800, 600);
        let fired = counter(&mut engine);
        engine.start().unwrap();

        let mut last = 0.0;
        for step in 1..=333 {
            assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::NextFrame);
            assert!(engine.progress() >= last, "regressed at step {step}");
            last = engine.progress();
        }
        assert!(engine.progress() < 100.0);
        assert_eq!(
            engine.tick(REFERENCE_FRAME_MS).unwrap(),
            FrameRequest::Timer { delay_ms: 500 }
        );
        assert_eq!(engine.progress(), 100.0);
        assert_eq!(engine.state(), EngineState::Completing);
        assert_eq!(engine.loading_stage(), "Almost ready");
        assert_eq!(fired.get(), 0);

        assert_eq!(engine.timer_fired().unwrap(), FrameRequest::Stop);
        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(fired.get(), 1);

        // Late callbacks change nothing
        assert_eq!(engine.timer_fired().unwrap(), FrameRequest::Stop);
        assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::Stop);
        assert_eq!(fired.get(), 1);
        assert_eq!(engine.draw_count(), 334);
    }

    #[test]
    fn refresh_during_grace_is_ignored() {
        let mut config = EngineConfig::loader();
        config.progress_rate = 200.0;
        let mut engine = engine(config, 200, 200);
        let fired = counter(&mut engine);
        engine.start().unwrap();
        assert_eq!(
            engine.tick(REFERENCE_FRAME_MS).unwrap(),
            FrameRequest::Timer { delay_ms: 500 }
        );
        let drawn = engine.draw_count();
        let positions: Vec<Vec2> = engine.particles().iter().map(|p| p.position).collect();
        engine.drain_events();

        for _ in 0..3 {
            assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::Wait);
        }
        assert_eq!(engine.state(), EngineState::Completing);
        assert_eq!(engine.draw_count(), drawn);
        let after: Vec<Vec2> = engine.particles().iter().map(|p| p.position).collect();
        assert_eq!(after, positions);
        assert!(engine.drain_events().is_empty());
        assert_eq!(fired.get(), 0);

        assert_eq!(engine.timer_fired().unwrap(), FrameRequest::Stop);
        assert_eq!(fired.get(), 1);
        assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::Stop);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn long_frames_advance_in_proportion() {
        let mut loader = engine(EngineConfig::loader(), 400, 300);
        loader.start().unwrap();
        loader.tick(1_000.0).unwrap();
        let expected = 0.3 * 1_000.0 / REFERENCE_FRAME_MS;
        assert!((loader.progress() - expected).abs() < 1e-4);

        let mut config = EngineConfig::background();
        config.theme_interval_ms = Some(1_000);
        let mut background = engine(config, 300, 300);
        background.start().unwrap();
        background.tick(2_500.0).unwrap();
        assert_eq!(background.theme_index(), 2);
    }

    #[test]
    fn oversized_viewport_keeps_pool_bounded() {
        let mut engine = engine(EngineConfig::background(), 400, 300);
        engine.start().unwrap();
        engine.on_resize(Viewport::new(1e20, 1e20, 1.0));
        assert_eq!(engine.particles().len(), crate::config::MAX_PARTICLES);
        assert_eq!(
            engine.grid().map(|g| g.lines().len()),
            Some(2 * crate::decor::MAX_AXIS_STEPS)
        );
    }

    #[test]
    fn zero_grace_completes_immediately() {
        let mut config = EngineConfig::loader();
        config.grace_delay_ms = 0;
        config.progress_rate = 50.0;
        let mut engine = engine(config, 100, 100);
        let fired = counter(&mut engine);
        engine.start().unwrap();

        assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::NextFrame);
        assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::Stop);
        assert_eq!(engine.state(), EngineState::Completed);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn background_keeps_running_past_saturation() {
        let mut config = EngineConfig::background();
        config.progress_rate = 100.0;
        let mut engine = engine(config, 300, 200);
        let fired = counter(&mut engine);
        engine.start().unwrap();
        for _ in 0..5 {
            assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::NextFrame);
        }
        assert_eq!(engine.progress(), 100.0);
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn frame_loop_drives_to_completion() {
        let engine = engine(EngineConfig::loader(), 800, 600);
        let mut lp = FrameLoop::new(engine, ManualHost::new());
        let fired = counter(lp.system_mut());
        lp.start().unwrap();

        lp.run(REFERENCE_FRAME_MS, 2_000).unwrap();
        assert_eq!(fired.get(), 1);
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(lp.system().state(), EngineState::Completed);
        // The first refresh observes no elapsed time
        assert_eq!(lp.system().draw_count(), 335);
        assert_eq!(lp.host().listener_count(), 0);
        assert!(!lp.has_pending_work());
    }

    #[test]
    fn resize_regenerates_for_new_bounds() {
        let mut config = EngineConfig::background();
        config.density = Density::Area {
            pixels_per_particle: 20_000.0,
            max: None,
        };
        let mut engine = engine(config, 800, 600);
        engine.start().unwrap();
        assert_eq!(engine.particles().len(), 24);
        let grid_lines_before = engine.grid().map(|g| g.lines().len());

        engine.on_resize(Viewport::new(1920.0, 1080.0, 1.5));
        assert_eq!(engine.particles().len(), 103);
        assert_eq!(engine.pool_generation(), 2);
        assert_eq!(engine.surface().backing_size(), (2880, 1620));
        assert_ne!(engine.grid().map(|g| g.lines().len()), grid_lines_before);
        for p in engine.particles() {
            assert!(p.position.x >= 0.0 && p.position.x < 1920.0);
            assert!(p.position.y >= 0.0 && p.position.y < 1080.0);
        }
        for s in engine.symbols() {
            assert!(s.position.x < 1920.0 && s.position.y < 1080.0);
        }

        // Same viewport again is not a change
        engine.on_resize(Viewport::new(1920.0, 1080.0, 1.5));
        assert_eq!(engine.pool_generation(), 2);

        engine.on_resize(Viewport::new(0.0, 0.0, 1.0));
        assert!(engine.particles().is_empty());
        assert_eq!(engine.tick(REFERENCE_FRAME_MS).unwrap(), FrameRequest::NextFrame);
    }

    #[test]
    fn particles_stay_in_bounds_under_pointer() {
        let mut loader = EngineConfig::loader();
        loader.completion = false;
        for config in [loader, EngineConfig::background()] {
            let mut engine = engine(config, 640, 480);
            engine.start().unwrap();
            for step in 0..600 {
                let x = (step % 64) as f32 / 64.0;
                engine.on_pointer_move(Pointer::Normalized(Vec2::new(x, 1.0 - x)));
                engine.tick(7.0 + (step % 4) as f64 * 10.0).unwrap();
                let (lo, hi) = (engine.config().alpha_min, engine.config().alpha_max);
                for p in engine.particles() {
                    assert!(p.position.x >= 0.0 && p.position.x < 640.0);
                    assert!(p.position.y >= 0.0 && p.position.y < 480.0);
                    assert!(p.alpha >= lo && p.alpha <= hi);
                }
            }
        }
    }

    #[test]
    fn teardown_stops_all_drawing() {
        let engine = engine(EngineConfig::background(), 400, 300);
        let mut lp = FrameLoop::new(engine, ManualHost::new());
        lp.start().unwrap();
        lp.run(REFERENCE_FRAME_MS, 10).unwrap();

        let drawn = lp.system().draw_count();
        let clears = lp.system().surface().canvas().clear_count();
        assert_eq!(drawn, 10);
        assert_eq!(clears, 10);

        lp.teardown();
        assert_eq!(lp.system().state(), EngineState::TornDown);
        assert!(!lp.has_pending_work());
        assert_eq!(lp.host().listener_count(), 0);

        lp.run(REFERENCE_FRAME_MS, 50).unwrap();
        lp.step(REFERENCE_FRAME_MS).unwrap();
        assert_eq!(lp.system().draw_count(), drawn);
        assert_eq!(lp.system().surface().canvas().clear_count(), clears);
        assert!(lp.system().particles().is_empty());
    }

    #[test]
    fn teardown_during_grace_drops_callback() {
        let mut config = EngineConfig::loader();
        config.progress_rate = 200.0;
        let mut engine = engine(config, 200, 200);
        let fired = counter(&mut engine);
        engine.start().unwrap();
        assert!(matches!(
            engine.tick(REFERENCE_FRAME_MS).unwrap(),
            FrameRequest::Timer { .. }
        ));
        engine.teardown();
        assert_eq!(engine.timer_fired().unwrap(), FrameRequest::Stop);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn lost_surface_tears_down() {
        let engine = engine(EngineConfig::loader(), 400, 300);
        let mut lp = FrameLoop::new(engine, ManualHost::new());
        lp.start().unwrap();
        lp.run(REFERENCE_FRAME_MS, 3).unwrap();

        lp.system_mut().surface_mut().revoke();
        assert!(matches!(
            lp.step(REFERENCE_FRAME_MS),
            Err(EmberError::SurfaceLost)
        ));
        assert_eq!(lp.state(), LoopState::Failed);
        assert_eq!(lp.system().state(), EngineState::TornDown);
        assert!(!lp.has_pending_work());

        let events = lp.system_mut().drain_events();
        assert!(events.contains(&EngineEvent::Error(EmberError::SurfaceLost.to_string())));
        assert_eq!(events.last(), Some(&EngineEvent::TornDown));
    }

    #[test]
    fn theme_rotates_on_frame_time() {
        let mut config = EngineConfig::background();
        config.theme_interval_ms = Some(1_000);
        let mut engine = engine(config, 300, 300);
        engine.start().unwrap();
        engine.drain_events();

        for _ in 0..60 {
            engine.tick(REFERENCE_FRAME_MS).unwrap();
        }
        assert_eq!(engine.theme_index(), 1);
        assert_eq!(engine.theme().name, "amber");
        assert!(engine
            .drain_events()
            .contains(&EngineEvent::ThemeChanged { index: 1 }));
    }

    #[test]
    fn tilt_follows_pointer() {
        let mut engine = engine(EngineConfig::loader(), 800, 600);
        assert_eq!(engine.tilt(), (0.0, 0.0));
        engine.on_pointer_move(Pointer::Normalized(Vec2::new(0.75, 0.25)));
        assert_eq!(engine.tilt(), (-1.25, 1.25));
        engine.on_pointer_move(Pointer::Pixels(Vec2::new(400.0, 300.0)));
        assert_eq!(engine.tilt(), (0.0, 0.0));
    }

    #[test]
    fn glow_only_with_pointer() {
        use ember_render::{DrawCommand, Paint};
        let is_glow = |c: &DrawCommand| {
            matches!(
                c,
                DrawCommand::FillCircle {
                    paint: Paint::RadialGradient { .. },
                    ..
                }
            )
        };

        let mut engine = engine(EngineConfig::background(), 300, 300);
        engine.start().unwrap();
        engine.tick(REFERENCE_FRAME_MS).unwrap();
        assert_eq!(engine.surface().canvas().count(is_glow), 0);

        engine.on_pointer_move(Pointer::Pixels(Vec2::new(150.0, 150.0)));
        engine.tick(REFERENCE_FRAME_MS).unwrap();
        assert_eq!(engine.surface().canvas().count(is_glow), 1);
    }

    #[test]
    fn instances_match_particles() {
        let mut engine = engine(EngineConfig::loader(), 800, 600);
        engine.start().unwrap();
        let count = engine.particles().len();
        let first = engine.particles()[0].clone();
        let instances = engine.instances();
        assert_eq!(instances.len(), count);
        assert_eq!(instances[0].pos_radius_alpha[0], first.position.x);
        assert!((instances[0].color[3] - first.alpha).abs() < 1e-6);
    }
}
