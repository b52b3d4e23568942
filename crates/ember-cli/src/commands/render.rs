//! Headless frames-to-PNG render command

use anyhow::{Context, Result};
use ember_particles::Engine;
use ember_render::{HeadlessSurface, RasterCanvas};
use ember_runtime::{FrameLoop, ManualHost};

pub struct RenderArgs {
    pub preset: String,
    pub config: Option<String>,
    pub output: String,
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
    pub frames: usize,
    pub frame_ms: f64,
    pub pointer: Option<[f32; 2]>,
    pub seed: Option<u32>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = super::load_config(&args.preset, args.config.as_deref(), args.seed)?;
    let viewport = super::viewport(args.width, args.height, args.dpr)?;
    println!("Configuration: {}", config.name);

    let (width, height) = viewport.device_pixels();
    let surface = HeadlessSurface::new(RasterCanvas::new(width, height));
    let mut engine = Engine::new(surface, config).context("Invalid engine configuration")?;
    engine.on_resize(viewport);
    if let Some(pointer) = super::pointer(args.pointer) {
        engine.on_pointer_move(pointer);
    }

    let mut frame_loop = FrameLoop::new(engine, ManualHost::new());
    frame_loop.start().context("Failed to start engine")?;
    let steps = frame_loop
        .run(args.frame_ms, args.frames)
        .context("Frame failed")?;

    let engine = frame_loop.system();
    println!(
        "Particles: {} | frames drawn: {} | progress: {:.1}%",
        engine.particles().len(),
        engine.draw_count(),
        engine.progress()
    );
    if steps < args.frames {
        println!("Engine stopped after {steps} steps ({:?})", engine.state());
    }

    engine
        .surface()
        .canvas()
        .save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output))?;

    println!("Rendered {}x{} to {}", width, height, args.output);
    Ok(())
}
