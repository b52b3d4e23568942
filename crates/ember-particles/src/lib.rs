//! Ember Particles - canvas particle animation engine
//!
//! Drives the loading-screen and ambient-background effects:
//! - Fixed-size particle pool, regenerated whenever the surface is resized
//! - Pointer attraction/repulsion, speed clamp, wrap or reflect at the edges
//! - Lab grid, pulsing symbols, pointer glow, title, progress bar
//! - Time-based progress with a one-shot completion callback
//! - Instance packing for hosts that draw particles on the GPU

pub mod config;
pub mod decor;
pub mod draw;
pub mod engine;
pub mod particle;
pub mod progress;
pub mod rand;
pub mod theme;

pub use config::{
    BoundaryPolicy, Density, EngineConfig, GlowConfig, GridConfig, Palette, PointerForce,
    ProgressBarConfig, SymbolConfig, TitleConfig, MAX_PARTICLES,
};
pub use engine::{Engine, EngineState};
pub use particle::{Particle, ParticleInstance, ParticlePool};
pub use progress::{Progress, LOADING_STAGES};
pub use theme::{Theme, ThemeRotation};
