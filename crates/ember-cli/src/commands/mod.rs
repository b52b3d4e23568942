//! CLI command implementations

pub mod config;
pub mod render;
pub mod simulate;

use anyhow::{Context, Result};
use ember_core::{Vec2, Viewport};
use ember_particles::EngineConfig;
use ember_runtime::Pointer;

/// Resolve the engine configuration from a config file or a preset name,
/// then apply a seed override
pub fn load_config(preset: &str, path: Option<&str>, seed: Option<u32>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config '{path}'"))?,
        None => EngineConfig::preset(preset)?,
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

/// Viewport from CLI dimensions, rejecting sizes the engine can't draw into
pub fn viewport(width: f32, height: f32, dpr: f32) -> Result<Viewport> {
    let viewport = Viewport::new(width, height, dpr);
    if viewport.size().is_empty() {
        anyhow::bail!("viewport must be positive, got {width}x{height}");
    }
    Ok(viewport)
}

pub fn pointer(pair: Option<[f32; 2]>) -> Option<Pointer> {
    pair.map(|[x, y]| Pointer::Normalized(Vec2::new(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_overrides_preset() {
        let config = load_config("loader", None, Some(9)).unwrap();
        assert_eq!(config.name, "loader");
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(load_config("fireworks", None, None).is_err());
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = load_config("loader", Some("/nonexistent/ember.toml"), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ember.toml"));
    }

    #[test]
    fn empty_viewport_rejected() {
        assert!(viewport(0.0, 600.0, 1.0).is_err());
        assert_eq!(viewport(800.0, 600.0, 2.0).unwrap().device_pixels(), (1600, 1200));
    }
}
