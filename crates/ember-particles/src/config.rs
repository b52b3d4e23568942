//! Engine configuration (parsed from TOML) and the two built-in presets

use crate::theme::Theme;
use ember_core::{Color, EmberError, Result, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on the pool size, whatever the density or surface size
pub const MAX_PARTICLES: usize = 10_000;

/// Smallest grid or symbol spacing, in logical pixels
pub const MIN_SPACING: f32 = 1.0;

/// How many particles a surface of a given size gets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Density {
    /// Fixed pool size regardless of surface area
    Count { count: usize },
    /// `floor(width * height / pixels_per_particle)`, optionally capped
    Area {
        pixels_per_particle: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
}

impl Density {
    /// Pool size for a surface in logical pixels, never above [`MAX_PARTICLES`].
    /// Empty surfaces get no particles.
    pub fn particle_count(&self, size: Size) -> usize {
        if size.is_empty() {
            return 0;
        }
        let n = match *self {
            Density::Count { count } => count,
            Density::Area {
                pixels_per_particle,
                max,
            } => {
                let quotient = size.area() / pixels_per_particle;
                let n = if quotient.is_nan() {
                    0
                } else if quotient.is_finite() {
                    quotient.floor().max(0.0) as usize
                } else {
                    MAX_PARTICLES
                };
                max.map_or(n, |cap| n.min(cap))
            }
        };
        n.min(MAX_PARTICLES)
    }
}

/// Direction of the pointer impulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerForce {
    Attract,
    Repel,
}

impl PointerForce {
    pub fn sign(&self) -> f32 {
        match self {
            PointerForce::Attract => 1.0,
            PointerForce::Repel => -1.0,
        }
    }
}

/// What happens when a particle leaves the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Re-enter from the opposite edge
    Wrap,
    /// Bounce off the edge, mirroring the velocity component
    Reflect,
}

/// Where particle colors come from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Palette {
    /// Fixed per particle, hue drawn uniformly from `[hue_min, hue_max)` degrees
    Hue {
        hue_min: f32,
        hue_max: f32,
        saturation: f32,
        lightness: f32,
    },
    /// The active theme's particle color, following theme rotation
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub spacing: f32,
    pub line_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Distance between candidate grid intersections
    pub spacing: f32,
    /// Chance that a given intersection carries a symbol
    pub probability: f32,
    /// Pulse change per reference frame
    pub pulse_rate: f32,
    /// Rotation in radians per reference frame
    pub spin_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowConfig {
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarConfig {
    pub width: f32,
    pub height: f32,
    /// Vertical offset of the bar's top edge from the surface center
    pub offset_y: f32,
    pub track: Color,
    pub fill_start: Color,
    pub fill_end: Color,
}

/// Caption centered on the surface, drawn over the particles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleConfig {
    pub text: String,
    /// Font size in logical pixels
    pub size: f32,
    pub color: Color,
}

/// Config keys whose absence turns the feature off
const OPTIONAL_SECTIONS: [&str; 7] = [
    "grid",
    "symbols",
    "glow",
    "title",
    "progress_bar",
    "theme_interval_ms",
    "seed",
];

/// Everything an engine instance needs to know up front.
///
/// Per-frame rates (`force_strength`, `fade_rate`, `progress_rate`, velocities)
/// are expressed per reference frame of 16.67 ms and scaled by the real delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    pub density: Density,
    pub interaction_radius: f32,
    pub pointer_force: PointerForce,
    /// Velocity impulse per reference frame for a particle sitting on the pointer
    pub force_strength: f32,
    pub max_speed: f32,
    /// Initial velocity components are drawn from `[-initial_speed, initial_speed)`
    pub initial_speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub alpha_min: f32,
    pub alpha_max: f32,
    pub fade_rate: f32,
    pub boundary: BoundaryPolicy,
    pub palette: Palette,
    /// Fire the completion callback once progress reaches 100
    pub completion: bool,
    pub grace_delay_ms: u64,
    pub progress_rate: f64,
    pub grid: Option<GridConfig>,
    pub symbols: Option<SymbolConfig>,
    pub glow: Option<GlowConfig>,
    pub title: Option<TitleConfig>,
    pub progress_bar: Option<ProgressBarConfig>,
    pub theme_interval_ms: Option<u64>,
    pub themes: Vec<Theme>,
    pub seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::background()
    }
}

impl EngineConfig {
    /// Loading-screen particles: attracted to the pointer, wrapping at the edges,
    /// with a progress bar and a completion callback.
    pub fn loader() -> Self {
        Self {
            name: "loader".into(),
            density: Density::Area {
                pixels_per_particle: 20_000.0,
                max: Some(200),
            },
            interaction_radius: 100.0,
            pointer_force: PointerForce::Attract,
            force_strength: 0.2,
            max_speed: 4.0,
            initial_speed: 1.0,
            radius_min: 1.0,
            radius_max: 4.0,
            alpha_min: 0.6,
            alpha_max: 1.0,
            fade_rate: 0.0333,
            boundary: BoundaryPolicy::Wrap,
            palette: Palette::Hue {
                hue_min: 180.0,
                hue_max: 240.0,
                saturation: 1.0,
                lightness: 0.5,
            },
            completion: true,
            grace_delay_ms: 500,
            progress_rate: 0.3,
            grid: None,
            symbols: None,
            glow: None,
            title: Some(TitleConfig {
                text: "PORTFOLIO".into(),
                size: 48.0,
                color: Color::WHITE,
            }),
            progress_bar: Some(ProgressBarConfig {
                width: 300.0,
                height: 5.0,
                offset_y: 40.0,
                track: Color::from_rgba8(200, 200, 200, 0.3),
                fill_start: Color::from_rgba8(120, 200, 255, 0.8),
                fill_end: Color::from_rgba8(80, 160, 255, 0.8),
            }),
            theme_interval_ms: None,
            themes: vec![Theme::loader()],
            seed: None,
        }
    }

    /// Ambient background: repelled by the pointer, bouncing off the edges,
    /// over a lab grid with pulsing symbols and a rotating theme.
    pub fn background() -> Self {
        Self {
            name: "background".into(),
            density: Density::Area {
                pixels_per_particle: 20_000.0,
                max: None,
            },
            interaction_radius: 100.0,
            pointer_force: PointerForce::Repel,
            force_strength: 0.3334,
            max_speed: 0.8,
            initial_speed: 0.15,
            radius_min: 0.5,
            radius_max: 2.0,
            alpha_min: 0.3,
            alpha_max: 1.0,
            fade_rate: 0.0333,
            boundary: BoundaryPolicy::Reflect,
            palette: Palette::Theme,
            completion: false,
            grace_delay_ms: 0,
            progress_rate: 0.3,
            grid: Some(GridConfig {
                spacing: 30.0,
                line_width: 1.0,
            }),
            symbols: Some(SymbolConfig {
                spacing: 60.0,
                probability: 0.03,
                pulse_rate: 0.008_335,
                spin_rate: 0.003_334,
            }),
            glow: Some(GlowConfig { radius: 130.0 }),
            title: None,
            progress_bar: None,
            theme_interval_ms: Some(30_000),
            themes: Theme::lab_palettes(),
            seed: None,
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "loader" => Ok(Self::loader()),
            "background" => Ok(Self::background()),
            other => Err(EmberError::InvalidConfig(format!(
                "unknown preset '{other}'; valid presets: loader, background"
            ))),
        }
    }

    /// Parse a TOML document. An optional top-level `preset` key picks the base
    /// configuration (default `background`); every other key overrides it.
    /// `disable = ["grid", "glow"]` switches off optional sections of the preset.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut overrides: toml::Table = toml::from_str(source)?;
        let disabled = match overrides.remove("disable") {
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    EmberError::InvalidConfig("disable must be a list of section names".into())
                })?,
            Some(_) => {
                return Err(EmberError::InvalidConfig(
                    "disable must be a list of section names".into(),
                ))
            }
            None => Vec::new(),
        };
        let base_name = match overrides.remove("preset") {
            Some(toml::Value::String(name)) => name,
            Some(other) => {
                return Err(EmberError::InvalidConfig(format!(
                    "preset must be a string, got {}",
                    other.type_str()
                )))
            }
            None => "background".to_string(),
        };

        let base = Self::preset(&base_name)?;
        let mut merged = match toml::Value::try_from(&base)? {
            toml::Value::Table(table) => table,
            _ => return Err(EmberError::TomlSerError("config is not a table".into())),
        };
        for section in &disabled {
            if !OPTIONAL_SECTIONS.contains(&section.as_str()) {
                return Err(EmberError::InvalidConfig(format!(
                    "cannot disable '{section}'; optional sections: {}",
                    OPTIONAL_SECTIONS.join(", ")
                )));
            }
            merged.remove(section);
        }
        for (key, value) in overrides {
            merged.insert(key, value);
        }

        let config: Self = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Serialize as a document that parses back to exactly this config.
    /// Sections that are off are listed under `disable` so no preset fills them in.
    pub fn to_toml_string(&self) -> Result<String> {
        let mut table = match toml::Value::try_from(self)? {
            toml::Value::Table(table) => table,
            _ => return Err(EmberError::TomlSerError("config is not a table".into())),
        };
        let missing: Vec<toml::Value> = OPTIONAL_SECTIONS
            .iter()
            .filter(|key| !table.contains_key(**key))
            .map(|key| toml::Value::String(key.to_string()))
            .collect();
        if !missing.is_empty() {
            table.insert("disable".into(), toml::Value::Array(missing));
        }
        Ok(toml::to_string_pretty(&table)?)
    }

    /// Reject values the physics or rendering can't work with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(EmberError::InvalidConfig(msg));

        match self.density {
            Density::Count { count } if count > MAX_PARTICLES => {
                return fail(format!(
                    "density.count must be at most {MAX_PARTICLES}, got {count}"
                ));
            }
            Density::Area {
                pixels_per_particle,
                ..
            } if !(pixels_per_particle > 0.0) => {
                return fail(format!(
                    "density.pixels_per_particle must be positive, got {pixels_per_particle}"
                ));
            }
            _ => {}
        }
        if !(self.interaction_radius > 0.0) {
            return fail(format!(
                "interaction_radius must be positive, got {}",
                self.interaction_radius
            ));
        }
        if !(self.max_speed > 0.0) {
            return fail(format!("max_speed must be positive, got {}", self.max_speed));
        }
        if !self.force_strength.is_finite() || !self.initial_speed.is_finite() {
            return fail("force_strength and initial_speed must be finite".into());
        }
        if !(self.radius_min > 0.0) || !(self.radius_min <= self.radius_max) {
            return fail(format!(
                "radius band must satisfy 0 < min <= max, got [{}, {}]",
                self.radius_min, self.radius_max
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha_min)
            || !(0.0..=1.0).contains(&self.alpha_max)
            || self.alpha_min > self.alpha_max
        {
            return fail(format!(
                "alpha band must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                self.alpha_min, self.alpha_max
            ));
        }
        if !(self.fade_rate >= 0.0) {
            return fail(format!("fade_rate must be non-negative, got {}", self.fade_rate));
        }
        if !(self.progress_rate >= 0.0) {
            return fail(format!(
                "progress_rate must be non-negative, got {}",
                self.progress_rate
            ));
        }
        if let Some(grid) = &self.grid {
            if !(grid.spacing >= MIN_SPACING) || !grid.spacing.is_finite() {
                return fail(format!(
                    "grid.spacing must be a finite value of at least {MIN_SPACING}, got {}",
                    grid.spacing
                ));
            }
        }
        if let Some(symbols) = &self.symbols {
            if !(symbols.spacing >= MIN_SPACING) || !symbols.spacing.is_finite() {
                return fail(format!(
                    "symbols.spacing must be a finite value of at least {MIN_SPACING}, got {}",
                    symbols.spacing
                ));
            }
            if !(0.0..=1.0).contains(&symbols.probability) {
                return fail(format!(
                    "symbols.probability must be within [0, 1], got {}",
                    symbols.probability
                ));
            }
        }
        if let Some(title) = &self.title {
            if !(title.size > 0.0) || !title.size.is_finite() {
                return fail(format!("title.size must be positive, got {}", title.size));
            }
        }
        if self.themes.is_empty() {
            return fail("themes must not be empty".into());
        }
        Ok(())
    }
}
