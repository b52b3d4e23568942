//! Color themes and timed round-robin rotation

use ember_core::Color;
use serde::{Deserialize, Serialize};

/// Colors used by one frame's draw step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub grid: Color,
    pub accent: Color,
    pub particles: Color,
    pub glow: Color,
    /// Grid line opacity for the brighter half of the lines
    pub pattern_opacity: f32,
}

impl Theme {
    /// The four lab palettes: cyan, amber, magenta, blue
    pub fn lab_palettes() -> Vec<Theme> {
        vec![
            Theme {
                name: "cyan".into(),
                background: Color::from_rgba8(10, 10, 31, 1.0),
                grid: Color::from_rgba8(0, 255, 170, 0.2),
                accent: Color::from_rgba8(0, 255, 255, 0.6),
                particles: Color::from_rgba8(0, 255, 255, 0.8),
                glow: Color::from_rgba8(0, 255, 255, 1.0),
                pattern_opacity: 0.12,
            },
            Theme {
                name: "amber".into(),
                background: Color::from_rgba8(15, 27, 43, 1.0),
                grid: Color::from_rgba8(255, 140, 0, 0.15),
                accent: Color::from_rgba8(255, 200, 0, 0.5),
                particles: Color::from_rgba8(255, 200, 0, 0.7),
                glow: Color::from_rgba8(255, 200, 0, 1.0),
                pattern_opacity: 0.1,
            },
            Theme {
                name: "magenta".into(),
                background: Color::from_rgba8(26, 10, 32, 1.0),
                grid: Color::from_rgba8(200, 0, 255, 0.15),
                accent: Color::from_rgba8(255, 0, 200, 0.5),
                particles: Color::from_rgba8(255, 0, 200, 0.7),
                glow: Color::from_rgba8(255, 0, 200, 1.0),
                pattern_opacity: 0.1,
            },
            Theme {
                name: "blue".into(),
                background: Color::from_rgba8(5, 15, 25, 1.0),
                grid: Color::from_rgba8(0, 100, 255, 0.15),
                accent: Color::from_rgba8(0, 150, 255, 0.5),
                particles: Color::from_rgba8(0, 150, 255, 0.7),
                glow: Color::from_rgba8(0, 150, 255, 1.0),
                pattern_opacity: 0.12,
            },
        ]
    }

    /// Near-black backdrop of the loading screen
    pub fn loader() -> Theme {
        Theme {
            name: "loader".into(),
            background: Color::from_hex(0x0a0a0a),
            grid: Color::TRANSPARENT,
            accent: Color::WHITE,
            particles: Color::WHITE,
            glow: Color::WHITE,
            pattern_opacity: 0.0,
        }
    }
}

/// Round-robin over a fixed palette list, advanced by elapsed time
#[derive(Debug, Clone)]
pub struct ThemeRotation {
    themes: Vec<Theme>,
    index: usize,
    interval_ms: Option<u64>,
    elapsed_ms: f64,
}

impl ThemeRotation {
    /// `themes` must be non-empty; config validation guarantees it
    pub fn new(themes: Vec<Theme>, interval_ms: Option<u64>) -> Self {
        let themes = if themes.is_empty() {
            vec![Theme::loader()]
        } else {
            themes
        };
        Self {
            themes,
            index: 0,
            interval_ms: interval_ms.filter(|ms| *ms > 0),
            elapsed_ms: 0.0,
        }
    }

    pub fn current(&self) -> &Theme {
        &self.themes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Accumulate time. Returns the new index if at least one interval elapsed.
    pub fn advance(&mut self, delta_ms: f64) -> Option<usize> {
        let interval = self.interval_ms? as f64;
        self.elapsed_ms += delta_ms.max(0.0);
        if self.elapsed_ms < interval {
            return None;
        }
        let turns = (self.elapsed_ms / interval).floor();
        self.elapsed_ms -= turns * interval;
        self.index = (self.index + turns as usize) % self.themes.len();
        Some(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_palettes_match_css() {
        let themes = Theme::lab_palettes();
        assert_eq!(themes.len(), 4);
        assert_eq!(themes[0].background.to_rgba8(), [10, 10, 31, 255]);
        assert_eq!(themes[1].particles.to_rgba8()[..3], [255, 200, 0]);
    }

    #[test]
    fn rotates_every_interval() {
        let mut rot = ThemeRotation::new(Theme::lab_palettes(), Some(30_000));
        assert_eq!(rot.index(), 0);
        assert_eq!(rot.advance(29_999.0), None);
        assert_eq!(rot.advance(1.0), Some(1));
        assert_eq!(rot.advance(30_000.0), Some(2));
        assert_eq!(rot.advance(30_000.0), Some(3));
        assert_eq!(rot.advance(30_000.0), Some(0));
        assert_eq!(rot.current().name, "cyan");
    }

    #[test]
    fn long_gap_skips_multiple() {
        let mut rot = ThemeRotation::new(Theme::lab_palettes(), Some(1_000));
        assert_eq!(rot.advance(2_500.0), Some(2));
        assert_eq!(rot.advance(499.0), None);
        assert_eq!(rot.advance(1.0), Some(3));
    }

    #[test]
    fn no_interval_never_rotates() {
        let mut rot = ThemeRotation::new(Theme::lab_palettes(), None);
        assert_eq!(rot.advance(1e9), None);
        assert_eq!(rot.index(), 0);

        let mut zero = ThemeRotation::new(Theme::lab_palettes(), Some(0));
        assert_eq!(zero.advance(1e9), None);
    }
}
