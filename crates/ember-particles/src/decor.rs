//! Position-dependent decorations: the lab grid and its symbol markers.
//! Both are rebuilt from scratch whenever the surface size changes.

use crate::config::{GridConfig, SymbolConfig};
use crate::rand::ParticleRng;
use ember_core::{Size, Vec2};
use std::f32::consts::{FRAC_PI_3, TAU};

/// Brightness of the dimmer half of the grid lines, relative to the theme's pattern opacity
pub const GRID_DIM_FACTOR: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Vec2,
    pub to: Vec2,
    /// Even lines are drawn at full pattern opacity
    pub index: usize,
}

impl GridLine {
    pub fn opacity(&self, pattern_opacity: f32) -> f32 {
        if self.index % 2 == 0 {
            pattern_opacity
        } else {
            pattern_opacity * GRID_DIM_FACTOR
        }
    }
}

/// Horizontal and vertical lines at a fixed spacing, starting at the origin
#[derive(Debug, Clone, Default)]
pub struct Grid {
    lines: Vec<GridLine>,
    line_width: f32,
}

impl Grid {
    pub fn build(bounds: Size, config: &GridConfig) -> Self {
        let mut lines = Vec::new();
        if !bounds.is_empty() && config.spacing > 0.0 {
            for (index, y) in steps(0.0, bounds.height, config.spacing).enumerate() {
                lines.push(GridLine {
                    from: Vec2::new(0.0, y),
                    to: Vec2::new(bounds.width, y),
                    index,
                });
            }
            for (index, x) in steps(0.0, bounds.width, config.spacing).enumerate() {
                lines.push(GridLine {
                    from: Vec2::new(x, 0.0),
                    to: Vec2::new(x, bounds.height),
                    index,
                });
            }
        }
        Self {
            lines,
            line_width: config.line_width,
        }
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }
}

/// Most grid lines or symbol candidates laid out along one axis
pub const MAX_AXIS_STEPS: usize = 2048;

/// `start, start + step, ...` while below `end`, at most [`MAX_AXIS_STEPS`] values
fn steps(start: f32, end: f32, step: f32) -> impl Iterator<Item = f32> {
    (0..MAX_AXIS_STEPS)
        .map(move |i| start + i as f32 * step)
        .take_while(move |v| *v < end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Circle,
    Cross,
    Triangle,
    Diamond,
    Square,
    Hexagon,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 6] = [
        SymbolKind::Circle,
        SymbolKind::Cross,
        SymbolKind::Triangle,
        SymbolKind::Diamond,
        SymbolKind::Square,
        SymbolKind::Hexagon,
    ];

    /// Whether the shape gets the translucent fill as well as the outline
    pub fn is_filled(&self) -> bool {
        !matches!(self, SymbolKind::Cross)
    }
}

/// Geometry of a placed symbol in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolShape {
    Circle { center: Vec2, radius: f32 },
    Segments(Vec<(Vec2, Vec2)>),
    Polygon(Vec<Vec2>),
}

/// A marker sitting on a grid intersection, spinning and pulsing on its own clock
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
    /// In `[0, 1]`
    pub pulse: f32,
    pub pulse_rising: bool,
}

impl Symbol {
    pub fn advance(&mut self, config: &SymbolConfig, frames: f32) {
        let step = config.pulse_rate * frames;
        if self.pulse_rising {
            self.pulse += step;
            if self.pulse >= 1.0 {
                self.pulse = 1.0;
                self.pulse_rising = false;
            }
        } else {
            self.pulse -= step;
            if self.pulse <= 0.0 {
                self.pulse = 0.0;
                self.pulse_rising = true;
            }
        }
        self.rotation = (self.rotation + config.spin_rate * frames).rem_euclid(TAU);
    }

    /// Outline alpha for the current pulse
    pub fn stroke_alpha(&self) -> f32 {
        0.6 + 0.4 * self.pulse
    }

    pub fn shape(&self) -> SymbolShape {
        let place = |x: f32, y: f32| {
            self.position + (Vec2::new(x, y) * self.scale).rotated(self.rotation)
        };
        match self.kind {
            SymbolKind::Circle => SymbolShape::Circle {
                center: self.position,
                radius: 12.0 * self.scale,
            },
            SymbolKind::Cross => SymbolShape::Segments(vec![
                (place(-8.0, -8.0), place(8.0, 8.0)),
                (place(8.0, -8.0), place(-8.0, 8.0)),
            ]),
            SymbolKind::Triangle => {
                SymbolShape::Polygon(vec![place(0.0, -10.0), place(10.0, 8.0), place(-10.0, 8.0)])
            }
            SymbolKind::Diamond => SymbolShape::Polygon(vec![
                place(0.0, -10.0),
                place(10.0, 0.0),
                place(0.0, 10.0),
                place(-10.0, 0.0),
            ]),
            SymbolKind::Square => SymbolShape::Polygon(vec![
                place(-8.0, -8.0),
                place(8.0, -8.0),
                place(8.0, 8.0),
                place(-8.0, 8.0),
            ]),
            SymbolKind::Hexagon => SymbolShape::Polygon(
                (0..6)
                    .map(|i| {
                        let corner = Vec2::from_angle(FRAC_PI_3 * i as f32) * 10.0;
                        place(corner.x, corner.y)
                    })
                    .collect(),
            ),
        }
    }
}

/// Place symbols on interior intersections of a coarse grid, each with probability
/// `config.probability`
pub fn scatter_symbols(bounds: Size, config: &SymbolConfig, rng: &mut ParticleRng) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    if bounds.is_empty() || config.spacing <= 0.0 {
        return symbols;
    }
    for x in steps(config.spacing, bounds.width, config.spacing) {
        for y in steps(config.spacing, bounds.height, config.spacing) {
            if !rng.chance(config.probability) {
                continue;
            }
            symbols.push(Symbol {
                kind: SymbolKind::ALL[rng.index(SymbolKind::ALL.len())],
                position: Vec2::new(x, y),
                rotation: rng.range(0.0, TAU),
                scale: rng.range(0.7, 1.3),
                pulse: rng.next_f32(),
                pulse_rising: rng.chance(0.5),
            });
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol_config(probability: f32) -> SymbolConfig {
        SymbolConfig {
            spacing: 60.0,
            probability,
            pulse_rate: 0.008_335,
            spin_rate: 0.003_334,
        }
    }

    #[test]
    fn grid_covers_surface() {
        let grid = Grid::build(
            Size::new(90.0, 60.0),
            &GridConfig {
                spacing: 30.0,
                line_width: 1.0,
            },
        );
        // y = 0, 30 and x = 0, 30, 60
        assert_eq!(grid.lines().len(), 5);
        assert_eq!(grid.lines()[0].to, Vec2::new(90.0, 0.0));
        assert_eq!(grid.lines()[4].from, Vec2::new(60.0, 0.0));
    }

    #[test]
    fn huge_surface_caps_decorations() {
        let bounds = Size::new(1e20, 1e20);
        let grid = Grid::build(
            bounds,
            &GridConfig {
                spacing: 30.0,
                line_width: 1.0,
            },
        );
        assert_eq!(grid.lines().len(), 2 * MAX_AXIS_STEPS);

        let mut rng = ParticleRng::new(3);
        let symbols = scatter_symbols(bounds, &symbol_config(0.0), &mut rng);
        assert!(symbols.is_empty());
    }

    #[test]
    fn grid_alternates_opacity() {
        let grid = Grid::build(
            Size::new(120.0, 120.0),
            &GridConfig {
                spacing: 30.0,
                line_width: 1.0,
            },
        );
        let opacities: Vec<f32> = grid.lines()[..3].iter().map(|l| l.opacity(0.1)).collect();
        assert_eq!(opacities[0], 0.1);
        assert!((opacities[1] - 0.07).abs() < 1e-6);
        assert_eq!(opacities[2], 0.1);
    }

    #[test]
    fn empty_surface_has_no_decorations() {
        let grid = Grid::build(
            Size::new(0.0, 100.0),
            &GridConfig {
                spacing: 30.0,
                line_width: 1.0,
            },
        );
        assert!(grid.lines().is_empty());

        let mut rng = ParticleRng::new(1);
        assert!(scatter_symbols(Size::new(100.0, 0.0), &symbol_config(1.0), &mut rng).is_empty());
    }

    #[test]
    fn symbols_sit_on_interior_intersections() {
        let mut rng = ParticleRng::new(3);
        let symbols = scatter_symbols(Size::new(250.0, 130.0), &symbol_config(1.0), &mut rng);
        // x in {60, 120, 180, 240}, y in {60, 120}
        assert_eq!(symbols.len(), 8);
        for s in &symbols {
            assert_eq!(s.position.x % 60.0, 0.0);
            assert_eq!(s.position.y % 60.0, 0.0);
            assert!((0.7..=1.3).contains(&s.scale));
            assert!((0.0..1.0).contains(&s.pulse));
        }

        let none = scatter_symbols(Size::new(250.0, 130.0), &symbol_config(0.0), &mut rng);
        assert!(none.is_empty());
    }

    #[test]
    fn symbol_pulse_stays_in_unit_band() {
        let config = symbol_config(1.0);
        let mut symbol = Symbol {
            kind: SymbolKind::Hexagon,
            position: Vec2::new(60.0, 60.0),
            rotation: 0.0,
            scale: 1.0,
            pulse: 0.99,
            pulse_rising: true,
        };
        symbol.advance(&config, 3.0);
        assert_eq!(symbol.pulse, 1.0);
        assert!(!symbol.pulse_rising);
        assert!((symbol.rotation - 0.010_002).abs() < 1e-6);

        for _ in 0..1_000 {
            symbol.advance(&config, 2.5);
            assert!((0.0..=1.0).contains(&symbol.pulse));
            assert!((0.6..=1.0).contains(&symbol.stroke_alpha()));
        }
    }

    #[test]
    fn shapes_follow_transform() {
        let symbol = Symbol {
            kind: SymbolKind::Square,
            position: Vec2::new(100.0, 100.0),
            rotation: 0.0,
            scale: 0.5,
            pulse: 0.0,
            pulse_rising: true,
        };
        match symbol.shape() {
            SymbolShape::Polygon(points) => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[0], Vec2::new(96.0, 96.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }

        let hex = Symbol {
            kind: SymbolKind::Hexagon,
            ..symbol.clone()
        };
        match hex.shape() {
            SymbolShape::Polygon(points) => assert_eq!(points.len(), 6),
            other => panic!("unexpected shape {other:?}"),
        }
        assert!(!SymbolKind::Cross.is_filled());
        assert!(matches!(
            Symbol {
                kind: SymbolKind::Cross,
                ..symbol
            }
            .shape(),
            SymbolShape::Segments(ref s) if s.len() == 2
        ));
    }
}
