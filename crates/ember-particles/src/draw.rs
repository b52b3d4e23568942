//! Composes one frame onto a canvas, back to front

use crate::config::{GlowConfig, Palette, ProgressBarConfig, TitleConfig};
use crate::decor::{Grid, Symbol, SymbolShape};
use crate::particle::Particle;
use crate::progress::PROGRESS_MAX;
use crate::theme::Theme;
use ember_core::{Color, Size, Vec2};
use ember_render::{Canvas, GradientStop, Paint, Rect};

/// Fill alpha of the symbol interiors
const SYMBOL_FILL_ALPHA: f32 = 0.1;
const SYMBOL_LINE_WIDTH: f32 = 1.0;

/// Everything the draw step reads. Built fresh each frame from engine state.
pub struct FrameScene<'a> {
    pub bounds: Size,
    pub theme: &'a Theme,
    pub palette: Palette,
    pub grid: Option<&'a Grid>,
    pub symbols: &'a [Symbol],
    /// Pointer position in logical pixels plus glow settings
    pub glow: Option<(Vec2, &'a GlowConfig)>,
    pub particles: &'a [Particle],
    pub title: Option<&'a TitleConfig>,
    /// Current progress plus bar settings
    pub progress_bar: Option<(f64, &'a ProgressBarConfig)>,
}

/// Opaque particle color before the pulse alpha is applied
pub fn particle_base_color(palette: Palette, theme: &Theme, particle: &Particle) -> Color {
    match palette {
        Palette::Hue { .. } => particle.color.with_alpha(1.0),
        Palette::Theme => theme.particles.with_alpha(1.0),
    }
}

/// The three-stop radial falloff around the pointer
pub fn glow_paint(center: Vec2, radius: f32, color: Color) -> Paint {
    Paint::RadialGradient {
        center,
        radius,
        stops: vec![
            GradientStop::new(0.0, color.with_alpha(0.15)),
            GradientStop::new(0.6, color.with_alpha(0.05)),
            GradientStop::new(1.0, color.with_alpha(0.0)),
        ],
    }
}

/// Track and fill rectangles of the progress bar, in logical pixels
pub fn progress_bar_rects(bounds: Size, progress: f64, bar: &ProgressBarConfig) -> (Rect, Rect) {
    let center = bounds.center();
    let x = center.x - bar.width / 2.0;
    let y = center.y + bar.offset_y;
    let fraction = (progress / PROGRESS_MAX).clamp(0.0, 1.0) as f32;
    (
        Rect::new(x, y, bar.width, bar.height),
        Rect::new(x, y, bar.width * fraction, bar.height),
    )
}

pub fn compose<C: Canvas + ?Sized>(canvas: &mut C, scene: &FrameScene<'_>) {
    let theme = scene.theme;
    canvas.clear(theme.background);

    if let Some(grid) = scene.grid {
        for line in grid.lines() {
            let color = theme.grid.with_alpha(line.opacity(theme.pattern_opacity));
            canvas.stroke_line(line.from, line.to, color, grid.line_width());
        }
    }

    let fill = theme.accent.with_alpha(SYMBOL_FILL_ALPHA);
    for symbol in scene.symbols {
        draw_symbol(canvas, symbol, theme.accent.with_alpha(symbol.stroke_alpha()), fill);
    }

    if let Some((pointer, glow)) = scene.glow {
        canvas.fill_circle(pointer, glow.radius, &glow_paint(pointer, glow.radius, theme.glow));
    }

    for p in scene.particles {
        let color = particle_base_color(scene.palette, theme, p).with_alpha(p.alpha);
        canvas.fill_circle(p.position, p.radius, &Paint::Solid(color));
    }

    if let Some(title) = scene.title {
        canvas.fill_text(&title.text, scene.bounds.center(), title.size, title.color);
    }

    if let Some((progress, bar)) = scene.progress_bar {
        let (track, filled) = progress_bar_rects(scene.bounds, progress, bar);
        canvas.fill_rect(track, &Paint::Solid(bar.track));
        if filled.width > 0.0 {
            // The gradient spans the whole track so the fill reveals it left to right
            let paint = Paint::LinearGradient {
                start: Vec2::new(track.x, track.y),
                end: Vec2::new(track.x + track.width, track.y),
                stops: vec![
                    GradientStop::new(0.0, bar.fill_start),
                    GradientStop::new(1.0, bar.fill_end),
                ],
            };
            canvas.fill_rect(filled, &paint);
        }
    }
}

fn draw_symbol<C: Canvas + ?Sized>(canvas: &mut C, symbol: &Symbol, stroke: Color, fill: Color) {
    match symbol.shape() {
        SymbolShape::Circle { center, radius } => {
            canvas.fill_circle(center, radius, &Paint::Solid(fill));
            canvas.stroke_circle(center, radius, stroke, SYMBOL_LINE_WIDTH);
        }
        SymbolShape::Segments(segments) => {
            for (from, to) in segments {
                canvas.stroke_line(from, to, stroke, SYMBOL_LINE_WIDTH);
            }
        }
        SymbolShape::Polygon(points) => {
            canvas.fill_polygon(&points, fill);
            canvas.stroke_polyline(&points, true, stroke, SYMBOL_LINE_WIDTH);
        }
    }
}
