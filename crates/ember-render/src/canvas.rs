//! The 2D drawing-context contract

use ember_core::{Color, Vec2};

/// Axis-aligned rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// A color stop at `offset` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Fill style for shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Evaluate the paint at a logical-pixel position
    pub fn color_at(&self, p: Vec2) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::LinearGradient { start, end, stops } => {
                let axis = *end - *start;
                let len_sq = axis.x * axis.x + axis.y * axis.y;
                let t = if len_sq > 0.0 {
                    let rel = p - *start;
                    (rel.x * axis.x + rel.y * axis.y) / len_sq
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
            Paint::RadialGradient {
                center,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    p.distance(*center) / radius
                } else {
                    1.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

/// Piecewise-linear lookup, clamped to the first and last stop
fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return Color::TRANSPARENT;
    };
    let t = t.clamp(0.0, 1.0);
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(&b.color, local);
        }
    }
    stops[stops.len() - 1].color
}

/// A 2D drawing context. Coordinates are logical pixels; the canvas maps them to
/// its backing store through the scale set with [`Canvas::set_scale`].
pub trait Canvas {
    /// Resize the backing store in device pixels. Clears contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Backing-store size in device pixels
    fn size(&self) -> (u32, u32);

    /// Logical-to-device scale applied to subsequent commands
    fn set_scale(&mut self, scale: f32);

    /// Replace every pixel with `color`
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32);

    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, color: Color, width: f32);

    /// Bold text centered on `center`, `size` logical pixels tall
    fn fill_text(&mut self, text: &str, center: Vec2, size: f32, color: Color);
}
