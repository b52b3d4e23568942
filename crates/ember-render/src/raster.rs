//! Software rasterizer into an RGBA image

use crate::canvas::{Canvas, Paint, Rect};
use crate::error::RenderError;
use ember_core::{Color, Vec2};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// CPU canvas backed by an `image::RgbaImage`.
///
/// Shapes are sampled at pixel centers with a one-pixel coverage ramp on circle
/// edges. Good enough for previews and golden-image checks, not for print.
pub struct RasterCanvas {
    image: RgbaImage,
    scale: f32,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            scale: 1.0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Encode as PNG (format picked from the extension)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyCanvas { width, height });
        }
        self.image.save(path.as_ref())?;
        log::debug!("wrote {}x{} image to {}", width, height, path.as_ref().display());
        Ok(())
    }

    fn to_device(&self, p: Vec2) -> Vec2 {
        p * self.scale
    }

    fn to_logical(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new((x as f32 + 0.5) / self.scale, (y as f32 + 0.5) / self.scale)
    }

    /// Clip a device-space box to pixel index ranges
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || !min.is_finite() || !max.is_finite() {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    /// Source-over composite of `color` scaled by `coverage`
    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
        let out_a = alpha + da * (1.0 - alpha);
        let mix = |s: f32, d: f32| {
            if out_a > 0.0 {
                (s * alpha + d * da * (1.0 - alpha)) / out_a
            } else {
                0.0
            }
        };
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        *dst = Rgba([
            q(mix(color.r, dr)),
            q(mix(color.g, dg)),
            q(mix(color.b, db)),
            q(out_a),
        ]);
    }

    fn plot_square(&mut self, center: Vec2, size: f32, color: Color) {
        let half = (size * 0.5).max(0.5);
        let min = Vec2::new(center.x - half, center.y - half);
        let max = Vec2::new(center.x + half, center.y + half);
        if let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    fn clear(&mut self, color: Color) {
        let px = Rgba(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let min = self.to_device(Vec2::new(rect.x, rect.y));
        let max = self.to_device(Vec2::new(rect.x + rect.width, rect.y + rect.height));
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = self.to_logical(x, y);
                if rect.contains(p) {
                    let color = paint.color_at(p);
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        let a = self.to_device(from);
        let b = self.to_device(to);
        let brush = (width * self.scale).max(1.0);
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let steps = steps.max(1.0) as u32;
        let mut last: Option<(i64, i64)> = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = a + delta * t;
            let key = (p.x.floor() as i64, p.y.floor() as i64);
            if last == Some(key) {
                continue;
            }
            last = Some(key);
            self.plot_square(
                Vec2::new(key.0 as f32 + 0.5, key.1 as f32 + 0.5),
                brush,
                color,
            );
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        let c = self.to_device(center);
        let r = radius * self.scale;
        if r <= 0.0 {
            return;
        }
        let min = Vec2::new(c.x - r - 1.0, c.y - r - 1.0);
        let max = Vec2::new(c.x + r + 1.0, c.y + r + 1.0);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let coverage = (r - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let color = paint.color_at(self.to_logical(x, y));
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        let c = self.to_device(center);
        let r = radius * self.scale;
        let half = (width * self.scale).max(1.0) * 0.5;
        let min = Vec2::new(c.x - r - half - 1.0, c.y - r - half - 1.0);
        let max = Vec2::new(c.x + r + half + 1.0, c.y + r + half + 1.0);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let coverage = (half - (d - r).abs() + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let device: Vec<Vec2> = points.iter().map(|p| self.to_device(*p)).collect();
        let (mut min, mut max) = (device[0], device[0]);
        for p in &device {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                if point_in_polygon(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), &device) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, color: Color, width: f32) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], color, width);
        }
        if closed && points.len() > 2 {
            self.stroke_line(points[points.len() - 1], points[0], color, width);
        }
    }

    /// No font rasterizer here; text is left to hosts with a native context
    fn fill_text(&mut self, _text: &str, _center: Vec2, _size: f32, _color: Color) {}
}

/// Even-odd crossing test
fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
