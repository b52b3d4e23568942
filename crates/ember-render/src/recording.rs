//! Canvas that records draw commands instead of producing pixels

use crate::canvas::{Canvas, Paint, Rect};
use ember_core::{Color, Vec2};

/// One recorded call on a [`RecordingCanvas`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetScale(f32),
    Clear(Color),
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Color,
    },
    StrokePolyline {
        points: Vec<Vec2>,
        closed: bool,
        color: Color,
        width: f32,
    },
    FillText {
        text: String,
        center: Vec2,
        size: f32,
        color: Color,
    },
}

/// Records every call. Useful for tests and for hosts that replay commands
/// onto a native context (e.g. a browser `CanvasRenderingContext2D`).
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the recorded commands, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of `clear` calls, i.e. frames started
    pub fn clear_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Clear(_)))
    }

    /// Number of recorded commands matching `pred`
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Canvas for RecordingCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_scale(&mut self, scale: f32) {
        self.commands.push(DrawCommand::SetScale(scale));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            paint: paint.clone(),
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            closed,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, center: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            center,
            size,
            color,
        });
    }
}
