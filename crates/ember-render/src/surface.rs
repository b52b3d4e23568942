//! Drawing surfaces and 2D context acquisition

use crate::canvas::Canvas;

/// Something that can hand out a 2D drawing context, like an HTML canvas element
pub trait Surface {
    type Canvas: Canvas;

    /// Acquire the 2D context. `None` means this environment cannot draw.
    fn context_2d(&mut self) -> Option<&mut Self::Canvas>;

    /// Resize the backing store in device pixels
    fn set_backing_size(&mut self, width: u32, height: u32);

    /// Backing-store size in device pixels
    fn backing_size(&self) -> (u32, u32);
}

/// Surface without a window. The context can be withheld or revoked to exercise
/// the unsupported-environment and lost-surface paths.
#[derive(Debug)]
pub struct HeadlessSurface<C: Canvas> {
    canvas: C,
    available: bool,
}

impl<C: Canvas> HeadlessSurface<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            available: true,
        }
    }

    /// A surface whose 2D context is never available
    pub fn unsupported(canvas: C) -> Self {
        Self {
            canvas,
            available: false,
        }
    }

    /// Make the context unavailable from now on
    pub fn revoke(&mut self) {
        self.available = false;
    }

    /// Direct access to the canvas regardless of availability
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }
}

impl<C: Canvas> Surface for HeadlessSurface<C> {
    type Canvas = C;

    fn context_2d(&mut self) -> Option<&mut C> {
        if self.available {
            Some(&mut self.canvas)
        } else {
            None
        }
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    fn backing_size(&self) -> (u32, u32) {
        self.canvas.size()
    }
}
