//! Ember Render - 2D drawing surfaces
//!
//! The engine draws through the [`Canvas`] trait and acquires it from a
//! [`Surface`], mirroring a browser canvas and its `getContext("2d")`.
//! Two canvases ship here:
//! - [`RecordingCanvas`] keeps a log of draw commands (tests, host bridges)
//! - [`RasterCanvas`] rasterizes into an `image::RgbaImage` for headless output

mod canvas;
mod error;
mod raster;
mod recording;
mod surface;

pub use canvas::{Canvas, GradientStop, Paint, Rect};
pub use error::RenderError;
pub use raster::RasterCanvas;
pub use recording::{DrawCommand, RecordingCanvas};
pub use surface::{HeadlessSurface, Surface};
