//! Render errors

use ember_core::EmberError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Canvas has no pixels ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("Failed to write image: {0}")]
    ImageWrite(#[from] image::ImageError),
}

impl From<RenderError> for EmberError {
    fn from(err: RenderError) -> Self {
        EmberError::RenderError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_engine_error() {
        let err: EmberError = RenderError::EmptyCanvas {
            width: 0,
            height: 4,
        }
        .into();
        match err {
            EmberError::RenderError(msg) => assert!(msg.contains("0x4")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
