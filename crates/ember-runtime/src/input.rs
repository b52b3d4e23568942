//! Pointer input as a latest-value cell

use ember_core::{Size, Vec2};

/// A pointer position as reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    /// Fraction of the viewport, `[0, 1] x [0, 1]`
    Normalized(Vec2),
    /// Logical pixels from the top-left corner
    Pixels(Vec2),
}

impl Pointer {
    /// Resolve to logical pixels against the current surface size
    pub fn to_pixels(&self, size: Size) -> Vec2 {
        match *self {
            Pointer::Normalized(p) => Vec2::new(p.x * size.width, p.y * size.height),
            Pointer::Pixels(p) => p,
        }
    }

    /// Resolve to a fraction of the surface. Zero-sized surfaces map to the center.
    pub fn to_normalized(&self, size: Size) -> Vec2 {
        match *self {
            Pointer::Normalized(p) => p,
            Pointer::Pixels(p) => {
                if size.is_empty() {
                    Vec2::new(0.5, 0.5)
                } else {
                    Vec2::new(p.x / size.width, p.y / size.height)
                }
            }
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Pointer::Normalized(p) | Pointer::Pixels(p) => p.is_finite(),
        }
    }
}

/// Holds the most recent pointer sample. Writes overwrite; reads never wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerCell {
    latest: Option<Pointer>,
    writes: u64,
}

impl PointerCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite with a new sample. Non-finite samples are dropped.
    pub fn set(&mut self, pointer: Pointer) {
        if pointer.is_finite() {
            self.latest = Some(pointer);
            self.writes += 1;
        }
    }

    /// Forget the pointer (e.g. it left the window)
    pub fn clear(&mut self) {
        self.latest = None;
    }

    pub fn get(&self) -> Option<Pointer> {
        self.latest
    }

    /// Number of accepted writes since creation
    pub fn writes(&self) -> u64 {
        self.writes
    }
}
