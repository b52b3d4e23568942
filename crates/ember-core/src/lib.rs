//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `Vec2`, `Size`, `Viewport` - 2D spatial types
//! - `Color` - RGBA color with HSL construction
//! - Error types and Result alias

mod error;
mod types;

pub use error::{EmberError, Result};
pub use types::{Color, Size, Vec2, Viewport};
