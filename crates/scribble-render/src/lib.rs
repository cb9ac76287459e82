//! Scribble Render Library
//!
//! A software raster implementation of the drawing surface used by the
//! Scribble client, with PNG export.

pub mod color;
mod pixmap;

pub use color::{resolve_color, resolve_rgba8};
pub use pixmap::PixmapSurface;

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Surface size {actual:?} does not match {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(String),
}
