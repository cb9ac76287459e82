//! Drawing tool state.
//!
//! Tool changes are pure: each transition consumes the current state and
//! returns the next one. Nothing here touches a drawing surface; color and
//! width only reach pixels through [`crate::render::repaint`].

use crate::error::{SessionError, SessionResult};
use crate::path::is_valid_brush_size;
use serde::{Deserialize, Serialize};

/// Colors offered by the toolbar.
pub const PALETTE: [&str; 8] = [
    "Red", "Blue", "Black", "Cyan", "Pink", "Green", "Violet", "white",
];

/// Default stroke color.
pub const DEFAULT_COLOR: &str = "Red";

/// Default stroke width.
pub const DEFAULT_BRUSH_SIZE: f64 = 2.0;

/// Color, width and eraser flag for the next local stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    pub selected_color: String,
    pub brush_size: f64,
    pub eraser_on: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            selected_color: DEFAULT_COLOR.to_string(),
            brush_size: DEFAULT_BRUSH_SIZE,
            eraser_on: false,
        }
    }
}

impl ToolState {
    /// Select a color. Turns the eraser off.
    pub fn with_color(self, color: impl Into<String>) -> Self {
        Self {
            selected_color: color.into(),
            eraser_on: false,
            ..self
        }
    }

    /// Flip the eraser.
    pub fn toggled_eraser(self) -> Self {
        Self {
            eraser_on: !self.eraser_on,
            ..self
        }
    }

    /// Set the width of subsequent strokes.
    pub fn with_brush_size(self, size: f64) -> SessionResult<Self> {
        if !is_valid_brush_size(size) {
            return Err(SessionError::InvalidBrushSize(size));
        }
        Ok(Self {
            brush_size: size,
            ..self
        })
    }

    /// Color a stroke started now would use. The eraser paints with the
    /// surface background.
    pub fn effective_color<'a>(&'a self, background: &'a str) -> &'a str {
        if self.eraser_on {
            background
        } else {
            &self.selected_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tools = ToolState::default();
        assert_eq!(tools.selected_color, "Red");
        assert_eq!(tools.brush_size, 2.0);
        assert!(!tools.eraser_on);
    }

    #[test]
    fn test_set_color_clears_eraser() {
        let tools = ToolState::default().toggled_eraser();
        assert!(tools.eraser_on);

        let tools = tools.with_color("Blue");
        assert_eq!(tools.selected_color, "Blue");
        assert!(!tools.eraser_on);
    }

    #[test]
    fn test_effective_color() {
        let tools = ToolState::default().with_color("Green");
        assert_eq!(tools.effective_color("white"), "Green");

        let tools = tools.toggled_eraser();
        assert_eq!(tools.effective_color("white"), "white");
    }

    #[test]
    fn test_brush_size_validation() {
        let tools = ToolState::default().with_brush_size(10.0).unwrap();
        assert_eq!(tools.brush_size, 10.0);

        assert_eq!(
            ToolState::default().with_brush_size(0.0),
            Err(SessionError::InvalidBrushSize(0.0))
        );
        assert!(ToolState::default().with_brush_size(f64::NAN).is_err());
    }
}
