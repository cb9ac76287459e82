//! Rendering adapter interface and the repaint routine.
//!
//! Local and remote strokes live on two layers: the local layer is stacked
//! over the remote one, each painted on its own surface. A surface is only
//! ever touched by [`repaint`]: it clears and replays one layer's strokes in
//! order, so replaying the same paths always produces the same picture.

use crate::path::Path;
use kurbo::Point;

/// Background of the local layer, which is stacked over the remote layer.
pub const LOCAL_LAYER_BACKGROUND: &str = "transparent";

/// A drawing surface that can paint polylines.
///
/// Implementations resolve color identifiers themselves. A polyline with a
/// single point is a dot whose diameter is `width`.
pub trait DrawSurface {
    /// Fill the whole surface with `background`.
    fn clear(&mut self, background: &str);

    /// Stroke the segments joining `points` in order.
    fn stroke_polyline(&mut self, points: &[Point], color: &str, width: f64);
}

/// Layers whose strokes changed since they were last repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyLayers {
    pub local: bool,
    pub remote: bool,
}

impl DirtyLayers {
    pub fn any(self) -> bool {
        self.local || self.remote
    }
}

/// Repaint a whole surface with `paths`, in stored order.
pub fn repaint<S: DrawSurface + ?Sized>(surface: &mut S, paths: &[Path], background: &str) {
    surface.clear(background);
    for path in paths {
        let points: Vec<Point> = path.polyline().collect();
        surface.stroke_polyline(&points, &path.color, path.brush_size);
    }
}

/// A drawing command captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { background: String },
    Stroke {
        points: Vec<Point>,
        color: String,
        width: f64,
    },
}

/// Surface that records commands instead of painting pixels.
///
/// Clearing discards everything recorded before, so `commands()` always
/// describes what is currently visible.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    repaints: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears seen so far.
    pub fn repaint_count(&self) -> usize {
        self.repaints
    }

    /// Visible strokes, without the leading clear.
    pub fn strokes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Stroke { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, background: &str) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            background: background.to_string(),
        });
        self.repaints += 1;
    }

    fn stroke_polyline(&mut self, points: &[Point], color: &str, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            color: color.to_string(),
            width,
        });
    }
}
