//! Stroke paths.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One continuous stroke: an origin followed by the points sampled after it.
///
/// Color and width are fixed when the stroke starts. A path without points
/// is a single dot at `origin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WirePath", into = "WirePath")]
pub struct Path {
    /// Color identifier (a CSS color name or hex string).
    pub color: String,
    /// Stroke width.
    pub brush_size: f64,
    /// Where the stroke began.
    pub origin: Point,
    /// Points in capture order.
    pub points: Vec<Point>,
}

impl Path {
    /// Start a new path with no points.
    pub fn new(color: impl Into<String>, brush_size: f64, origin: Point) -> Self {
        Self {
            color: color.into(),
            brush_size,
            origin,
            points: Vec::new(),
        }
    }

    /// Append a point.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Number of points after the origin.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a single-dot stroke.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Origin followed by every point, in drawing order.
    pub fn polyline(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.origin).chain(self.points.iter().copied())
    }
}

/// Stroke widths must be finite and positive.
pub fn is_valid_brush_size(size: f64) -> bool {
    size.is_finite() && size > 0.0
}

/// Flat wire form: `{color, brushSize, startX, startY, points: [[x, y], ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePath {
    color: String,
    brush_size: f64,
    start_x: f64,
    start_y: f64,
    #[serde(default)]
    points: Vec<(f64, f64)>,
}

impl TryFrom<WirePath> for Path {
    type Error = String;

    fn try_from(wire: WirePath) -> Result<Self, Self::Error> {
        if !is_valid_brush_size(wire.brush_size) {
            return Err(format!("invalid brush size {}", wire.brush_size));
        }
        Ok(Self {
            color: wire.color,
            brush_size: wire.brush_size,
            origin: Point::new(wire.start_x, wire.start_y),
            points: wire.points.into_iter().map(Point::from).collect(),
        })
    }
}

impl From<Path> for WirePath {
    fn from(path: Path) -> Self {
        Self {
            color: path.color,
            brush_size: path.brush_size,
            start_x: path.origin.x,
            start_y: path.origin.y,
            points: path.points.into_iter().map(|p| (p.x, p.y)).collect(),
        }
    }
}
