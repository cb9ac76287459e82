//! Local stroke capture.
//!
//! Turns pointer samples into a local [`Path`] and the matching wire events.
//! Points are sent one at a time as they arrive, never the whole path.

use crate::path::Path;
use crate::protocol::ClientMessage;
use crate::store::PathStore;
use crate::tools::ToolState;
use kurbo::Point;

/// Capture state of the local stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Drawing into the local path at this index.
    Active { index: usize },
}

/// Drives a single local stroke at a time.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    /// Create an idle capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current capture state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Check if a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Active { .. })
    }

    /// Start a stroke at `origin` using a snapshot of `tools`.
    ///
    /// Returns `None` if a stroke is already in progress.
    pub fn begin(
        &mut self,
        store: &mut PathStore,
        tools: &ToolState,
        background: &str,
        origin: Point,
    ) -> Option<ClientMessage> {
        if self.is_drawing() {
            log::warn!("Ignoring stroke start while another stroke is in progress");
            return None;
        }

        let color = tools.effective_color(background).to_string();
        let path = Path::new(color.clone(), tools.brush_size, origin);
        let index = store.push_local(path);
        self.state = CaptureState::Active { index };

        Some(ClientMessage::DrawStart {
            color,
            brush_size: tools.brush_size,
            start_x: origin.x,
            start_y: origin.y,
        })
    }

    /// Append a point to the stroke in progress. No-op when idle.
    pub fn extend(&mut self, store: &mut PathStore, point: Point) -> Option<ClientMessage> {
        let CaptureState::Active { index } = self.state else {
            return None;
        };
        if !store.extend_local(index, point) {
            // The local set was cleared underneath the stroke.
            self.state = CaptureState::Idle;
            return None;
        }
        Some(ClientMessage::Draw {
            x: point.x,
            y: point.y,
        })
    }

    /// Finish the stroke in progress. No-op when idle.
    pub fn end(&mut self) -> Option<ClientMessage> {
        if !self.is_drawing() {
            return None;
        }
        self.state = CaptureState::Idle;
        Some(ClientMessage::DrawEnd)
    }

    /// Close the stroke locally without telling peers.
    pub fn abort(&mut self) {
        self.state = CaptureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_stroke() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        let tools = ToolState::default().with_color("Green");

        let start = capture.begin(&mut store, &tools, "white", Point::new(1.0, 2.0));
        assert_eq!(
            start,
            Some(ClientMessage::DrawStart {
                color: "Green".to_string(),
                brush_size: 2.0,
                start_x: 1.0,
                start_y: 2.0,
            })
        );
        assert!(capture.is_drawing());

        let inputs = [Point::new(3.0, 4.0), Point::new(5.0, 4.0), Point::new(6.0, 9.0)];
        for p in inputs {
            assert_eq!(
                capture.extend(&mut store, p),
                Some(ClientMessage::Draw { x: p.x, y: p.y })
            );
        }
        assert_eq!(capture.end(), Some(ClientMessage::DrawEnd));
        assert!(!capture.is_drawing());

        assert_eq!(store.local_paths().len(), 1);
        assert_eq!(store.local_paths()[0].points, inputs.to_vec());
    }

    #[test]
    fn test_extend_and_end_when_idle_are_noops() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        assert_eq!(capture.extend(&mut store, Point::new(1.0, 1.0)), None);
        assert_eq!(capture.end(), None);
        assert!(store.local_paths().is_empty());
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        let tools = ToolState::default();
        assert!(capture.begin(&mut store, &tools, "white", Point::ZERO).is_some());
        assert!(capture.begin(&mut store, &tools, "white", Point::ZERO).is_none());
        assert_eq!(store.local_paths().len(), 1);
    }

    #[test]
    fn test_eraser_uses_background() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        let tools = ToolState::default().toggled_eraser();
        capture.begin(&mut store, &tools, "white", Point::ZERO);
        assert_eq!(store.local_paths()[0].color, "white");
    }

    #[test]
    fn test_tool_change_mid_stroke_does_not_alter_path() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        let tools = ToolState::default();
        capture.begin(&mut store, &tools, "white", Point::ZERO);
        let _tools = tools.with_color("Blue").with_brush_size(9.0).unwrap();
        capture.extend(&mut store, Point::new(1.0, 1.0));
        assert_eq!(store.local_paths()[0].color, "Red");
        assert_eq!(store.local_paths()[0].brush_size, 2.0);
    }

    #[test]
    fn test_clear_during_stroke_stops_capture() {
        let mut store = PathStore::new();
        let mut capture = StrokeCapture::new();
        capture.begin(&mut store, &ToolState::default(), "white", Point::ZERO);
        store.clear_local();
        assert_eq!(capture.extend(&mut store, Point::new(1.0, 1.0)), None);
        assert!(!capture.is_drawing());
    }
}
