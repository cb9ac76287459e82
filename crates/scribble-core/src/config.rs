//! Client configuration.

use std::path::PathBuf;

/// Relay address used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080";

/// Canvas background, also the color the eraser paints with.
pub const DEFAULT_BACKGROUND: &str = "white";

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 400;

/// Configuration for a drawing client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket URL of the room relay.
    pub server_url: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Background color of the canvas.
    pub background_color: String,
    /// Directory for the persisted username/room pair. `None` uses the
    /// platform default.
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            background_color: DEFAULT_BACKGROUND.to_string(),
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `SCRIBBLE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up by `lookup`. Unparseable numbers are logged
    /// and ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SCRIBBLE_SERVER_URL") {
            self.server_url = url;
        }
        if let Some(width) = parse_dimension(&lookup, "SCRIBBLE_CANVAS_WIDTH") {
            self.canvas_width = width;
        }
        if let Some(height) = parse_dimension(&lookup, "SCRIBBLE_CANVAS_HEIGHT") {
            self.canvas_height = height;
        }
        if let Some(background) = lookup("SCRIBBLE_BACKGROUND") {
            self.background_color = background;
        }
        if let Some(dir) = lookup("SCRIBBLE_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
        self
    }
}

fn parse_dimension(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            log::warn!("Ignoring {}={:?}: expected a positive integer", key, raw);
            None
        }
    }
}
