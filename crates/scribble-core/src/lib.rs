//! Scribble Core Library
//!
//! Client-side synchronization engine for a shared drawing canvas: the room
//! session state machine, stroke capture and replication, and the
//! local/remote path store with its repaint rules.

pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod presence;
pub mod protocol;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
pub mod tools;
pub mod transport;

pub use client::DrawClient;
pub use config::ClientConfig;
pub use error::{SessionError, SessionResult};
pub use path::Path;
pub use presence::PresenceTracker;
pub use protocol::{ClientMessage, ServerMessage, UserStatus};
pub use render::{DirtyLayers, DrawSurface, LOCAL_LAYER_BACKGROUND, RecordingSurface, repaint};
pub use session::{DrawingSession, PointerEvent, Role, RoomState, SessionEvent, SessionNotice};
pub use store::PathStore;
pub use tools::ToolState;
pub use transport::{
    ConnectionState, MemoryTransport, PlatformWebSocket, Transport, TransportError, TransportEvent,
};
