//! Room session: membership state machine, stroke replication and presence.
//!
//! [`DrawingSession`] is the single owner of the path store, tool state and
//! room membership. Everything that can change them arrives through
//! [`DrawingSession::handle`] or one of the explicit request methods, so the
//! whole engine runs on one ordered event stream and can be tested without a
//! live transport.

use crate::capture::StrokeCapture;
use crate::error::{SessionError, SessionResult};
use crate::path::Path;
use crate::presence::PresenceTracker;
use crate::protocol::{ClientMessage, ServerMessage, UserStatus};
use crate::render::DirtyLayers;
use crate::store::PathStore;
use crate::tools::ToolState;
use kurbo::Point;

/// Membership state of this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomState {
    /// No open transport.
    #[default]
    Disconnected,
    /// Transport open, not in a room.
    Idle,
    JoinPending,
    CreatePending,
    InRoom,
    /// Transient: the room was torn down. The session moves straight on to
    /// `Idle`, so this is never observed from outside.
    Destroyed,
}

/// Role of this client in its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    None,
    Creator,
    Guest,
}

/// Pointer input on the local drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Everything the session reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TransportOpened,
    TransportClosed,
    /// A text frame from the relay.
    Message(String),
    Pointer(PointerEvent),
}

/// Things the surrounding application may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    Connected,
    Disconnected,
    RoomCreated { room_id: String, username: String },
    RoomJoined { room_id: String, username: String },
    RoomDestroyed,
    PresenceChanged,
    RelayError { message: String },
}

/// Client-side state of one participant.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    state: RoomState,
    role: Role,
    room_id: Option<String>,
    /// Name used for the pending or current membership.
    username: Option<String>,
    store: PathStore,
    tools: ToolState,
    capture: StrokeCapture,
    presence: PresenceTracker,
    /// Surface background, painted by the eraser.
    background: String,
    outgoing: Vec<ClientMessage>,
    notices: Vec<SessionNotice>,
    dirty: DirtyLayers,
}

impl DrawingSession {
    /// Create a disconnected session for a surface with the given background.
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            state: RoomState::Disconnected,
            role: Role::None,
            room_id: None,
            username: None,
            store: PathStore::new(),
            tools: ToolState::default(),
            capture: StrokeCapture::new(),
            presence: PresenceTracker::new(),
            background: background.into(),
            outgoing: Vec::new(),
            notices: Vec::new(),
            dirty: DirtyLayers::default(),
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_in_room(&self) -> bool {
        self.state == RoomState::InRoom
    }

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    // --- Queues ---

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing messages.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Take pending notices (drains the queue).
    pub fn take_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Layers whose strokes changed since the last call.
    pub fn take_repaint(&mut self) -> DirtyLayers {
        std::mem::take(&mut self.dirty)
    }

    // --- Event entry point ---

    /// Apply one event. Rejected or dropped events are logged; none of them
    /// is fatal to the session.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TransportOpened => self.on_transport_opened(),
            SessionEvent::TransportClosed => self.on_transport_closed(),
            SessionEvent::Message(json) => {
                if let Err(e) = self.handle_message(&json) {
                    log::warn!("Dropped message: {}", e);
                }
            }
            SessionEvent::Pointer(pointer) => self.handle_pointer(pointer),
        }
    }

    /// Parse and apply a text frame from the relay.
    pub fn handle_message(&mut self, json: &str) -> SessionResult<()> {
        log::debug!("Received: {}", json.chars().take(100).collect::<String>());
        let msg = ServerMessage::parse(json)?;
        self.apply(msg)
    }

    /// Apply a decoded relay message.
    pub fn apply(&mut self, msg: ServerMessage) -> SessionResult<()> {
        match msg {
            ServerMessage::RoomCreated { room_id } => {
                self.on_created(room_id);
                Ok(())
            }
            ServerMessage::RoomJoined { room_id, paths } => {
                self.on_joined(room_id, paths);
                Ok(())
            }
            ServerMessage::RoomDestroyed => {
                self.on_destroyed();
                Ok(())
            }
            ServerMessage::DrawStart { path, from } => self.on_remote_start(from, path),
            ServerMessage::Draw { x, y, from } => self.on_remote_point(&from, Point::new(x, y)),
            ServerMessage::DrawEnd { from } => self.on_remote_end(&from),
            ServerMessage::OnlineStatus { users } => {
                self.on_presence(users);
                Ok(())
            }
            ServerMessage::Error { message } => {
                self.on_error(message);
                Ok(())
            }
            ServerMessage::Unknown => Ok(()),
        }
    }

    // --- Explicit requests ---

    /// Ask the relay for a new room owned by `username`.
    pub fn request_create(&mut self, username: &str) -> SessionResult<()> {
        self.check_request("create a room")?;
        let username = non_empty(username, SessionError::EmptyUsername)?;

        self.queue(ClientMessage::CreateRoom {
            username: username.clone(),
        });
        self.username = Some(username);
        self.transition(RoomState::CreatePending);
        Ok(())
    }

    /// Ask the relay to join `room_id` as `username`.
    pub fn request_join(&mut self, room_id: &str, username: &str) -> SessionResult<()> {
        self.check_request("join a room")?;
        let username = non_empty(username, SessionError::EmptyUsername)?;
        let room_id = non_empty(room_id, SessionError::EmptyRoomId)?;

        self.queue(ClientMessage::JoinRoom {
            room_id,
            username: username.clone(),
        });
        self.username = Some(username);
        self.transition(RoomState::JoinPending);
        Ok(())
    }

    /// Ask the relay to tear the room down. Local state only changes once
    /// the relay confirms.
    pub fn request_destroy(&mut self) -> SessionResult<()> {
        let room_id = match (self.state, self.role, self.room_id.clone()) {
            (RoomState::InRoom, Role::Creator, Some(room_id)) => room_id,
            _ => return Err(self.invalid("destroy the room")),
        };
        self.queue(ClientMessage::DestroyRoom { room_id });
        Ok(())
    }

    /// Leave the room locally. The relay has no leave message; it notices
    /// when the connection goes away or the client joins elsewhere.
    pub fn request_leave(&mut self) -> SessionResult<()> {
        if self.state != RoomState::InRoom {
            return Err(self.invalid("leave the room"));
        }
        log::info!("Leaving room {:?}", self.room_id);
        self.reset_membership();
        self.store.clear_remote();
        self.dirty.remote = true;
        self.transition(RoomState::Idle);
        Ok(())
    }

    // --- Tools ---

    pub fn set_color(&mut self, color: &str) {
        self.tools = std::mem::take(&mut self.tools).with_color(color);
    }

    pub fn toggle_eraser(&mut self) {
        self.tools = std::mem::take(&mut self.tools).toggled_eraser();
    }

    pub fn set_brush_size(&mut self, size: f64) -> SessionResult<()> {
        self.tools = self.tools.clone().with_brush_size(size)?;
        Ok(())
    }

    /// Clear local strokes. Peers are not told; a stroke in progress is
    /// ended first so theirs does not dangle.
    pub fn clear(&mut self) {
        if let Some(msg) = self.capture.end() {
            self.queue(msg);
        }
        self.store.clear_local();
        self.dirty.local = true;
    }

    // --- Pointer input ---

    fn handle_pointer(&mut self, pointer: PointerEvent) {
        match pointer {
            PointerEvent::Down(point) => {
                if self.state != RoomState::InRoom {
                    log::warn!("{}", self.invalid("start a stroke"));
                    return;
                }
                if let Some(msg) =
                    self.capture
                        .begin(&mut self.store, &self.tools, &self.background, point)
                {
                    self.queue(msg);
                    self.dirty.local = true;
                    if let Some(name) = self.username.as_deref() {
                        self.presence.set_drawing(name, true);
                    }
                }
            }
            PointerEvent::Move(point) => {
                if let Some(msg) = self.capture.extend(&mut self.store, point) {
                    self.queue(msg);
                    self.dirty.local = true;
                }
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if let Some(msg) = self.capture.end() {
                    self.queue(msg);
                    if let Some(name) = self.username.as_deref() {
                        self.presence.set_drawing(name, false);
                    }
                }
            }
        }
    }

    // --- Transport ---

    fn on_transport_opened(&mut self) {
        if self.state == RoomState::Disconnected {
            self.transition(RoomState::Idle);
            self.notices.push(SessionNotice::Connected);
        }
    }

    fn on_transport_closed(&mut self) {
        if self.state == RoomState::Disconnected {
            return;
        }
        log::warn!("{}", SessionError::TransportClosed);
        self.reset_membership();
        self.outgoing.clear();
        self.transition(RoomState::Disconnected);
        self.notices.push(SessionNotice::Disconnected);
    }

    // --- Room lifecycle ---

    fn on_created(&mut self, room_id: String) {
        if self.state != RoomState::CreatePending {
            log::warn!("Ignoring stale roomCreated for {} while {:?}", room_id, self.state);
            return;
        }
        self.enter_room(room_id.clone(), Role::Creator, Vec::new());
        self.notices.push(SessionNotice::RoomCreated {
            room_id,
            username: self.username.clone().unwrap_or_default(),
        });
    }

    fn on_joined(&mut self, room_id: String, paths: Vec<Path>) {
        if self.state != RoomState::JoinPending {
            log::warn!("Ignoring stale roomJoined for {} while {:?}", room_id, self.state);
            return;
        }
        self.enter_room(room_id.clone(), Role::Guest, paths);
        self.notices.push(SessionNotice::RoomJoined {
            room_id,
            username: self.username.clone().unwrap_or_default(),
        });
    }

    fn enter_room(&mut self, room_id: String, role: Role, paths: Vec<Path>) {
        log::info!("Entered room {} as {:?} with {} strokes", room_id, role, paths.len());
        // A stroke cannot start before membership is confirmed.
        self.outgoing.retain(|msg| !msg.is_stroke_event());
        self.room_id = Some(room_id);
        self.role = role;
        self.store.seed_remote(paths);
        self.dirty.remote = true;
        self.transition(RoomState::InRoom);
    }

    fn on_destroyed(&mut self) {
        if self.state != RoomState::InRoom {
            log::warn!("Ignoring roomDestroyed while {:?}", self.state);
            return;
        }
        self.transition(RoomState::Destroyed);
        self.reset_membership();
        self.store.clear_remote();
        self.dirty.remote = true;
        self.transition(RoomState::Idle);
        self.notices.push(SessionNotice::RoomDestroyed);
    }

    fn on_error(&mut self, message: String) {
        log::warn!("{}", SessionError::Relay(message.clone()));
        if matches!(self.state, RoomState::JoinPending | RoomState::CreatePending) {
            self.username = None;
            self.transition(RoomState::Idle);
        }
        self.notices.push(SessionNotice::RelayError { message });
    }

    fn on_presence(&mut self, users: Vec<UserStatus>) {
        if matches!(self.state, RoomState::Disconnected | RoomState::Idle) {
            log::debug!("Ignoring presence broadcast outside a room");
            return;
        }
        self.presence.replace(users);
        self.store.retain_active_peers(self.presence.usernames());
        self.notices.push(SessionNotice::PresenceChanged);
    }

    // --- Remote strokes ---

    fn on_remote_start(&mut self, from: String, path: Path) -> SessionResult<()> {
        if !self.accepts_remote(&from)? {
            return Ok(());
        }
        self.presence.set_drawing(&from, true);
        self.store.start_remote(&from, path);
        self.dirty.remote = true;
        Ok(())
    }

    fn on_remote_point(&mut self, from: &str, point: Point) -> SessionResult<()> {
        if !self.accepts_remote(from)? {
            return Ok(());
        }
        self.store.extend_remote(from, point)?;
        self.dirty.remote = true;
        Ok(())
    }

    fn on_remote_end(&mut self, from: &str) -> SessionResult<()> {
        if !self.accepts_remote(from)? {
            return Ok(());
        }
        self.presence.set_drawing(from, false);
        if self.store.end_remote(from) {
            Ok(())
        } else {
            Err(SessionError::OutOfOrderEvent {
                peer: from.to_string(),
            })
        }
    }

    /// Whether a drawing event from `from` applies to this session. Events
    /// outside a room are rejected; echoes of our own strokes are skipped.
    fn accepts_remote(&self, from: &str) -> SessionResult<bool> {
        if self.state != RoomState::InRoom {
            return Err(self.invalid("apply a remote stroke"));
        }
        if self.username.as_deref() == Some(from) {
            log::debug!("Skipping echo of own stroke event");
            return Ok(false);
        }
        Ok(true)
    }

    // --- Helpers ---

    fn check_request(&self, operation: &'static str) -> SessionResult<()> {
        match self.state {
            RoomState::Idle => Ok(()),
            RoomState::Disconnected => Err(SessionError::TransportNotOpen),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    fn queue(&mut self, msg: ClientMessage) {
        self.outgoing.push(msg);
    }

    fn reset_membership(&mut self) {
        self.capture.abort();
        self.room_id = None;
        self.role = Role::None;
        self.username = None;
        self.presence.clear();
    }

    fn transition(&mut self, to: RoomState) {
        if self.state != to {
            log::info!("Room state {:?} -> {:?}", self.state, to);
            self.state = to;
        }
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BACKGROUND)
    }
}

fn non_empty(value: &str, error: SessionError) -> SessionResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(error)
    } else {
        Ok(value.to_string())
    }
}
