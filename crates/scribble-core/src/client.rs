//! Client driver: one ordered event queue feeding one session.
//!
//! Pointer input and transport events are pushed onto the same queue and
//! applied strictly in order by [`DrawClient::pump`], which then flushes
//! outgoing messages, persists membership changes and repaints whichever
//! layer's strokes changed. Local strokes are painted on their own surface,
//! stacked over the surface holding remote strokes.

use crate::error::SessionResult;
use crate::render::{DirtyLayers, DrawSurface, LOCAL_LAYER_BACKGROUND, repaint};
use crate::session::{DrawingSession, PointerEvent, SessionEvent, SessionNotice};
use crate::storage::{SessionStore, StoredSession, load_or_none};
use crate::transport::{Transport, TransportEvent};
use std::collections::VecDeque;

/// A drawing client bound to a transport and two layered surfaces.
pub struct DrawClient<T: Transport, S: DrawSurface> {
    session: DrawingSession,
    transport: T,
    /// Local strokes, stacked over `remote_surface`.
    local_surface: S,
    remote_surface: S,
    queue: VecDeque<SessionEvent>,
    session_store: Option<Box<dyn SessionStore>>,
    /// Membership to re-join on the next transport open.
    rejoin: Option<StoredSession>,
}

impl<T: Transport, S: DrawSurface> DrawClient<T, S> {
    /// Create a client. Nothing is sent until the transport opens.
    pub fn new(
        background: impl Into<String>,
        transport: T,
        local_surface: S,
        remote_surface: S,
    ) -> Self {
        let mut client = Self {
            session: DrawingSession::new(background),
            transport,
            local_surface,
            remote_surface,
            queue: VecDeque::new(),
            session_store: None,
            rejoin: None,
        };
        client.repaint_now();
        client
    }

    /// Remember memberships in `store`, and re-join the one it already holds
    /// once the transport opens.
    pub fn with_session_store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.rejoin = load_or_none(store.as_ref());
        if let Some(ref stored) = self.rejoin {
            log::info!("Will re-join room {} as {}", stored.room_id, stored.username);
        }
        self.session_store = Some(store);
        self
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    /// Surface holding this participant's strokes.
    pub fn local_surface(&self) -> &S {
        &self.local_surface
    }

    /// Surface holding peers' strokes, under the local one.
    pub fn remote_surface(&self) -> &S {
        &self.remote_surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Swap in a fresh transport after the old one closed. The session stays
    /// disconnected until the new one reports open; any room must be joined
    /// again.
    pub fn replace_transport(&mut self, transport: T) -> T {
        std::mem::replace(&mut self.transport, transport)
    }

    /// Queue pointer input behind everything already queued.
    pub fn enqueue_pointer(&mut self, pointer: PointerEvent) {
        self.queue.push_back(SessionEvent::Pointer(pointer));
    }

    /// Poll the transport, apply every queued event in order, flush outgoing
    /// messages and repaint if needed. Returns the notices raised.
    pub fn pump(&mut self) -> Vec<SessionNotice> {
        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Opened => self.queue.push_back(SessionEvent::TransportOpened),
                TransportEvent::Message(json) => self.queue.push_back(SessionEvent::Message(json)),
                TransportEvent::Closed => self.queue.push_back(SessionEvent::TransportClosed),
                TransportEvent::Error { message } => log::error!("Transport error: {}", message),
            }
        }

        let mut notices = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            self.session.handle(event);
            for notice in self.session.take_notices() {
                self.on_notice(&notice);
                notices.push(notice);
            }
        }

        self.flush();
        self.repaint_if_needed();
        notices
    }

    // --- Requests ---

    pub fn request_create(&mut self, username: &str) -> SessionResult<()> {
        self.session.request_create(username)?;
        self.flush();
        Ok(())
    }

    pub fn request_join(&mut self, room_id: &str, username: &str) -> SessionResult<()> {
        self.session.request_join(room_id, username)?;
        self.flush();
        Ok(())
    }

    pub fn request_destroy(&mut self) -> SessionResult<()> {
        self.session.request_destroy()?;
        self.flush();
        Ok(())
    }

    pub fn request_leave(&mut self) -> SessionResult<()> {
        self.session.request_leave()?;
        self.forget_membership();
        self.repaint_if_needed();
        Ok(())
    }

    // --- Tools ---

    pub fn set_color(&mut self, color: &str) {
        self.session.set_color(color);
    }

    pub fn toggle_eraser(&mut self) {
        self.session.toggle_eraser();
    }

    pub fn set_brush_size(&mut self, size: f64) -> SessionResult<()> {
        self.session.set_brush_size(size)
    }

    /// Clear local strokes and repaint.
    pub fn clear(&mut self) {
        self.session.clear();
        self.flush();
        self.repaint_if_needed();
    }

    // --- Internals ---

    fn on_notice(&mut self, notice: &SessionNotice) {
        match notice {
            SessionNotice::Connected => {
                if let Some(stored) = self.rejoin.take() {
                    if let Err(e) = self.session.request_join(&stored.room_id, &stored.username) {
                        log::warn!("Re-join of {} failed: {}", stored.room_id, e);
                    }
                }
            }
            SessionNotice::RoomCreated { room_id, username } => {
                self.remember(room_id, username, true);
            }
            SessionNotice::RoomJoined { room_id, username } => {
                self.remember(room_id, username, false);
            }
            SessionNotice::RoomDestroyed => self.forget_membership(),
            SessionNotice::RelayError { message } => {
                log::warn!("Relay reported: {}", message);
            }
            SessionNotice::Disconnected | SessionNotice::PresenceChanged => {}
        }
    }

    fn remember(&self, room_id: &str, username: &str, is_creator: bool) {
        if let Some(ref store) = self.session_store {
            let stored = StoredSession {
                room_id: room_id.to_string(),
                username: username.to_string(),
                is_creator,
            };
            if let Err(e) = store.save(&stored) {
                log::warn!("Failed to save session: {}", e);
            }
        }
    }

    fn forget_membership(&self) {
        if let Some(ref store) = self.session_store {
            if let Err(e) = store.clear() {
                log::warn!("Failed to clear stored session: {}", e);
            }
        }
    }

    /// Send queued messages. Failed sends are logged and dropped.
    fn flush(&mut self) {
        for msg in self.session.take_outgoing() {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("Failed to encode {:?}: {}", msg, e);
                    continue;
                }
            };
            log::debug!("Sending: {}", json.chars().take(100).collect::<String>());
            if let Err(e) = self.transport.send(&json) {
                log::warn!("Dropped outgoing message: {}", e);
            }
        }
    }

    fn repaint_if_needed(&mut self) {
        let DirtyLayers { local, remote } = self.session.take_repaint();
        if local {
            self.repaint_local();
        }
        if remote {
            self.repaint_remote();
        }
    }

    /// Repaint the local layer from the local strokes.
    pub fn repaint_local(&mut self) {
        repaint(
            &mut self.local_surface,
            self.session.store().local_paths(),
            LOCAL_LAYER_BACKGROUND,
        );
    }

    /// Repaint the remote layer from the remote strokes.
    pub fn repaint_remote(&mut self) {
        repaint(
            &mut self.remote_surface,
            self.session.store().remote_paths(),
            self.session.background(),
        );
    }

    /// Repaint both layers.
    pub fn repaint_now(&mut self) {
        self.repaint_local();
        self.repaint_remote();
    }
}
