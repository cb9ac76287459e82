//! Multi-participant scenarios driven through a minimal in-test relay.

use kurbo::Point;
use scribble_core::{
    ClientMessage, DrawingSession, Path, PointerEvent, Role, RoomState, ServerMessage,
    SessionEvent,
};

/// Fans client messages out to the other members the way a relay would,
/// tagging drawing events with the sender's name.
struct Relay {
    members: Vec<(String, DrawingSession)>,
}

impl Relay {
    fn new(names: &[&str]) -> Self {
        let members = names
            .iter()
            .map(|name| {
                let mut session = DrawingSession::new("white");
                session.handle(SessionEvent::TransportOpened);
                (name.to_string(), session)
            })
            .collect();
        Self { members }
    }

    fn session(&mut self, name: &str) -> &mut DrawingSession {
        &mut self
            .members
            .iter_mut()
            .find(|(n, _)| n == name)
            .unwrap()
            .1
    }

    /// Everyone joins room "r1"; the first member creates it.
    fn open_room(&mut self) {
        let creator = self.members[0].0.clone();
        self.session(&creator).request_create(&creator).unwrap();
        self.route();
        for i in 1..self.members.len() {
            let name = self.members[i].0.clone();
            self.session(&name).request_join("r1", &name).unwrap();
            self.route();
        }
    }

    fn deliver(&mut self, to: &str, msg: &ServerMessage) {
        let json = serde_json::to_string(msg).unwrap();
        self.session(to).handle(SessionEvent::Message(json));
    }

    fn broadcast_except(&mut self, from: &str, msg: ServerMessage) {
        let others: Vec<String> = self
            .members
            .iter()
            .map(|(n, _)| n.clone())
            .filter(|n| n != from)
            .collect();
        for name in others {
            self.deliver(&name, &msg);
        }
    }

    /// Drain every member's outgoing queue until nothing is left.
    fn route(&mut self) {
        loop {
            let mut batch = Vec::new();
            for (name, session) in &mut self.members {
                for msg in session.take_outgoing() {
                    batch.push((name.clone(), msg));
                }
            }
            if batch.is_empty() {
                return;
            }
            for (from, msg) in batch {
                self.relay(&from, msg);
            }
        }
    }

    fn relay(&mut self, from: &str, msg: ClientMessage) {
        match msg {
            ClientMessage::CreateRoom { .. } => {
                self.deliver(from, &ServerMessage::RoomCreated { room_id: "r1".to_string() });
            }
            ClientMessage::JoinRoom { room_id, .. } => {
                self.deliver(from, &ServerMessage::RoomJoined { room_id, paths: Vec::new() });
            }
            ClientMessage::DestroyRoom { .. } => {
                let names: Vec<String> = self.members.iter().map(|(n, _)| n.clone()).collect();
                for name in names {
                    self.deliver(&name, &ServerMessage::RoomDestroyed);
                }
            }
            ClientMessage::DrawStart {
                color,
                brush_size,
                start_x,
                start_y,
            } => {
                let path = Path::new(color, brush_size, Point::new(start_x, start_y));
                self.broadcast_except(from, ServerMessage::DrawStart { path, from: from.to_string() });
            }
            ClientMessage::Draw { x, y } => {
                self.broadcast_except(from, ServerMessage::Draw { x, y, from: from.to_string() });
            }
            ClientMessage::DrawEnd => {
                self.broadcast_except(from, ServerMessage::DrawEnd { from: from.to_string() });
            }
        }
    }
}

fn pointer(session: &mut DrawingSession, event: PointerEvent) {
    session.handle(SessionEvent::Pointer(event));
}

#[test]
fn test_stroke_reaches_peer_point_by_point() {
    let mut relay = Relay::new(&["ada", "bob"]);
    relay.open_room();

    let ada = relay.session("ada");
    ada.set_brush_size(4.0).unwrap();
    pointer(ada, PointerEvent::Down(Point::new(10.0, 10.0)));
    relay.route();
    pointer(relay.session("ada"), PointerEvent::Move(Point::new(12.0, 10.0)));
    relay.route();
    assert_eq!(
        relay.session("bob").store().remote_paths()[0].points,
        vec![Point::new(12.0, 10.0)]
    );

    pointer(relay.session("ada"), PointerEvent::Move(Point::new(15.0, 12.0)));
    pointer(relay.session("ada"), PointerEvent::Up);
    relay.route();

    let remote = relay.session("bob").store().remote_paths();
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].color, "Red");
    assert_eq!(remote[0].brush_size, 4.0);
    assert_eq!(remote[0].origin, Point::new(10.0, 10.0));
    assert_eq!(remote[0].points, vec![Point::new(12.0, 10.0), Point::new(15.0, 12.0)]);

    // The author's own copy is local, never remote.
    assert!(relay.session("ada").store().remote_paths().is_empty());
    assert_eq!(relay.session("ada").store().local_paths().len(), 1);
}

#[test]
fn test_concurrent_authors_do_not_interleave() {
    let mut relay = Relay::new(&["ada", "bob", "cy"]);
    relay.open_room();

    pointer(relay.session("ada"), PointerEvent::Down(Point::new(0.0, 0.0)));
    pointer(relay.session("bob"), PointerEvent::Down(Point::new(50.0, 50.0)));
    relay.route();
    for i in 1..=3 {
        let step = f64::from(i);
        pointer(relay.session("ada"), PointerEvent::Move(Point::new(step, 0.0)));
        pointer(relay.session("bob"), PointerEvent::Move(Point::new(50.0 + step, 50.0)));
        relay.route();
    }
    pointer(relay.session("ada"), PointerEvent::Up);
    pointer(relay.session("bob"), PointerEvent::Up);
    relay.route();

    let remote = relay.session("cy").store().remote_paths();
    assert_eq!(remote.len(), 2);
    let ada_path = remote.iter().find(|p| p.origin == Point::ZERO).unwrap();
    let bob_path = remote.iter().find(|p| p.origin == Point::new(50.0, 50.0)).unwrap();
    assert!(ada_path.points.iter().all(|p| p.y == 0.0));
    assert!(bob_path.points.iter().all(|p| p.y == 50.0));
    assert_eq!(ada_path.len(), 3);
    assert_eq!(bob_path.len(), 3);
}

#[test]
fn test_duplicate_start_opens_new_path() {
    let mut relay = Relay::new(&["ada", "bob"]);
    relay.open_room();

    let start = ServerMessage::DrawStart {
        path: Path::new("Red", 2.0, Point::ZERO),
        from: "ada".to_string(),
    };
    relay.deliver("bob", &start);
    relay.deliver("bob", &ServerMessage::Draw { x: 1.0, y: 1.0, from: "ada".to_string() });
    relay.deliver("bob", &start);

    let remote = relay.session("bob").store().remote_paths();
    assert_eq!(remote.len(), 2);
    assert_eq!(remote[0].points, vec![Point::new(1.0, 1.0)]);
    assert!(remote[1].is_empty());
}

#[test]
fn test_destroy_reaches_everyone() {
    let mut relay = Relay::new(&["ada", "bob", "cy"]);
    relay.open_room();
    assert_eq!(relay.session("ada").role(), Role::Creator);
    assert_eq!(relay.session("bob").role(), Role::Guest);

    relay.session("ada").request_destroy().unwrap();
    relay.route();

    for name in ["ada", "bob", "cy"] {
        let session = relay.session(name);
        assert_eq!(session.state(), RoomState::Idle);
        assert!(session.room_id().is_none());
        assert_eq!(session.role(), Role::None);
    }
}

#[test]
fn test_orphan_point_leaves_store_unchanged() {
    let mut relay = Relay::new(&["ada", "bob"]);
    relay.open_room();
    relay.deliver("bob", &ServerMessage::Draw { x: 3.0, y: 4.0, from: "ada".to_string() });
    assert!(relay.session("bob").store().remote_paths().is_empty());
}

#[test]
fn test_clear_never_touches_peers() {
    let mut relay = Relay::new(&["ada", "bob"]);
    relay.open_room();

    pointer(relay.session("ada"), PointerEvent::Down(Point::ZERO));
    pointer(relay.session("ada"), PointerEvent::Up);
    relay.route();

    relay.session("ada").clear();
    relay.route();
    assert!(relay.session("ada").store().local_paths().is_empty());
    assert_eq!(relay.session("bob").store().remote_paths().len(), 1);
}
