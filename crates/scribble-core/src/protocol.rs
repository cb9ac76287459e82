//! Wire protocol between a client and the room relay.
//!
//! Every message is a flat JSON object tagged by its `type` field:
//! ```json
//! { "type": "joinRoom", "roomId": "abc123", "username": "ada" }
//! { "type": "draw", "x": 12, "y": 10, "from": "ada" }
//! ```
//! Drawing events relayed to other members carry the sender's username in
//! `from`.

use crate::error::{SessionError, SessionResult};
use crate::path::Path;
use serde::{Deserialize, Deserializer, Serialize};

/// Messages sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a new room owned by `username`.
    CreateRoom { username: String },
    /// Join an existing room.
    JoinRoom { room_id: String, username: String },
    /// Tear the room down (creator only).
    DestroyRoom { room_id: String },
    /// A local stroke started.
    DrawStart {
        color: String,
        brush_size: f64,
        start_x: f64,
        start_y: f64,
    },
    /// A point was appended to the local stroke.
    Draw { x: f64, y: f64 },
    /// The local stroke ended.
    DrawEnd,
}

impl ClientMessage {
    /// True for the stroke events that only make sense inside a room.
    pub fn is_stroke_event(&self) -> bool {
        matches!(
            self,
            ClientMessage::DrawStart { .. } | ClientMessage::Draw { .. } | ClientMessage::DrawEnd
        )
    }
}

/// Messages received from the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Confirms a create request.
    RoomCreated { room_id: String },
    /// Confirms a join request, with the strokes already in the room.
    /// Invalid strokes are dropped; the confirmation itself still applies.
    RoomJoined {
        room_id: String,
        #[serde(default, deserialize_with = "valid_paths")]
        paths: Vec<Path>,
    },
    /// The room was torn down.
    RoomDestroyed,
    /// A peer started a stroke.
    DrawStart { path: Path, from: String },
    /// A peer extended their stroke.
    Draw { x: f64, y: f64, from: String },
    /// A peer ended their stroke.
    DrawEnd { from: String },
    /// Full presence list for the room.
    OnlineStatus { users: Vec<UserStatus> },
    /// Error reported by the relay.
    Error { message: String },
    /// Any tag this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Parse a text frame from the relay.
    pub fn parse(json: &str) -> SessionResult<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::MalformedMessage(e.to_string()))
    }
}

/// Decode a path list, skipping entries that are not valid paths.
fn valid_paths<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Path>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Path>(value) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Dropping invalid stroke from room history: {}", e);
                None
            }
        })
        .collect())
}

/// One entry of a presence broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub username: String,
    #[serde(default)]
    pub is_drawing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_client_message_serialize() {
        let msg = ClientMessage::JoinRoom {
            room_id: "r1".to_string(),
            username: "ada".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "joinRoom");
        assert_eq!(value["roomId"], "r1");
        assert_eq!(value["username"], "ada");
    }

    #[test]
    fn test_draw_start_fields() {
        let msg = ClientMessage::DrawStart {
            color: "Red".to_string(),
            brush_size: 4.0,
            start_x: 10.0,
            start_y: 12.0,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "drawStart");
        assert_eq!(value["brushSize"], 4.0);
        assert_eq!(value["startX"], 10.0);
        assert_eq!(value["startY"], 12.0);
    }

    #[test]
    fn test_draw_end_has_no_payload() {
        let json = serde_json::to_string(&ClientMessage::DrawEnd).unwrap();
        assert_eq!(json, r#"{"type":"drawEnd"}"#);
    }

    #[test]
    fn test_room_joined_without_paths() {
        let msg = ServerMessage::parse(r#"{"type":"roomJoined","roomId":"r1"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::RoomJoined {
                room_id: "r1".to_string(),
                paths: Vec::new(),
            }
        );
    }

    #[test]
    fn test_inbound_draw_start() {
        let json = r#"{"type":"drawStart","from":"bob","path":{"color":"Red","brushSize":4,"startX":10,"startY":10,"points":[]}}"#;
        match ServerMessage::parse(json).unwrap() {
            ServerMessage::DrawStart { path, from } => {
                assert_eq!(from, "bob");
                assert_eq!(path.origin, Point::new(10.0, 10.0));
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_draw_start_with_bad_brush_size_is_malformed() {
        for size in ["0", "-5"] {
            let json = format!(
                r#"{{"type":"drawStart","from":"bob","path":{{"color":"Red","brushSize":{},"startX":0,"startY":0}}}}"#,
                size
            );
            assert!(matches!(
                ServerMessage::parse(&json),
                Err(SessionError::MalformedMessage(_))
            ));
        }
    }

    #[test]
    fn test_room_joined_drops_bad_paths() {
        let json = r#"{"type":"roomJoined","roomId":"r1","paths":[
            {"color":"Red","brushSize":0,"startX":0,"startY":0},
            {"color":"Blue","brushSize":3,"startX":1,"startY":1},
            {"color":"Green","brushSize":-5,"startX":2,"startY":2}
        ]}"#;
        match ServerMessage::parse(json).unwrap() {
            ServerMessage::RoomJoined { room_id, paths } => {
                assert_eq!(room_id, "r1");
                assert_eq!(paths.len(), 1);
                assert_eq!(paths[0].color, "Blue");
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_online_status() {
        let json = r#"{"type":"onlineStatus","users":[{"username":"ada","isDrawing":true},{"username":"bob"}]}"#;
        match ServerMessage::parse(json).unwrap() {
            ServerMessage::OnlineStatus { users } => {
                assert_eq!(users.len(), 2);
                assert!(users[0].is_drawing);
                assert!(!users[1].is_drawing);
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_room_destroyed_ignores_extra_fields() {
        let msg = ServerMessage::parse(r#"{"type":"roomDestroyed","roomId":"r1"}"#).unwrap();
        assert_eq!(msg, ServerMessage::RoomDestroyed);
    }

    #[test]
    fn test_unknown_tag_is_ignored() {
        let msg = ServerMessage::parse(r#"{"type":"cursorMoved","x":1}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let result = ServerMessage::parse(r#"{"type":"draw","x":1}"#);
        assert!(matches!(result, Err(SessionError::MalformedMessage(_))));

        let result = ServerMessage::parse("not json");
        assert!(matches!(result, Err(SessionError::MalformedMessage(_))));
    }

    #[test]
    fn test_stroke_event_classification() {
        assert!(ClientMessage::DrawEnd.is_stroke_event());
        assert!(ClientMessage::Draw { x: 0.0, y: 0.0 }.is_stroke_event());
        assert!(!ClientMessage::CreateRoom { username: "ada".to_string() }.is_stroke_event());
    }
}
