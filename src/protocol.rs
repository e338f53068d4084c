use crate::game::input::parse_direction;
use crate::game::lifecycle::Phase;
use crate::game::types::Direction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
  Direction(Direction),
  Ding,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum JsonClientMessage {
  #[serde(rename = "direction")]
  Direction { direction: Option<String> },
  #[serde(rename = "ding")]
  Ding,
}

/// Frames addressed to one session rather than the whole room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionMessage {
  Welcome {
    id: String,
    room: String,
    phase: Phase,
  },
  Rejected {
    reason: String,
  },
  Dong,
}

/// `None` for anything that is not a well-formed client frame, including a
/// direction message with an unknown direction.
pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  let message = serde_json::from_str::<JsonClientMessage>(text).ok()?;
  match message {
    JsonClientMessage::Direction { direction } => {
      let direction = parse_direction(direction.as_deref()?)?;
      Some(ClientMessage::Direction(direction))
    }
    JsonClientMessage::Ding => Some(ClientMessage::Ding),
  }
}

pub fn encode<T: Serialize>(message: &T) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(%error, "failed to encode server message");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::lifecycle::GameEvent;
  use crate::game::types::{PlayerSnapshot, Position, TickSnapshot};
  use serde_json::json;

  #[test]
  fn decode_direction_change() {
    let message = decode_client_message(r#"{"type":"direction","direction":"left"}"#);
    assert_eq!(message, Some(ClientMessage::Direction(Direction::Left)));
  }

  #[test]
  fn decode_ding() {
    assert_eq!(decode_client_message(r#"{"type":"ding"}"#), Some(ClientMessage::Ding));
  }

  #[test]
  fn malformed_frames_are_dropped() {
    assert_eq!(decode_client_message("not json"), None);
    assert_eq!(decode_client_message(r#"{"type":"direction","direction":"north"}"#), None);
    assert_eq!(decode_client_message(r#"{"type":"direction"}"#), None);
    assert_eq!(decode_client_message(r#"{"type":"direction","direction":7}"#), None);
    assert_eq!(decode_client_message(r#"{"type":"chat","message":"hi"}"#), None);
  }

  #[test]
  fn game_end_uses_survivor_id() {
    let payload = encode(&GameEvent::GameEnd {
      round: 3,
      survivor_id: None,
    })
    .expect("encode");
    let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value, json!({"type": "gameEnd", "round": 3, "survivorId": null}));
  }

  #[test]
  fn tick_flattens_snapshot() {
    let event = GameEvent::Tick(TickSnapshot {
      tick: 1,
      board: vec![vec![Some("#ff6b6b"), None]],
      players: vec![PlayerSnapshot {
        id: "p1".to_string(),
        name: "One".to_string(),
        position: Position::new(0, 0),
        color: "#ff6b6b",
        alive: true,
      }],
    });
    let value: serde_json::Value =
      serde_json::from_str(&encode(&event).expect("encode")).expect("json");
    assert_eq!(
      value,
      json!({
        "type": "tick",
        "tick": 1,
        "board": [["#ff6b6b", null]],
        "players": [{
          "id": "p1",
          "name": "One",
          "position": {"x": 0, "y": 0},
          "color": "#ff6b6b",
          "alive": true
        }]
      })
    );
  }

  #[test]
  fn welcome_reports_phase() {
    let payload = encode(&SessionMessage::Welcome {
      id: "p1".to_string(),
      room: "main".to_string(),
      phase: Phase::Waiting,
    })
    .expect("encode");
    let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value, json!({"type": "welcome", "id": "p1", "room": "main", "phase": "waiting"}));
  }
}
