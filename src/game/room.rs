use super::board::BoardError;
use super::lifecycle::{Controller, Phase};
use super::registry::RegistryError;
use super::scheduler::{TimerId, TokioScheduler};
use crate::config::GameConfig;
use crate::protocol::{self, ClientMessage, SessionMessage};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// One arena: its lifecycle controller plus the sockets watching it. Every
/// inbound frame and every timer fire goes through `state`, one at a time.
#[derive(Debug)]
pub struct Room {
  name: String,
  state: Mutex<RoomState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStats {
  pub players: usize,
  pub phase: Phase,
}

#[derive(Debug)]
struct SessionEntry {
  sender: UnboundedSender<String>,
}

#[derive(Debug)]
struct RoomState {
  sessions: HashMap<String, SessionEntry>,
  controller: Controller<TokioScheduler>,
}

impl Room {
  /// Must be called inside a tokio runtime. Dropping the last `Arc` stops the
  /// room's timers and its driver task.
  pub fn new(name: String, config: Arc<GameConfig>) -> Result<Arc<Self>, BoardError> {
    let (fires_tx, fires_rx) = mpsc::unbounded_channel();
    let controller = Controller::new(config, TokioScheduler::new(fires_tx))?;
    let room = Arc::new(Self {
      name,
      state: Mutex::new(RoomState {
        sessions: HashMap::new(),
        controller,
      }),
    });
    tokio::spawn(drive_timers(Arc::downgrade(&room), fires_rx));
    Ok(room)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Registers the player and subscribes `sender` to the room's broadcasts.
  /// On error nothing is registered and the caller should close the socket.
  pub async fn connect(
    &self,
    player_id: &str,
    name: &str,
    sender: UnboundedSender<String>,
  ) -> Result<(), RegistryError> {
    let mut state = self.state.lock().await;
    state.controller.player_connected(player_id, name)?;

    let welcome = SessionMessage::Welcome {
      id: player_id.to_string(),
      room: self.name.clone(),
      phase: state.controller.phase(),
    };
    if let Some(payload) = protocol::encode(&welcome) {
      let _ = sender.send(payload);
    }
    state
      .sessions
      .insert(player_id.to_string(), SessionEntry { sender });
    state.flush();
    Ok(())
  }

  pub async fn disconnect(&self, player_id: &str) {
    let mut state = self.state.lock().await;
    state.sessions.remove(player_id);
    state.controller.player_disconnected(player_id);
    state.flush();
    if state.sessions.is_empty() && state.controller.is_idle() {
      tracing::debug!(room = %self.name, "room is empty and idle");
    }
  }

  pub async fn handle_text_message(&self, player_id: &str, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else { return };
    let mut state = self.state.lock().await;
    match message {
      ClientMessage::Direction(direction) => {
        state.controller.direction_change(player_id, direction);
      }
      ClientMessage::Ding => {
        state.send_to(player_id, &SessionMessage::Dong);
        state.flush();
      }
    }
  }

  pub async fn stats(&self) -> RoomStats {
    let state = self.state.lock().await;
    RoomStats {
      players: state.controller.registry().count(),
      phase: state.controller.phase(),
    }
  }

  async fn timer_fired(&self, id: TimerId) {
    let mut state = self.state.lock().await;
    state.controller.timer_fired(id);
    state.flush();
  }
}

async fn drive_timers(room: Weak<Room>, mut fires: UnboundedReceiver<TimerId>) {
  while let Some(id) = fires.recv().await {
    let Some(room) = room.upgrade() else { break };
    room.timer_fired(id).await;
  }
}

impl RoomState {
  fn send_to(&mut self, player_id: &str, message: &SessionMessage) {
    let Some(session) = self.sessions.get(player_id) else { return };
    let Some(payload) = protocol::encode(message) else { return };
    if session.sender.send(payload).is_err() {
      self.disconnect_stale(&[player_id.to_string()]);
    }
  }

  /// Broadcasts whatever the controller emitted. A closed session is dropped
  /// from the room, which can emit more events, hence the loop.
  fn flush(&mut self) {
    loop {
      let events = self.controller.drain_events();
      if events.is_empty() {
        return;
      }
      let mut stale = Vec::new();
      for event in &events {
        let Some(payload) = protocol::encode(event) else { continue };
        for (player_id, session) in &self.sessions {
          if session.sender.send(payload.clone()).is_err() {
            stale.push(player_id.clone());
          }
        }
      }
      self.disconnect_stale(&stale);
    }
  }

  fn disconnect_stale(&mut self, player_ids: &[String]) {
    for player_id in player_ids {
      if self.sessions.remove(player_id).is_some() {
        tracing::debug!(player_id = %player_id, "dropping closed session");
        self.controller.player_disconnected(player_id);
      }
    }
  }
}
