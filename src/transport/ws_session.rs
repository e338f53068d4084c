use crate::game::room::Room;
use crate::protocol::{self, SessionMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_socket(socket: WebSocket, room: Arc<Room>, player_id: String, name: String) {
  let (mut sender, mut receiver) = socket.split();
  let (tx, mut rx) = mpsc::unbounded_channel::<String>();

  if let Err(error) = room.connect(&player_id, &name, tx).await {
    tracing::warn!(room = room.name(), player_id = %player_id, %error, "refusing connection");
    let rejected = SessionMessage::Rejected {
      reason: error.to_string(),
    };
    if let Some(payload) = protocol::encode(&rejected) {
      let _ = sender.send(Message::Text(payload)).await;
    }
    let _ = sender.send(Message::Close(None)).await;
    return;
  }

  let send_task = tokio::spawn(async move {
    while let Some(payload) = rx.recv().await {
      if sender.send(Message::Text(payload)).await.is_err() {
        break;
      }
    }
  });

  while let Some(result) = receiver.next().await {
    let Ok(message) = result else { break };
    match message {
      Message::Text(text) => {
        room.handle_text_message(&player_id, &text).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }

  room.disconnect(&player_id).await;
  send_task.abort();
}
