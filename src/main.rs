use axum::{
  extract::{Path, Query, State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod game;
mod protocol;
mod shared;
mod transport;

use app::room_name::room_key;
use config::{GameConfig, ServerConfig};
use game::board::BoardError;
use game::lifecycle::Phase;
use game::room::Room;
use shared::names::{sanitize_player_id, sanitize_player_name};
use transport::ws_session::handle_socket;

struct AppState {
  rooms: DashMap<String, Arc<Room>>,
  config: Arc<GameConfig>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  rooms: usize,
}

#[derive(Debug, Serialize)]
struct RoomSummary {
  name: String,
  players: usize,
  phase: Phase,
}

#[derive(Debug, Deserialize)]
struct ConnectQuery {
  id: Option<String>,
  name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let server = ServerConfig::from_env()?;
  let config = GameConfig::from_env()?;
  tracing::info!(
    width = config.width,
    height = config.height,
    tick_ms = config.tick_interval.as_millis() as u64,
    capacity = config.capacity(),
    "arena configured"
  );

  let state = Arc::new(AppState {
    rooms: DashMap::new(),
    config: Arc::new(config),
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/rooms", get(rooms))
    .route("/api/room/:room", get(ws_handler))
    .fallback_service(ServeDir::new(&server.static_dir))
    .layer(CompressionLayer::new())
    .layer(cors)
    .with_state(state);

  let address = format!("0.0.0.0:{}", server.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

impl AppState {
  fn room(&self, name: String) -> Result<Arc<Room>, BoardError> {
    match self.rooms.entry(name) {
      dashmap::mapref::entry::Entry::Occupied(entry) => Ok(entry.get().clone()),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        tracing::info!(room = entry.key().as_str(), "opening room");
        let room = Room::new(entry.key().clone(), Arc::clone(&self.config))?;
        entry.insert(room.clone());
        Ok(room)
      }
    }
  }

  /// Drops the room once no socket holds it. Dropping it stops its timers.
  fn release_room(&self, name: &str) {
    if self
      .rooms
      .remove_if(name, |_, room| Arc::strong_count(room) == 1)
      .is_some()
    {
      tracing::info!(room = name, "closing empty room");
    }
  }
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    rooms: state.rooms.len(),
  })
}

async fn rooms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let rooms: Vec<Arc<Room>> = state.rooms.iter().map(|entry| entry.value().clone()).collect();
  let mut summaries = Vec::with_capacity(rooms.len());
  for room in rooms {
    let stats = room.stats().await;
    summaries.push(RoomSummary {
      name: room.name().to_string(),
      players: stats.players,
      phase: stats.phase,
    });
  }
  summaries.sort_by(|a, b| a.name.cmp(&b.name));
  Json(summaries)
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Path(room): Path<String>,
  Query(query): Query<ConnectQuery>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let room = room_key(&room);
  let player_id = query
    .id
    .as_deref()
    .and_then(sanitize_player_id)
    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
  let name = sanitize_player_name(query.name.as_deref().unwrap_or_default(), "Player");
  ws.on_upgrade(move |socket| async move {
    match state.room(room.clone()) {
      Ok(arena) => handle_socket(socket, arena, player_id, name).await,
      Err(error) => tracing::error!(room = %room, %error, "cannot open room"),
    }
    state.release_room(&room);
  })
}
