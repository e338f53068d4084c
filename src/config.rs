use crate::game::constants::{
  BOARD_HEIGHT, BOARD_WIDTH, COLOR_POOL, COOLDOWN_MS, MAX_BOARD_CELLS, MIN_PLAYERS, START_MARGIN,
  TICK_MS, WAITING_POLL_MS,
};
use crate::game::types::{Color, Direction, Position, StartSlot};
use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Static rules of an arena. Built once at startup and shared by every room.
#[derive(Debug, Clone)]
pub struct GameConfig {
  pub width: i32,
  pub height: i32,
  pub tick_interval: Duration,
  pub cooldown: Duration,
  pub waiting_poll: Duration,
  pub min_players: usize,
  pub colors: Vec<Color>,
  pub start_slots: Vec<StartSlot>,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self::with_board(BOARD_WIDTH, BOARD_HEIGHT)
  }
}

impl GameConfig {
  pub fn with_board(width: i32, height: i32) -> Self {
    Self {
      width,
      height,
      tick_interval: Duration::from_millis(TICK_MS),
      cooldown: Duration::from_millis(COOLDOWN_MS),
      waiting_poll: Duration::from_millis(WAITING_POLL_MS),
      min_players: MIN_PLAYERS,
      colors: COLOR_POOL.to_vec(),
      start_slots: corner_slots(width, height),
    }
  }

  pub fn from_env() -> anyhow::Result<Self> {
    let width = env_parse("BOARD_WIDTH", BOARD_WIDTH)?;
    let height = env_parse("BOARD_HEIGHT", BOARD_HEIGHT)?;
    let mut config = Self::with_board(width, height);
    config.tick_interval = Duration::from_millis(env_parse("TICK_MS", TICK_MS)?);
    config.cooldown = Duration::from_millis(env_parse("COOLDOWN_MS", COOLDOWN_MS)?);
    config.waiting_poll = Duration::from_millis(env_parse("WAITING_POLL_MS", WAITING_POLL_MS)?);
    config.min_players = env_parse("MIN_PLAYERS", MIN_PLAYERS)?;
    config.validate()?;
    Ok(config)
  }

  /// Most players a room accepts: every participant needs a slot and a color.
  pub fn capacity(&self) -> usize {
    self.colors.len().min(self.start_slots.len())
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.width <= 0 || self.height <= 0 {
      bail!("board must be at least 1x1, got {}x{}", self.width, self.height);
    }
    let cells = i64::from(self.width) * i64::from(self.height);
    if cells > MAX_BOARD_CELLS as i64 {
      bail!(
        "board {}x{} has {cells} cells, at most {MAX_BOARD_CELLS} are allowed",
        self.width,
        self.height
      );
    }
    if self.tick_interval.is_zero() || self.cooldown.is_zero() || self.waiting_poll.is_zero() {
      bail!("tick, cooldown and waiting poll intervals must be non-zero");
    }
    if self.min_players < 2 {
      bail!("min_players must be at least 2, got {}", self.min_players);
    }
    if self.min_players > self.capacity() {
      bail!(
        "min_players ({}) exceeds arena capacity ({})",
        self.min_players,
        self.capacity()
      );
    }
    for slot in &self.start_slots {
      let position = slot.position;
      if position.x < 0 || position.x >= self.width || position.y < 0 || position.y >= self.height {
        bail!(
          "start slot ({}, {}) is outside the {}x{} board",
          position.x,
          position.y,
          self.width,
          self.height
        );
      }
    }
    for (index, slot) in self.start_slots.iter().enumerate() {
      if self.start_slots[..index].iter().any(|other| other.position == slot.position) {
        bail!("start slots overlap at ({}, {})", slot.position.x, slot.position.y);
      }
    }
    Ok(())
  }
}

/// Process-level settings: where to listen and what to serve.
#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub port: u16,
  pub static_dir: PathBuf,
}

impl ServerConfig {
  pub fn from_env() -> anyhow::Result<Self> {
    let port = env_parse("PORT", 3000u16)?;
    let static_dir = env::var("STATIC_DIR")
      .map(|value| value.trim().to_string())
      .ok()
      .filter(|value| !value.is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from("public"));
    Ok(Self { port, static_dir })
  }
}

/// Four cycles near the corners, each heading along the wall clockwise.
fn corner_slots(width: i32, height: i32) -> Vec<StartSlot> {
  let left = START_MARGIN.min(width - 1).max(0);
  let top = START_MARGIN.min(height - 1).max(0);
  let right = (width - 1 - START_MARGIN).max(0);
  let bottom = (height - 1 - START_MARGIN).max(0);
  vec![
    StartSlot {
      position: Position::new(left, top),
      direction: Direction::Right,
    },
    StartSlot {
      position: Position::new(right, bottom),
      direction: Direction::Left,
    },
    StartSlot {
      position: Position::new(right, top),
      direction: Direction::Down,
    },
    StartSlot {
      position: Position::new(left, bottom),
      direction: Direction::Up,
    },
  ]
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(key) {
    Ok(value) if !value.trim().is_empty() => value
      .trim()
      .parse()
      .with_context(|| format!("invalid {key}: {value:?}")),
    _ => Ok(default),
  }
}
