use super::intent::IntentQueue;
use serde::{Deserialize, Serialize};

pub type Color = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  pub fn delta(self) -> (i32, i32) {
    match self {
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
  pub x: i32,
  pub y: i32,
}

impl Position {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  pub fn step(self, direction: Direction) -> Self {
    let (dx, dy) = direction.delta();
    Self {
      x: self.x + dx,
      y: self.y + dy,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSlot {
  pub position: Position,
  pub direction: Direction,
}

/// Per-round simulation state. Only exists for players registered when the
/// round started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
  pub position: Position,
  pub color: Color,
  pub last_direction: Direction,
  pub alive: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
  pub id: String,
  pub name: String,
  pub pending: IntentQueue,
  pub cycle: Option<Cycle>,
}

impl Player {
  pub fn new(id: String, name: String) -> Self {
    Self {
      id,
      name,
      pending: IntentQueue::new(),
      cycle: None,
    }
  }

  pub fn is_alive(&self) -> bool {
    self.cycle.as_ref().is_some_and(|cycle| cycle.alive)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
  pub id: String,
  pub name: String,
  pub position: Position,
  pub color: Color,
  pub alive: bool,
}

impl PlayerSnapshot {
  pub fn from_player(player: &Player) -> Option<Self> {
    let cycle = player.cycle.as_ref()?;
    Some(Self {
      id: player.id.clone(),
      name: player.name.clone(),
      position: cycle.position,
      color: cycle.color,
      alive: cycle.alive,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSnapshot {
  pub tick: u64,
  pub board: Vec<Vec<Option<Color>>>,
  pub players: Vec<PlayerSnapshot>,
}
