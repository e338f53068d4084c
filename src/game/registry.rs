use super::types::{Direction, Player};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("player {0} is already connected")]
  DuplicateIdentity(String),
  #[error("arena is full ({0} players)")]
  Full(usize),
}

/// Connected players in join order. Join order decides start slots and colors,
/// so this is a `Vec` rather than a map.
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
  players: Vec<Player>,
  capacity: usize,
}

impl PlayerRegistry {
  pub fn new(capacity: usize) -> Self {
    Self {
      players: Vec::new(),
      capacity,
    }
  }

  pub fn register(&mut self, id: &str, name: &str) -> Result<&Player, RegistryError> {
    if self.position(id).is_some() {
      return Err(RegistryError::DuplicateIdentity(id.to_string()));
    }
    if self.players.len() >= self.capacity {
      return Err(RegistryError::Full(self.capacity));
    }
    self.players.push(Player::new(id.to_string(), name.to_string()));
    let index = self.players.len() - 1;
    Ok(&self.players[index])
  }

  /// Returns the removed player, `None` if the id was unknown.
  pub fn unregister(&mut self, id: &str) -> Option<Player> {
    let index = self.position(id)?;
    Some(self.players.remove(index))
  }

  pub fn count(&self) -> usize {
    self.players.len()
  }

  pub fn all(&self) -> &[Player] {
    &self.players
  }

  pub fn all_mut(&mut self) -> &mut [Player] {
    &mut self.players
  }

  pub fn get(&self, id: &str) -> Option<&Player> {
    self.players.iter().find(|player| player.id == id)
  }

  /// Unknown ids are ignored; late messages from a socket that just closed
  /// are expected. Returns whether the intent was queued.
  pub fn queue_direction(&mut self, id: &str, direction: Direction) -> bool {
    let Some(index) = self.position(id) else { return false };
    self.players[index].pending.push(direction)
  }

  fn position(&self, id: &str) -> Option<usize> {
    self.players.iter().position(|player| player.id == id)
  }
}
