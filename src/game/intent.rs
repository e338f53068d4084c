use super::constants::MAX_PENDING_DIRECTIONS;
use super::types::Direction;
use std::collections::VecDeque;

/// FIFO of direction changes a client sent between ticks. The engine takes at
/// most one per tick, so bursts are spread over the following ticks instead of
/// moving a cycle more than one cell at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentQueue {
  pending: VecDeque<Direction>,
}

impl IntentQueue {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns false when the queue is full and the intent was dropped.
  pub fn push(&mut self, direction: Direction) -> bool {
    if self.pending.len() >= MAX_PENDING_DIRECTIONS {
      return false;
    }
    self.pending.push_back(direction);
    true
  }

  /// Oldest pending intent, or `fallback` when nothing is queued.
  pub fn next_or(&mut self, fallback: Direction) -> Direction {
    self.pending.pop_front().unwrap_or(fallback)
  }

  pub fn clear(&mut self) {
    self.pending.clear();
  }

  pub fn len(&self) -> usize {
    self.pending.len()
  }
}
