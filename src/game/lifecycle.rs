use super::board::{Board, BoardError};
use super::engine;
use super::registry::{PlayerRegistry, RegistryError};
use super::scheduler::{Scheduler, TimerId, TimerKind};
use super::types::{Cycle, Direction, PlayerSnapshot, TickSnapshot};
use crate::config::GameConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Waiting,
  Running,
  Ended,
}

/// Everything the controller wants broadcast to the room, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
  PlayerJoin {
    id: String,
    name: String,
  },
  PlayerDisconnect {
    id: String,
  },
  RoundStart {
    round: u64,
    players: Vec<PlayerSnapshot>,
  },
  Tick(TickSnapshot),
  GameEnd {
    round: u64,
    #[serde(rename = "survivorId")]
    survivor_id: Option<String>,
  },
}

/// The WAITING -> RUNNING -> ENDED -> WAITING state machine of one arena.
///
/// Inbound events (joins, leaves, directions) only touch the registry. The
/// board and the cycles change only inside a tick, which is what keeps a
/// round reproducible no matter when messages land between ticks.
#[derive(Debug)]
pub struct Controller<S: Scheduler> {
  config: Arc<GameConfig>,
  scheduler: S,
  board: Board,
  registry: PlayerRegistry,
  phase: Phase,
  round: u64,
  tick: u64,
  last_survivor: Option<String>,
  timers: HashMap<TimerKind, TimerId>,
  next_generation: u64,
  events: Vec<GameEvent>,
}

impl<S: Scheduler> Controller<S> {
  pub fn new(config: Arc<GameConfig>, scheduler: S) -> Result<Self, BoardError> {
    let mut controller = Self {
      board: Board::new(config.width, config.height)?,
      registry: PlayerRegistry::new(config.capacity()),
      config,
      scheduler,
      phase: Phase::Waiting,
      round: 0,
      tick: 0,
      last_survivor: None,
      timers: HashMap::new(),
      next_generation: 0,
      events: Vec::new(),
    };
    controller.enter_waiting();
    Ok(controller)
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn registry(&self) -> &PlayerRegistry {
    &self.registry
  }

  /// Whoever was eliminated last in the current or most recent round. When a
  /// tick eliminates several cycles at once, the earliest joiner among them
  /// counts as the last to die. `None` until someone has been eliminated.
  pub fn last_survivor(&self) -> Option<&str> {
    self.last_survivor.as_deref()
  }

  /// No timer is pending. True for a waiting room nobody is in.
  pub fn is_idle(&self) -> bool {
    self.timers.is_empty()
  }

  pub fn drain_events(&mut self) -> Vec<GameEvent> {
    std::mem::take(&mut self.events)
  }

  pub fn player_connected(&mut self, id: &str, name: &str) -> Result<(), RegistryError> {
    let player = self.registry.register(id, name)?;
    let event = GameEvent::PlayerJoin {
      id: player.id.clone(),
      name: player.name.clone(),
    };
    tracing::info!(player_id = id, total = self.registry.count(), "player joined");
    self.events.push(event);
    if self.phase == Phase::Waiting && !self.timers.contains_key(&TimerKind::WaitingPoll) {
      self.start_timer(TimerKind::WaitingPoll, self.config.waiting_poll, true);
    }
    Ok(())
  }

  /// The player's trail stays on the board if a round is running.
  pub fn player_disconnected(&mut self, id: &str) {
    if self.registry.unregister(id).is_none() {
      return;
    }
    tracing::info!(player_id = id, total = self.registry.count(), "player left");
    self.events.push(GameEvent::PlayerDisconnect { id: id.to_string() });
    if self.phase == Phase::Waiting && self.registry.count() == 0 {
      self.cancel_timer(TimerKind::WaitingPoll);
    }
  }

  pub fn direction_change(&mut self, id: &str, direction: Direction) {
    if self.phase != Phase::Running {
      return;
    }
    if self.registry.queue_direction(id, direction) {
      let pending = self.registry.get(id).map_or(0, |player| player.pending.len());
      tracing::trace!(player_id = id, ?direction, pending, "direction queued");
    } else if self.registry.get(id).is_some() {
      tracing::debug!(player_id = id, ?direction, "intent queue full, dropping direction");
    }
  }

  pub fn timer_fired(&mut self, id: TimerId) {
    if self.timers.get(&id.kind) != Some(&id) {
      tracing::trace!(?id, "ignoring stale timer");
      return;
    }
    match id.kind {
      TimerKind::WaitingPoll => self.poll_waiting(),
      TimerKind::Tick => self.tick(),
      TimerKind::Cooldown => self.enter_waiting(),
    }
  }

  pub fn snapshot(&self) -> TickSnapshot {
    TickSnapshot {
      tick: self.tick,
      board: self.board.snapshot(),
      players: self
        .registry
        .all()
        .iter()
        .filter_map(PlayerSnapshot::from_player)
        .collect(),
    }
  }

  fn poll_waiting(&mut self) {
    if self.phase != Phase::Waiting {
      return;
    }
    if self.registry.count() >= self.config.min_players {
      self.start_round();
    }
  }

  fn start_round(&mut self) {
    self.cancel_timer(TimerKind::WaitingPoll);
    self.board.reset();
    self.round += 1;
    self.tick = 0;
    self.last_survivor = None;

    let config = Arc::clone(&self.config);
    for (index, player) in self.registry.all_mut().iter_mut().enumerate() {
      player.pending.clear();
      player.cycle = None;
      let (Some(slot), Some(color)) = (config.start_slots.get(index), config.colors.get(index).copied())
      else {
        tracing::warn!(player_id = %player.id, "no start slot left, player spectates");
        continue;
      };
      if let Err(error) = self.board.mark_occupied(slot.position, color) {
        tracing::warn!(player_id = %player.id, %error, "start slot unusable, player spectates");
        continue;
      }
      player.cycle = Some(Cycle {
        position: slot.position,
        color,
        last_direction: slot.direction,
        alive: true,
      });
    }

    self.phase = Phase::Running;
    self.start_timer(TimerKind::Tick, self.config.tick_interval, true);
    let snapshot = self.snapshot();
    tracing::info!(round = self.round, players = snapshot.players.len(), "round started");
    self.events.push(GameEvent::RoundStart {
      round: self.round,
      players: snapshot.players,
    });
  }

  fn tick(&mut self) {
    if self.phase != Phase::Running {
      return;
    }
    let outcome = engine::step(&mut self.board, self.registry.all_mut());
    self.tick += 1;
    if let Some(first) = outcome.eliminated.first() {
      self.last_survivor = Some(first.clone());
    }
    self.events.push(GameEvent::Tick(self.snapshot()));
    if outcome.round_over() {
      self.end_round();
    }
  }

  fn end_round(&mut self) {
    self.cancel_timer(TimerKind::Tick);
    self.phase = Phase::Ended;
    tracing::info!(
      round = self.round,
      ticks = self.tick,
      survivor = self.last_survivor.as_deref().unwrap_or("none"),
      "round ended"
    );
    self.events.push(GameEvent::GameEnd {
      round: self.round,
      survivor_id: self.last_survivor.clone(),
    });
    self.start_timer(TimerKind::Cooldown, self.config.cooldown, false);
  }

  /// The poll only runs while somebody is connected; an empty room keeps no
  /// timers alive.
  fn enter_waiting(&mut self) {
    self.cancel_timer(TimerKind::Cooldown);
    self.phase = Phase::Waiting;
    if self.registry.count() > 0 {
      self.start_timer(TimerKind::WaitingPoll, self.config.waiting_poll, true);
    }
  }

  fn start_timer(&mut self, kind: TimerKind, period: Duration, repeating: bool) {
    self.cancel_timer(kind);
    self.next_generation += 1;
    let id = TimerId {
      kind,
      generation: self.next_generation,
    };
    if repeating {
      self.scheduler.start_repeating(id, period);
    } else {
      self.scheduler.start_once(id, period);
    }
    self.timers.insert(kind, id);
  }

  fn cancel_timer(&mut self, kind: TimerKind) {
    if let Some(id) = self.timers.remove(&kind) {
      self.scheduler.cancel(id);
    }
  }
}
