use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
  WaitingPoll,
  Tick,
  Cooldown,
}

/// A timer instance. The generation makes a fire that was already queued when
/// its timer got cancelled distinguishable from the replacement timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
  pub kind: TimerKind,
  pub generation: u64,
}

/// Where the lifecycle controller gets its clock from. Fires come back to the
/// controller as `TimerId`s through whatever drives it.
pub trait Scheduler {
  fn start_repeating(&mut self, id: TimerId, period: Duration);
  fn start_once(&mut self, id: TimerId, delay: Duration);
  /// Cancelling an unknown or finished timer is a no-op.
  fn cancel(&mut self, id: TimerId);
}

/// Runs each timer as a tokio task that posts its id into the room's channel.
#[derive(Debug)]
pub struct TokioScheduler {
  fires: UnboundedSender<TimerId>,
  tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
  pub fn new(fires: UnboundedSender<TimerId>) -> Self {
    Self {
      fires,
      tasks: HashMap::new(),
    }
  }

  fn spawn(&mut self, id: TimerId, handle: JoinHandle<()>) {
    if let Some(previous) = self.tasks.insert(id, handle) {
      previous.abort();
    }
    self.tasks.retain(|_, task| !task.is_finished());
  }
}

impl Scheduler for TokioScheduler {
  fn start_repeating(&mut self, id: TimerId, period: Duration) {
    let fires = self.fires.clone();
    let handle = tokio::spawn(async move {
      let mut interval = tokio::time::interval(period);
      interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
      // the first tick completes immediately
      interval.tick().await;
      loop {
        interval.tick().await;
        if fires.send(id).is_err() {
          break;
        }
      }
    });
    self.spawn(id, handle);
  }

  fn start_once(&mut self, id: TimerId, delay: Duration) {
    let fires = self.fires.clone();
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = fires.send(id);
    });
    self.spawn(id, handle);
  }

  fn cancel(&mut self, id: TimerId) {
    if let Some(task) = self.tasks.remove(&id) {
      task.abort();
    }
  }
}

impl Drop for TokioScheduler {
  fn drop(&mut self) {
    for (_, task) in self.tasks.drain() {
      task.abort();
    }
  }
}

/// Records timers instead of running them; tests fire them by hand.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualScheduler {
  pub active: HashMap<TimerId, (Duration, bool)>,
}

#[cfg(test)]
impl ManualScheduler {
  pub fn active_of(&self, kind: TimerKind) -> Vec<TimerId> {
    let mut ids: Vec<TimerId> = self.active.keys().filter(|id| id.kind == kind).copied().collect();
    ids.sort_by_key(|id| id.generation);
    ids
  }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
  fn start_repeating(&mut self, id: TimerId, period: Duration) {
    self.active.insert(id, (period, true));
  }

  fn start_once(&mut self, id: TimerId, delay: Duration) {
    self.active.insert(id, (delay, false));
  }

  fn cancel(&mut self, id: TimerId) {
    self.active.remove(&id);
  }
}
