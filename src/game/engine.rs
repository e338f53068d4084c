use super::board::Board;
use super::types::{Player, Position};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
  /// Ids eliminated during this step, in join order.
  pub eliminated: Vec<String>,
  /// Participants still alive after the step.
  pub alive: usize,
}

impl StepOutcome {
  pub fn round_over(&self) -> bool {
    self.alive == 0
  }
}

/// Advances every living cycle by one cell.
///
/// Every candidate cell is checked against the board as it was before the
/// step, so the order players are visited in never decides who survives.
/// Two or more cycles entering the same free cell is a head-on collision and
/// eliminates all of them; the cell stays empty.
pub fn step(board: &mut Board, players: &mut [Player]) -> StepOutcome {
  let mut moves: Vec<(usize, Position)> = Vec::new();
  let mut eliminated: Vec<usize> = Vec::new();

  for (index, player) in players.iter_mut().enumerate() {
    let Some(cycle) = player.cycle.as_mut() else { continue };
    if !cycle.alive {
      continue;
    }
    let direction = player.pending.next_or(cycle.last_direction);
    cycle.last_direction = direction;
    let candidate = cycle.position.step(direction);

    match board.is_occupied(candidate) {
      Ok(false) => moves.push((index, candidate)),
      Ok(true) | Err(_) => eliminated.push(index),
    }
  }

  let mut claims: HashMap<Position, usize> = HashMap::new();
  for (_, candidate) in &moves {
    *claims.entry(*candidate).or_default() += 1;
  }

  for (index, candidate) in moves {
    let Some(cycle) = players[index].cycle.as_mut() else { continue };
    if claims.get(&candidate).copied().unwrap_or(0) > 1 {
      eliminated.push(index);
      continue;
    }
    match board.mark_occupied(candidate, cycle.color) {
      Ok(()) => cycle.position = candidate,
      Err(_) => eliminated.push(index),
    }
  }

  eliminated.sort_unstable();
  let mut outcome = StepOutcome::default();
  for index in eliminated {
    let player = &mut players[index];
    if let Some(cycle) = player.cycle.as_mut() {
      cycle.alive = false;
      tracing::debug!(
        player_id = %player.id,
        x = cycle.position.x,
        y = cycle.position.y,
        "cycle eliminated"
      );
    }
    outcome.eliminated.push(player.id.clone());
  }
  outcome.alive = players.iter().filter(|player| player.is_alive()).count();
  outcome
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::types::{Cycle, Direction};
  use proptest::prelude::*;

  fn racer(id: &str, x: i32, y: i32, direction: Direction, color: &'static str) -> Player {
    let mut player = Player::new(id.to_string(), id.to_string());
    player.cycle = Some(Cycle {
      position: Position::new(x, y),
      color,
      last_direction: direction,
      alive: true,
    });
    player
  }

  fn place(board: &mut Board, players: &[Player]) {
    for player in players {
      if let Some(cycle) = &player.cycle {
        board.mark_occupied(cycle.position, cycle.color).expect("start in bounds");
      }
    }
  }

  fn cycle(player: &Player) -> &Cycle {
    player.cycle.as_ref().expect("participant")
  }

  #[test]
  fn moves_one_cell_and_keeps_trail() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 1, 1, Direction::Down, "#p1"),
      racer("p2", 6, 1, Direction::Up, "#p2"),
    ];
    place(&mut board, &players);

    let outcome = step(&mut board, &mut players);

    assert!(outcome.eliminated.is_empty());
    assert_eq!(cycle(&players[0]).position, Position::new(1, 2));
    assert_eq!(board.cell(Position::new(1, 2)), Ok(Some("#p1")));
    assert_eq!(board.cell(Position::new(1, 1)), Ok(Some("#p1")));
    assert_eq!(cycle(&players[1]).position, Position::new(6, 0));
  }

  #[test]
  fn leaving_the_board_eliminates_in_place() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 0, 0, Direction::Down, "#p1"),
      racer("p2", 5, 5, Direction::Up, "#p2"),
    ];
    place(&mut board, &players);
    players[0].pending.push(Direction::Left);

    let outcome = step(&mut board, &mut players);

    assert_eq!(outcome.eliminated, vec!["p1".to_string()]);
    assert_eq!(outcome.alive, 1);
    let p1 = cycle(&players[0]);
    assert!(!p1.alive);
    assert_eq!(p1.position, Position::new(0, 0));
    assert_eq!(p1.last_direction, Direction::Left);
  }

  #[test]
  fn hitting_a_trail_eliminates() {
    let mut board = Board::new(8, 8).expect("valid size");
    board.mark_occupied(Position::new(3, 4), "#wall").expect("in bounds");
    let mut players = vec![racer("p1", 2, 4, Direction::Right, "#p1")];
    place(&mut board, &players);

    let outcome = step(&mut board, &mut players);

    assert!(outcome.round_over());
    assert_eq!(board.cell(Position::new(3, 4)), Ok(Some("#wall")));
    assert_eq!(cycle(&players[0]).position, Position::new(2, 4));
  }

  #[test]
  fn head_on_into_same_cell_eliminates_both() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 2, 3, Direction::Right, "#p1"),
      racer("p2", 4, 3, Direction::Left, "#p2"),
    ];
    place(&mut board, &players);

    let outcome = step(&mut board, &mut players);

    assert_eq!(outcome.eliminated, vec!["p1".to_string(), "p2".to_string()]);
    assert!(outcome.round_over());
    assert_eq!(board.is_occupied(Position::new(3, 3)), Ok(false));
  }

  #[test]
  fn swapping_cells_eliminates_both() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 2, 3, Direction::Right, "#p1"),
      racer("p2", 3, 3, Direction::Left, "#p2"),
    ];
    place(&mut board, &players);

    let outcome = step(&mut board, &mut players);

    assert_eq!(outcome.eliminated.len(), 2);
  }

  #[test]
  fn adjacent_targets_are_both_legal() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 2, 2, Direction::Down, "#p1"),
      racer("p2", 3, 2, Direction::Down, "#p2"),
    ];
    place(&mut board, &players);

    let outcome = step(&mut board, &mut players);

    assert!(outcome.eliminated.is_empty());
    assert_eq!(board.cell(Position::new(2, 3)), Ok(Some("#p1")));
    assert_eq!(board.cell(Position::new(3, 3)), Ok(Some("#p2")));
  }

  #[test]
  fn spectators_are_skipped() {
    let mut board = Board::new(8, 8).expect("valid size");
    let mut players = vec![
      racer("p1", 1, 1, Direction::Right, "#p1"),
      Player::new("late".to_string(), "Late".to_string()),
    ];
    place(&mut board, &players);
    players[1].pending.push(Direction::Up);

    let outcome = step(&mut board, &mut players);

    assert_eq!(outcome.alive, 1);
    assert!(players[1].cycle.is_none());
    assert_eq!(players[1].pending.len(), 1);
  }

  fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
      Just(Direction::Up),
      Just(Direction::Down),
      Just(Direction::Left),
      Just(Direction::Right),
    ]
  }

  fn arena() -> (Board, Vec<Player>) {
    let mut board = Board::new(12, 12).expect("valid size");
    let players = vec![
      racer("p1", 2, 2, Direction::Right, "#p1"),
      racer("p2", 9, 2, Direction::Down, "#p2"),
      racer("p3", 9, 9, Direction::Left, "#p3"),
      racer("p4", 2, 9, Direction::Up, "#p4"),
    ];
    place(&mut board, &players);
    (board, players)
  }

  fn enqueue(players: &mut [Player], intents: &[(usize, Direction)]) {
    for (slot, direction) in intents {
      let index = slot % players.len();
      players[index].pending.push(*direction);
    }
  }

  proptest! {
    #[test]
    fn identical_inputs_give_identical_rounds(
      intents in prop::collection::vec((0usize..4, arb_direction()), 0..40),
      ticks in 1usize..30,
    ) {
      let (mut board_a, mut players_a) = arena();
      let (mut board_b, mut players_b) = arena();
      enqueue(&mut players_a, &intents);
      enqueue(&mut players_b, &intents);

      for _ in 0..ticks {
        let outcome_a = step(&mut board_a, &mut players_a);
        let outcome_b = step(&mut board_b, &mut players_b);
        prop_assert_eq!(outcome_a, outcome_b);
      }
      prop_assert_eq!(board_a.snapshot(), board_b.snapshot());
      let cycles_a: Vec<_> = players_a.iter().map(|player| player.cycle.clone()).collect();
      let cycles_b: Vec<_> = players_b.iter().map(|player| player.cycle.clone()).collect();
      prop_assert_eq!(cycles_a, cycles_b);
    }

    #[test]
    fn each_tick_consumes_at_most_one_intent(
      intents in prop::collection::vec((0usize..4, arb_direction()), 0..40),
      ticks in 1usize..20,
    ) {
      let (mut board, mut players) = arena();
      enqueue(&mut players, &intents);

      for _ in 0..ticks {
        let before: Vec<(usize, bool)> = players
          .iter()
          .map(|player| (player.pending.len(), player.is_alive()))
          .collect();
        step(&mut board, &mut players);
        for (player, (len_before, was_alive)) in players.iter().zip(before) {
          let consumed = len_before - player.pending.len();
          if was_alive {
            prop_assert!(consumed <= 1);
          } else {
            prop_assert_eq!(consumed, 0);
          }
        }
      }
    }

    #[test]
    fn eliminated_cycles_stay_frozen(
      intents in prop::collection::vec((0usize..4, arb_direction()), 0..40),
      ticks in 1usize..40,
    ) {
      let (mut board, mut players) = arena();
      enqueue(&mut players, &intents);
      let mut frozen: Vec<Option<Cycle>> = vec![None; players.len()];

      for _ in 0..ticks {
        step(&mut board, &mut players);
        for (index, player) in players.iter().enumerate() {
          let current = cycle(player).clone();
          if let Some(previous) = &frozen[index] {
            prop_assert_eq!(previous, &current);
          } else if !current.alive {
            frozen[index] = Some(current);
          }
        }
      }
    }
  }
}
