use super::constants::MAX_BOARD_CELLS;
use super::types::{Color, Position};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
  #[error("position ({x}, {y}) is outside the board")]
  OutOfBounds { x: i32, y: i32 },
  #[error("board size {width}x{height} is not between 1 and {max} cells")]
  InvalidSize { width: i32, height: i32, max: usize },
}

/// Row-major grid of trail cells. Cells only go from empty to owned within a
/// round; `reset` is the only way back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
  width: i32,
  height: i32,
  cells: Vec<Option<Color>>,
}

impl Board {
  pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
    let cells = usize::try_from(width)
      .ok()
      .zip(usize::try_from(height).ok())
      .and_then(|(columns, rows)| columns.checked_mul(rows))
      .filter(|&count| count > 0 && count <= MAX_BOARD_CELLS)
      .ok_or(BoardError::InvalidSize {
        width,
        height,
        max: MAX_BOARD_CELLS,
      })?;
    Ok(Self {
      width,
      height,
      cells: vec![None; cells],
    })
  }

  pub fn contains(&self, position: Position) -> bool {
    (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
  }

  pub fn reset(&mut self) {
    self.cells.fill(None);
  }

  pub fn mark_occupied(&mut self, position: Position, color: Color) -> Result<(), BoardError> {
    let index = self.index(position)?;
    self.cells[index] = Some(color);
    Ok(())
  }

  pub fn is_occupied(&self, position: Position) -> Result<bool, BoardError> {
    Ok(self.cell(position)?.is_some())
  }

  pub fn cell(&self, position: Position) -> Result<Option<Color>, BoardError> {
    let index = self.index(position)?;
    Ok(self.cells[index])
  }

  /// `rows[y][x]`, as sent to clients.
  pub fn snapshot(&self) -> Vec<Vec<Option<Color>>> {
    self
      .cells
      .chunks(self.width as usize)
      .map(|row| row.to_vec())
      .collect()
  }

  fn index(&self, position: Position) -> Result<usize, BoardError> {
    if !self.contains(position) {
      return Err(BoardError::OutOfBounds {
        x: position.x,
        y: position.y,
      });
    }
    Ok((position.y * self.width + position.x) as usize)
  }
}
