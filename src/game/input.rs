use super::types::Direction;

/// Accepts the four direction names, case-insensitive and trimmed. Anything
/// else is dropped by the caller without a reply.
pub fn parse_direction(value: &str) -> Option<Direction> {
  match value.trim().to_ascii_lowercase().as_str() {
    "up" => Some(Direction::Up),
    "down" => Some(Direction::Down),
    "left" => Some(Direction::Left),
    "right" => Some(Direction::Right),
    _ => None,
  }
}
