pub const DEFAULT_ROOM: &str = "main";
pub const MAX_ROOM_NAME_LENGTH: usize = 32;

/// Lowercased `[a-z0-9_-]` prefix of the requested room, `main` when nothing
/// usable is left.
pub fn room_key(value: &str) -> String {
  let cleaned: String = value
    .trim()
    .chars()
    .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
    .map(|ch| ch.to_ascii_lowercase())
    .take(MAX_ROOM_NAME_LENGTH)
    .collect();
  if cleaned.is_empty() {
    DEFAULT_ROOM.to_string()
  } else {
    cleaned
  }
}
