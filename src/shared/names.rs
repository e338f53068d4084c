pub const MAX_PLAYER_NAME_LENGTH: usize = 16;
pub const MAX_PLAYER_ID_LENGTH: usize = 64;

pub fn sanitize_player_name(name: &str, fallback: &str) -> String {
  let cleaned = name
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .chars()
    .filter(|ch| !ch.is_control())
    .take(MAX_PLAYER_NAME_LENGTH)
    .collect::<String>();
  if cleaned.is_empty() {
    return fallback.to_string();
  }
  cleaned
}

/// Client-chosen ids are kept as long as they are short printable ASCII;
/// anything else gets `None` and the caller picks a fresh id.
pub fn sanitize_player_id(id: &str) -> Option<String> {
  let id = id.trim();
  if id.is_empty() || id.len() > MAX_PLAYER_ID_LENGTH {
    return None;
  }
  if !id.chars().all(|ch| ch.is_ascii_graphic()) {
    return None;
  }
  Some(id.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_collapse_whitespace_and_truncate() {
    assert_eq!(sanitize_player_name("  Neo   Anderson ", "Player"), "Neo Anderson");
    assert_eq!(sanitize_player_name("\t\n", "Player"), "Player");
    assert_eq!(
      sanitize_player_name("abcdefghijklmnopqrstuvwxyz", "Player").chars().count(),
      MAX_PLAYER_NAME_LENGTH
    );
  }

  #[test]
  fn ids_must_be_short_printable_ascii() {
    assert_eq!(sanitize_player_id(" abc-123 "), Some("abc-123".to_string()));
    assert_eq!(sanitize_player_id(""), None);
    assert_eq!(sanitize_player_id("has space"), None);
    assert_eq!(sanitize_player_id(&"x".repeat(65)), None);
  }
}
