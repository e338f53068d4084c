pub const BOARD_WIDTH: i32 = 64;
pub const BOARD_HEIGHT: i32 = 48;
// Upper bound on width * height.
pub const MAX_BOARD_CELLS: usize = 65_536;
pub const TICK_MS: u64 = 100;
pub const COOLDOWN_MS: u64 = 3000;
pub const WAITING_POLL_MS: u64 = 1000;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PENDING_DIRECTIONS: usize = 16;

// Distance of the start slots from the walls.
pub const START_MARGIN: i32 = 4;

pub const COLOR_POOL: [&str; 5] = ["#ff6b6b", "#4dabf7", "#ffd166", "#06d6a0", "#845ef7"];
