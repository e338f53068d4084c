pub mod board;
pub mod constants;
pub mod engine;
pub mod input;
pub mod intent;
pub mod lifecycle;
pub mod registry;
pub mod room;
pub mod scheduler;
pub mod types;
