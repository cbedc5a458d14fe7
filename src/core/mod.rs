//! Core types: players, tiles, RNG, configuration, modes and errors.
//!
//! Everything here is plain data. The state machines that mutate it live in
//! `board`, `battle`, `series`, `selector` and `overlay`.

pub mod player;
pub mod tile;
pub mod rng;
pub mod config;
pub mod mode;
pub mod error;

pub use player::{Player, PlayerId, PlayerMap, PALETTE};
pub use tile::{Grid, Tile, TileKey};
pub use rng::{GameRng, GameRngState};
pub use config::{GameConfig, DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use mode::Mode;
pub use error::GameError;
