//! # tile-duel
//!
//! Orchestration core for a tile-capture trivia party game.
//!
//! Every player starts on one tile of a square grid with a home category.
//! A randomly chosen challenger attacks a bordering enemy in a timed
//! "who answers first" duel; the loser is eliminated and the winner takes
//! all of their tiles. When two players remain they play a best-of-3, and
//! the last one standing wins the floor.
//!
//! ## Design Principles
//!
//! 1. **Single owner**: `BoardController` owns the tile and player arenas.
//!    Sub-state-machines get read-only views or a `TurnContext` and report
//!    changes through return values.
//!
//! 2. **Simulated time**: all delayed work is an `Alarm` on a `Scheduler`.
//!    Hosts drive time with `BoardController::advance`, so tests are exact
//!    and teardown is a matter of cancelling handles.
//!
//! 3. **Deterministic**: one seeded `GameRng` makes every random decision.
//!
//! 4. **Headless**: drawing and audio go through the `Renderer` trait; the
//!    host UI listens to typed `GameEvent`s.
//!
//! ## Modules
//!
//! - `core`: ids, tiles, players, RNG, configuration, modes and errors
//! - `catalog`: category names and prompt image pools
//! - `schedule`: simulated-time alarm queue
//! - `events`: status events, observers and the event log
//! - `render`: the rendering seam
//! - `battle`: duel clocks
//! - `series`: best-of-3 decider
//! - `selector`: random challenger spin
//! - `overlay`: post-duel category choice
//! - `board`: arenas and the top-level state machine

pub mod core;
pub mod catalog;
pub mod schedule;
pub mod events;
pub mod render;
pub mod context;
pub mod battle;
pub mod series;
pub mod selector;
pub mod overlay;
pub mod board;

// Re-export commonly used types
pub use crate::core::{
    GameConfig, GameError, GameRng, GameRngState, Grid, Mode, Player, PlayerId, PlayerMap, Tile,
    TileKey,
};

pub use crate::catalog::{CategoryCatalog, ImageRotation};

pub use crate::schedule::{Alarm, Scheduler, TimerHandle};

pub use crate::events::{EventLog, GameEvent, Observers, SubscriptionId};

pub use crate::render::{CommandLog, HighlightStyle, NullRenderer, RenderCommand, Renderer, Tone};

pub use crate::context::TurnContext;

pub use crate::battle::{BattleClock, BattleResult, BattleSession, Contestant, Side};

pub use crate::series::{RoundPlan, SeriesManager, SeriesVerdict, Stage};

pub use crate::selector::RandomSelector;

pub use crate::overlay::CategoryOverlay;

pub use crate::board::{BoardController, BoardSnapshot, BoardState, PendingRound};
