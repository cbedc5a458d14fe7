//! The board: tile/player arenas and the orchestrating state machine.
//!
//! ## Modes
//!
//! ```text
//! Idle           --spin lands / select_challenger-->  ChooseTarget
//! Idle           --request_random_battle (2 left)-->  FinalReady
//! ChooseTarget   --pick_target-->                     ChooseTarget (armed)
//! ChooseTarget   --confirm_start-->                   Battle
//! FinalReady     --confirm_start-->                   Battle
//! Battle         --clock hits zero-->                 ChooseCategory | Idle | GameOver
//! ChooseCategory --start_category_round-->            Battle
//! ChooseCategory --go_back-->                         Idle
//! ```
//!
//! `BoardController` owns everything. Sub-state-machines (duel clock,
//! spin, series, overlay) never see the arenas mutably: they receive a
//! `TurnContext` or a read-only `BoardState` and report back through return
//! values.

mod state;
mod controller;

pub use state::BoardState;
pub use controller::{BoardController, BoardSnapshot, PendingRound};
