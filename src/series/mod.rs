//! Best-of-3 decider for the final two players.
//!
//! Once exactly two players are alive, eliminations stop and the pair plays
//! up to three rounds. Roles are fixed once per series by a coin flip:
//!
//! | Round | Attacker   | Defender   | Category                                   |
//! |-------|------------|------------|--------------------------------------------|
//! | 1     | challenger | defender   | defender's home category                   |
//! | 2     | defender   | challenger | challenger's home category                 |
//! | 3     | coin flip  | the other  | random, excluding both homes and rounds 1-2 |
//!
//! The first player to two round wins takes the floor.

mod manager;

pub use manager::{RoundPlan, SeriesManager, SeriesVerdict, Stage};
