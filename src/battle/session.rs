//! Duel clock state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, TileKey};

/// One side of a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    /// The opposing side.
    #[must_use]
    pub const fn other(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Snapshot of a player taken when the duel starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: PlayerId,
    pub name: String,
}

/// Live state of one duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSession {
    pub attacker: Contestant,
    pub defender: Contestant,
    pub attacker_tile: TileKey,
    pub defender_tile: TileKey,
    pub attacker_time: Duration,
    pub defender_time: Duration,
    pub active: Side,
    pub category: String,
}

impl BattleSession {
    /// Start a session with both clocks full and the attacker active.
    pub fn new(
        attacker: Contestant,
        defender: Contestant,
        attacker_tile: TileKey,
        defender_tile: TileKey,
        category: impl Into<String>,
        max_time: Duration,
    ) -> Self {
        Self {
            attacker,
            defender,
            attacker_tile,
            defender_tile,
            attacker_time: max_time,
            defender_time: max_time,
            active: Side::Attacker,
            category: category.into(),
        }
    }

    /// Remaining time on one side's clock.
    #[must_use]
    pub fn time_left(&self, side: Side) -> Duration {
        match side {
            Side::Attacker => self.attacker_time,
            Side::Defender => self.defender_time,
        }
    }

    /// The contestant on one side.
    #[must_use]
    pub fn contestant(&self, side: Side) -> &Contestant {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }

    /// Run the active clock down by `dt`, clamping at zero.
    ///
    /// Returns the losing side once a clock is empty.
    pub fn tick(&mut self, dt: Duration) -> Option<Side> {
        match self.active {
            Side::Attacker => self.attacker_time = self.attacker_time.saturating_sub(dt),
            Side::Defender => self.defender_time = self.defender_time.saturating_sub(dt),
        }
        self.loser()
    }

    /// The side whose clock is empty, if any.
    #[must_use]
    pub fn loser(&self) -> Option<Side> {
        if self.attacker_time.is_zero() {
            Some(Side::Attacker)
        } else if self.defender_time.is_zero() {
            Some(Side::Defender)
        } else {
            None
        }
    }

    /// Register a correct answer from `side`.
    ///
    /// Only the active side can hand the clock over; a correct answer from
    /// the side that is already waiting changes nothing. Returns whether the
    /// active side flipped.
    pub fn answer_correct(&mut self, side: Side) -> bool {
        if self.active != side {
            return false;
        }
        self.active = side.other();
        true
    }

    /// Build the outcome for a given losing side.
    #[must_use]
    pub fn result(&self, loser: Side) -> BattleResult {
        let winner = loser.other();
        BattleResult {
            winner: self.contestant(winner).id,
            loser: self.contestant(loser).id,
            attacker: self.attacker.id,
            defender: self.defender.id,
            winner_was_attacker: winner == Side::Attacker,
            attacker_tile: self.attacker_tile,
            defender_tile: self.defender_tile,
            category: self.category.clone(),
            winner_time_left: self.time_left(winner),
        }
    }
}

/// Outcome of a finished duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub winner_was_attacker: bool,
    pub attacker_tile: TileKey,
    pub defender_tile: TileKey,
    pub category: String,
    pub winner_time_left: Duration,
}
