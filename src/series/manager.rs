use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CategoryCatalog;
use crate::core::{GameRng, Player, PlayerId, PlayerMap};

/// Which category rule the next round follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Defender's home category, challenger attacks.
    Defender,
    /// Challenger's home category, roles swapped.
    Challenger,
    /// Neutral random category, coin-flip attacker.
    Random,
}

impl Stage {
    fn next(self) -> Stage {
        match self {
            Stage::Defender => Stage::Challenger,
            Stage::Challenger | Stage::Random => Stage::Random,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Stage::Defender => "defender",
            Stage::Challenger => "challenger",
            Stage::Random => "random neutral",
        }
    }
}

/// Pairing and category for one series round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub category: String,
    /// The stage this round was planned under.
    pub stage: Stage,
}

/// What the board should do after a series round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeriesVerdict {
    /// `winner` reached two round wins; `loser` is eliminated.
    Champion { winner: PlayerId, loser: PlayerId, status: String, hint: String },
    /// The series goes on.
    Continue { status: String, hint: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SeriesState {
    players: [PlayerId; 2],
    scores: [u8; 2],
    stage: Stage,
    challenger: PlayerId,
    defender: PlayerId,
}

impl SeriesState {
    fn slot(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| *p == player)
    }
}

/// Tracks the best-of-3 between the last two players.
#[derive(Clone, Debug, Default)]
pub struct SeriesManager {
    series: Option<SeriesState>,
    played: Vec<String>,
}

impl SeriesManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any series and forget played categories.
    pub fn reset(&mut self) {
        self.series = None;
        self.played.clear();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.series.is_some()
    }

    /// Start a series for `alive` if it holds exactly two players.
    ///
    /// Calling again with the same pair is a no-op, so roles are never
    /// reshuffled mid-series. Returns true when a new series was created.
    pub fn ensure_series(&mut self, alive: &[PlayerId], rng: &mut GameRng) -> bool {
        let &[a, b] = alive else {
            return false;
        };
        if let Some(series) = &self.series {
            if series.slot(a).is_some() && series.slot(b).is_some() {
                return false;
            }
        }

        let (challenger, defender) = if rng.coin_flip() { (a, b) } else { (b, a) };
        info!(%challenger, %defender, "best-of-3 series started");
        self.series = Some(SeriesState {
            players: [a, b],
            scores: [0, 0],
            stage: Stage::Defender,
            challenger,
            defender,
        });
        self.played.clear();
        true
    }

    /// Challenger and defender of record.
    #[must_use]
    pub fn roles(&self) -> Option<(PlayerId, PlayerId)> {
        self.series.as_ref().map(|s| (s.challenger, s.defender))
    }

    /// Stage the next planned round will use.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.series.as_ref().map(|s| s.stage)
    }

    /// Round wins per player, in series order.
    #[must_use]
    pub fn scores(&self) -> Option<[(PlayerId, u8); 2]> {
        self.series.as_ref().map(|s| {
            [(s.players[0], s.scores[0]), (s.players[1], s.scores[1])]
        })
    }

    /// Categories already fought over in this series.
    #[must_use]
    pub fn played_categories(&self) -> &[String] {
        &self.played
    }

    /// Plan the next round and advance the stage.
    ///
    /// The planned category is recorded as played, so a random round never
    /// repeats an earlier round's category.
    pub fn next_round_plan(
        &mut self,
        players: &PlayerMap<Player>,
        rng: &mut GameRng,
        catalog: &CategoryCatalog,
    ) -> Option<RoundPlan> {
        let series = self.series.as_mut()?;
        let challenger = players.get(series.challenger)?;
        let defender = players.get(series.defender)?;
        let stage = series.stage;

        let (attacker, defending, category) = match stage {
            Stage::Defender => (challenger.id, defender.id, defender.category.clone()),
            Stage::Challenger => (defender.id, challenger.id, challenger.category.clone()),
            Stage::Random => {
                let (attacker, defending) = if rng.coin_flip() {
                    (challenger.id, defender.id)
                } else {
                    (defender.id, challenger.id)
                };
                let mut exclude = self.played.clone();
                exclude.push(challenger.category.clone());
                exclude.push(defender.category.clone());
                (attacker, defending, catalog.pick_excluding(rng, &exclude))
            }
        };

        series.stage = stage.next();
        if !self.played.contains(&category) {
            self.played.push(category.clone());
        }
        debug!(?stage, %attacker, defender = %defending, category = %category, "series round planned");

        Some(RoundPlan { attacker, defender: defending, category, stage })
    }

    /// Record a round win.
    ///
    /// Returns `None` if no series is active or `winner` is not part of it.
    pub fn handle_result(
        &mut self,
        players: &PlayerMap<Player>,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Option<SeriesVerdict> {
        let series = self.series.as_mut()?;
        let winner_slot = series.slot(winner)?;
        series.scores[winner_slot] += 1;
        let winner_score = series.scores[winner_slot];
        let loser_score = series.slot(loser).map_or(0, |slot| series.scores[slot]);
        let next_stage = series.stage;

        let winner_name = players.get(winner).map_or("Winner", |p| p.name.as_str());

        if winner_score >= 2 {
            info!(%winner, %loser, "series decided");
            let verdict = SeriesVerdict::Champion {
                winner,
                loser,
                status: format!("{winner_name} wins the best-of-3 and the floor!"),
                hint: "Reset the scene to play again.".to_string(),
            };
            self.series = None;
            return Some(verdict);
        }

        info!(%winner, winner_score, loser_score, "series round won");
        Some(SeriesVerdict::Continue {
            status: format!("{winner_name} wins this round. Series score {winner_score}-{loser_score}."),
            hint: format!(
                "Next battle uses the {} category. Press Start Next Round to continue.",
                next_stage.label()
            ),
        })
    }
}
