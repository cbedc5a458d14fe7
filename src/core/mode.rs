//! Top-level board modes.

use serde::{Deserialize, Serialize};

/// Where the board's state machine currently is.
///
/// `Idle -> ChooseTarget -> Battle -> ChooseCategory -> Idle | GameOver`,
/// with `FinalReady` replacing `ChooseTarget` while a best-of-3 round is
/// being prepared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Waiting for a random challenger request.
    #[default]
    Idle,
    /// A challenger is selected; waiting for a target tile and confirmation.
    ChooseTarget,
    /// A duel is in progress (including its countdown).
    Battle,
    /// A winner is picking the next bordering category to fight over.
    ChooseCategory,
    /// A best-of-3 round is planned and waiting for confirmation.
    FinalReady,
    /// One player remains. Terminal until reset.
    GameOver,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Mode::Idle => "idle",
            Mode::ChooseTarget => "choosing a target",
            Mode::Battle => "a battle is running",
            Mode::ChooseCategory => "choosing a category",
            Mode::FinalReady => "a final round is ready",
            Mode::GameOver => "the game is over",
        };
        f.write_str(label)
    }
}
