//! Error taxonomy for board operations.
//!
//! Nothing here is fatal. Every error means "the request was not applied";
//! the board state is exactly what it was before the call.

use thiserror::Error;

use super::mode::Mode;
use super::tile::TileKey;

/// Why a board operation was not applied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The request is not valid in the current mode (or a duel/spin is running).
    #[error("`{action}` is not allowed while {mode}")]
    IllegalTransition { action: &'static str, mode: Mode },

    /// A selection search found no valid candidate.
    #[error("no eligible target: {0}")]
    NoEligibleTarget(String),

    /// The key does not lie on this board.
    #[error("tile {0} is not on the board")]
    UnknownTile(TileKey),

    /// The target is not orthogonally adjacent to the selected tile.
    #[error("tile {target} does not border {selected}")]
    NotAdjacent { selected: TileKey, target: TileKey },

    /// The target is owned by the challenger or by an eliminated player.
    #[error("tile {0} is not held by a live opponent")]
    NotAnEnemy(TileKey),

    /// The category is not among the offered choices.
    #[error("category `{0}` is not available")]
    UnknownCategory(String),

    /// A round start was requested before any category was armed.
    #[error("no category selected")]
    NoSelection,

    /// The board was destroyed; only `reset` is accepted.
    #[error("board has been torn down")]
    TornDown,

    /// A configuration document could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cause() {
        let err = GameError::IllegalTransition { action: "confirm_start", mode: Mode::Idle };
        assert_eq!(err.to_string(), "`confirm_start` is not allowed while idle");

        let err = GameError::NotAdjacent {
            selected: TileKey::new(0, 0),
            target: TileKey::new(2, 2),
        };
        assert_eq!(err.to_string(), "tile 2-2 does not border 0-0");
    }
}
