//! Post-duel category choice.
//!
//! After a regular (non-series) win, the winner may pick one of the
//! categories held by live enemies bordering their territory and fight for
//! it straight away, or go back to the floor. The overlay only tracks the
//! offered choices and the armed selection; the board decides what a
//! choice leads to.

use tracing::debug;

use crate::board::BoardState;
use crate::core::{GameError, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Shown {
    winner: PlayerId,
    choices: Vec<String>,
    selected: Option<String>,
}

/// Category picker shown to a duel winner.
#[derive(Clone, Debug, Default)]
pub struct CategoryOverlay {
    shown: Option<Shown>,
}

impl CategoryOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Categories held by live enemies bordering `winner`, first-seen order,
    /// without duplicates and without the winner's own category.
    #[must_use]
    pub fn border_categories(board: &BoardState, winner: PlayerId) -> Vec<String> {
        let Some(player) = board.player(winner) else {
            return Vec::new();
        };
        let mut categories: Vec<String> = Vec::new();
        for &own in &player.tiles {
            for neighbor in board.grid().neighbors(own) {
                let Some(owner) = board.owner_of(neighbor) else { continue };
                if owner.id == winner || !owner.alive || owner.category == player.category {
                    continue;
                }
                if !categories.contains(&owner.category) {
                    categories.push(owner.category.clone());
                }
            }
        }
        categories
    }

    /// Present the choices for `winner`, replacing anything shown before.
    pub fn show(&mut self, board: &BoardState, winner: PlayerId) -> &[String] {
        let choices = Self::border_categories(board, winner);
        debug!(%winner, choices = choices.len(), "category overlay shown");
        let shown = self.shown.insert(Shown { winner, choices, selected: None });
        &shown.choices
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    /// The player choosing, while visible.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.shown.as_ref().map(|s| s.winner)
    }

    /// Offered categories (empty when hidden).
    #[must_use]
    pub fn choices(&self) -> &[String] {
        self.shown.as_ref().map(|s| s.choices.as_slice()).unwrap_or_default()
    }

    /// True when visible with nothing to offer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices().is_empty()
    }

    /// Arm `category`. Re-selecting replaces the previous choice.
    pub fn select(&mut self, category: &str) -> Result<(), GameError> {
        match self.shown.as_mut() {
            Some(shown) if shown.choices.iter().any(|c| c == category) => {
                shown.selected = Some(category.to_string());
                Ok(())
            }
            _ => Err(GameError::UnknownCategory(category.to_string())),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.shown.as_ref().and_then(|s| s.selected.as_deref())
    }

    /// Whether a round could start now.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.selected().is_some()
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;
    use crate::core::{GameRng, TileKey};

    fn board() -> BoardState {
        let catalog = CategoryCatalog::new(["A", "B", "C", "D", "E", "F", "G", "H", "I"]);
        BoardState::new(3, &catalog, &mut GameRng::new(4))
    }

    #[test]
    fn test_corner_sees_its_two_neighbors() {
        let board = board();
        let down = board.owner_of(TileKey::new(1, 0)).unwrap().category.clone();
        let right = board.owner_of(TileKey::new(0, 1)).unwrap().category.clone();

        let mut overlay = CategoryOverlay::new();
        assert_eq!(overlay.show(&board, PlayerId::new(0)), &[down, right]);
        assert!(!overlay.can_start());
    }

    #[test]
    fn test_duplicates_and_own_category_are_dropped() {
        let catalog = CategoryCatalog::new(["Same"]);
        let board = BoardState::new(2, &catalog, &mut GameRng::new(0));
        assert!(CategoryOverlay::border_categories(&board, PlayerId::new(0)).is_empty());

        let mut overlay = CategoryOverlay::new();
        overlay.show(&board, PlayerId::new(0));
        assert!(overlay.is_visible());
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_select_arms_only_offered_categories() {
        let board = board();
        let mut overlay = CategoryOverlay::new();
        let offered = overlay.show(&board, PlayerId::new(4)).to_vec();
        assert_eq!(offered.len(), 4);

        assert!(matches!(overlay.select("nope"), Err(GameError::UnknownCategory(_))));
        assert!(!overlay.can_start());

        overlay.select(&offered[2]).unwrap();
        assert_eq!(overlay.selected(), Some(offered[2].as_str()));
        assert!(overlay.can_start());

        overlay.hide();
        assert_eq!(overlay.selected(), None);
        assert!(overlay.select(&offered[0]).is_err());
    }
}
