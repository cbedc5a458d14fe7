//! Prompt image rotation.
//!
//! Each correct answer (and each finished pass) shows the next prompt image
//! for the duel's category. Images are drawn without repetition until a
//! category's pool is exhausted, then the whole pool is eligible again.
//!
//! Usage history is keyed by category name and lives as long as the board,
//! so a category that changes hands through inheritance keeps its history.

use rustc_hash::{FxHashMap, FxHashSet};

use super::CategoryCatalog;
use crate::core::GameRng;

/// Tracks the active category and which of its images were already shown.
#[derive(Clone, Debug)]
pub struct ImageRotation {
    current: Option<String>,
    used: FxHashMap<String, FxHashSet<String>>,
    rng: GameRng,
}

impl ImageRotation {
    /// Create a rotation with its own random stream.
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self { current: None, used: FxHashMap::default(), rng }
    }

    /// Make `category` the active one. History is kept.
    pub fn start(&mut self, category: impl Into<String>) {
        self.current = Some(category.into());
    }

    /// Active category, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Pick the next image for the active category.
    ///
    /// Returns `None` when no category is active or its pool is empty.
    pub fn next(&mut self, catalog: &CategoryCatalog) -> Option<String> {
        let category = self.current.as_ref()?;
        let pool = catalog.images(category);
        if pool.is_empty() {
            return None;
        }

        let used = self.used.entry(category.clone()).or_default();
        let remaining: Vec<&String> = pool.iter().filter(|p| !used.contains(*p)).collect();
        let pick = if remaining.is_empty() {
            self.rng.choose(pool)?.clone()
        } else {
            (*self.rng.choose(&remaining)?).clone()
        };
        used.insert(pick.clone());
        Some(pick)
    }

    /// Deactivate without forgetting history.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Number of distinct images already shown for a category.
    #[must_use]
    pub fn shown(&self, category: &str) -> usize {
        self.used.get(category).map_or(0, FxHashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::from_image_paths([
            "a/categoryImages/Rivers/nile.png",
            "a/categoryImages/Rivers/amazon.png",
            "a/categoryImages/Rivers/volga.png",
            "a/categoryImages/Lakes/erie.png",
        ])
    }

    #[test]
    fn test_no_repeats_until_pool_exhausted() {
        let catalog = catalog();
        let mut rotation = ImageRotation::new(GameRng::new(11));
        rotation.start("Rivers");

        let mut seen: Vec<String> = (0..3).filter_map(|_| rotation.next(&catalog)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);

        // Pool exhausted: picks keep coming from the full pool.
        assert!(rotation.next(&catalog).is_some());
        assert_eq!(rotation.shown("Rivers"), 3);
    }

    #[test]
    fn test_inactive_or_empty_pool_yields_nothing() {
        let catalog = catalog();
        let mut rotation = ImageRotation::new(GameRng::new(1));
        assert_eq!(rotation.next(&catalog), None);

        rotation.start("Unknown");
        assert_eq!(rotation.next(&catalog), None);
    }

    #[test]
    fn test_history_survives_clear() {
        let catalog = catalog();
        let mut rotation = ImageRotation::new(GameRng::new(2));
        rotation.start("Lakes");
        assert!(rotation.next(&catalog).is_some());

        rotation.clear();
        assert_eq!(rotation.current(), None);
        assert_eq!(rotation.shown("Lakes"), 1);
    }
}
