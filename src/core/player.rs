//! Player identification and the player arena.
//!
//! ## PlayerId
//!
//! One player is created per starting tile, so ids are dense: the player that
//! starts on `(row, col)` has id `row * grid_size + col`.
//!
//! ## PlayerMap
//!
//! `Vec`-backed per-player storage indexed by `PlayerId`. The board owns the
//! only mutable `PlayerMap<Player>`; everything else sees snapshots.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::tile::TileKey;

/// Player identifier. Supports up to 255 players (a 10x10 board needs 100).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a board with `player_count` players.
    ///
    /// ```
    /// use tile_duel::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(9).collect();
    /// assert_eq!(players.len(), 9);
    /// assert_eq!(players[8], PlayerId::new(8));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 as u16 + 1)
    }
}

/// Tile colours handed to the renderer, cycled by player id.
pub const PALETTE: [u32; 10] = [
    0x1555e0, 0xffc542, 0x2ad4ff, 0xff6b81, 0x7dff6b, 0xf28bff, 0x4ae3b5, 0xff9f1c, 0x00c2a8,
    0xff2f92,
];

/// A contestant on the board.
///
/// `tiles` is an `im::OrdSet` so snapshots are O(1) and iteration order is
/// stable (row-major), which keeps pair searches deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: u32,
    /// Home category. Replaced when this player wins as a defender.
    pub category: String,
    pub alive: bool,
    pub tiles: OrdSet<TileKey>,
    pub has_battled: bool,
}

impl Player {
    /// Create a live player owning exactly its starting tile.
    pub fn new(id: PlayerId, category: impl Into<String>, home: TileKey) -> Self {
        let mut tiles = OrdSet::new();
        tiles.insert(home);
        Self {
            id,
            name: format!("Player {}", id.0 as u16 + 1),
            color: PALETTE[id.index() % PALETTE.len()],
            category: category.into(),
            alive: true,
            tiles,
            has_battled: false,
        }
    }

    /// Number of tiles currently owned.
    #[must_use]
    pub fn territory(&self) -> usize {
        self.tiles.len()
    }
}

/// Per-player storage with O(1) access.
///
/// ## Example
///
/// ```
/// use tile_duel::core::{PlayerId, PlayerMap};
///
/// let mut wins: PlayerMap<u32> = PlayerMap::new(4, |_| 0);
/// wins[PlayerId::new(1)] += 1;
/// assert_eq!(wins[PlayerId::new(1)], 1);
/// assert_eq!(wins.get(PlayerId::new(9)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    ///
    /// The factory receives the `PlayerId` for each player.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Look up a player's entry; `None` for ids outside the arena.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Mutable lookup; `None` for ids outside the arena.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all values in id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}
