//! Tile identity and grid geometry.
//!
//! The board is a fixed `size x size` lattice. Tiles are created once per
//! board and never destroyed; only their owner and battle flag change.
//! Neighbours are the four orthogonal cells, without wrap-around.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::PlayerId;

/// Stable tile identity derived from its grid position.
///
/// Ordered row-major, so sets of keys iterate top-left to bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub row: u8,
    pub col: u8,
}

impl TileKey {
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// One cell of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub key: TileKey,
    /// Current owner. Never `None` on a live board; kept optional so the
    /// renderer contract can express an unowned cell.
    pub owner: Option<PlayerId>,
    pub has_battled: bool,
}

/// Neighbour offsets in the order the board searches them: down, up, right, left.
const OFFSETS: [(i16, i16); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Grid geometry for a square board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: u8,
}

impl Grid {
    /// Create a grid. The caller is responsible for clamping `size`.
    #[must_use]
    pub const fn new(size: u8) -> Self {
        Self { size }
    }

    /// Edge length.
    #[must_use]
    pub const fn size(self) -> u8 {
        self.size
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn tile_count(self) -> usize {
        self.size as usize * self.size as usize
    }

    /// Check whether a key lies on this grid.
    #[must_use]
    pub const fn contains(self, key: TileKey) -> bool {
        key.row < self.size && key.col < self.size
    }

    /// Row-major arena index of a key.
    #[must_use]
    pub const fn index(self, key: TileKey) -> usize {
        key.row as usize * self.size as usize + key.col as usize
    }

    /// Id of the player that starts on `key`.
    #[must_use]
    pub const fn home_player(self, key: TileKey) -> PlayerId {
        PlayerId::new((key.row as usize * self.size as usize + key.col as usize) as u8)
    }

    /// All keys in row-major order.
    pub fn keys(self) -> impl Iterator<Item = TileKey> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| TileKey::new(row, col)))
    }

    /// Orthogonal neighbours of `key` that lie on the grid.
    #[must_use]
    pub fn neighbors(self, key: TileKey) -> SmallVec<[TileKey; 4]> {
        let size = self.size as i16;
        OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = key.row as i16 + dr;
                let c = key.col as i16 + dc;
                (r >= 0 && r < size && c >= 0 && c < size).then(|| TileKey::new(r as u8, c as u8))
            })
            .collect()
    }

    /// Check whether two keys are orthogonally adjacent.
    #[must_use]
    pub fn are_adjacent(self, a: TileKey, b: TileKey) -> bool {
        self.neighbors(a).contains(&b)
    }
}
