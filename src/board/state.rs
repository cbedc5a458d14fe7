//! Tile and player arenas.
//!
//! `BoardState` is the single owner of every `Tile` and `Player`. Reads are
//! public; mutations are crate-private and only the controller performs
//! them, one complete outcome at a time, so the ownership partition holds
//! between any two public calls.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::info;

use crate::catalog::CategoryCatalog;
use crate::core::{Grid, GameRng, Player, PlayerId, PlayerMap, Tile, TileKey};

/// Tiles, players and grid geometry for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    grid: Grid,
    tiles: Vec<Tile>,
    players: PlayerMap<Player>,
}

impl BoardState {
    /// Deal a fresh board: one player per tile, home categories drawn from a
    /// shuffled copy of the catalog and assigned by `id % catalog_len`.
    pub fn new(grid_size: u8, catalog: &CategoryCatalog, rng: &mut GameRng) -> Self {
        let grid = Grid::new(grid_size);
        let deck = catalog.shuffled(rng);

        let tiles = grid
            .keys()
            .map(|key| Tile { key, owner: Some(grid.home_player(key)), has_battled: false })
            .collect();

        let players = PlayerMap::new(grid.tile_count(), |id| {
            let home = TileKey::new(id.0 / grid_size, id.0 % grid_size);
            Player::new(id, deck[id.index() % deck.len()].clone(), home)
        });

        Self { grid, tiles, players }
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Every tile, row-major.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, key: TileKey) -> Option<&Tile> {
        if !self.grid.contains(key) {
            return None;
        }
        self.tiles.get(self.grid.index(key))
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<Player> {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Owner of a tile, alive or not.
    #[must_use]
    pub fn owner_of(&self, key: TileKey) -> Option<&Player> {
        self.tile(key)?.owner.and_then(|id| self.players.get(id))
    }

    fn live_owner(&self, key: TileKey) -> Option<&Player> {
        self.owner_of(key).filter(|p| p.alive)
    }

    /// Ids of live players, ascending.
    #[must_use]
    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.players.values().filter(|p| p.alive).map(|p| p.id).collect()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.alive).count()
    }

    /// Neighbours of `key` held by a live player other than its owner.
    #[must_use]
    pub fn enemy_neighbors(&self, key: TileKey) -> SmallVec<[TileKey; 4]> {
        let Some(owner) = self.tile(key).and_then(|t| t.owner) else {
            return SmallVec::new();
        };
        self.grid
            .neighbors(key)
            .into_iter()
            .filter(|n| self.live_owner(*n).is_some_and(|p| p.id != owner))
            .collect()
    }

    /// Tiles that may start a random battle.
    ///
    /// Drawn from players who have not battled yet; once every live player
    /// has, from all live players. A tile qualifies if it borders a live enemy.
    #[must_use]
    pub fn candidates(&self) -> Vec<TileKey> {
        let alive: Vec<&Player> = self.players.values().filter(|p| p.alive).collect();
        let fresh: Vec<&Player> = alive.iter().copied().filter(|p| !p.has_battled).collect();
        let pool = if fresh.is_empty() { alive } else { fresh };

        pool.iter()
            .flat_map(|p| p.tiles.iter().copied())
            .filter(|key| !self.enemy_neighbors(*key).is_empty())
            .collect()
    }

    /// First (winner tile, enemy tile) pair where the enemy is live and
    /// currently holds `category`.
    #[must_use]
    pub fn find_pair_for_category(&self, winner: PlayerId, category: &str) -> Option<(TileKey, TileKey)> {
        self.find_border_pair(winner, |owner| owner.category == category)
    }

    /// First (attacker tile, defender tile) pair between two players.
    #[must_use]
    pub fn find_adjacent_pair(&self, attacker: PlayerId, defender: PlayerId) -> Option<(TileKey, TileKey)> {
        self.find_border_pair(attacker, |owner| owner.id == defender)
    }

    fn find_border_pair(
        &self,
        from: PlayerId,
        accept: impl Fn(&Player) -> bool,
    ) -> Option<(TileKey, TileKey)> {
        let player = self.players.get(from)?;
        player.tiles.iter().find_map(|&own| {
            self.grid
                .neighbors(own)
                .into_iter()
                .find(|n| self.live_owner(*n).is_some_and(|p| p.id != from && accept(p)))
                .map(|n| (own, n))
        })
    }

    /// True when live players' tiles exactly cover the board, tile owners
    /// agree with player tile sets, and eliminated players hold nothing.
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        let owned: usize = self.players.values().filter(|p| p.alive).map(Player::territory).sum();
        let dead_hold_nothing =
            self.players.values().filter(|p| !p.alive).all(|p| p.tiles.is_empty());
        let consistent = self.tiles.iter().all(|t| {
            t.owner
                .and_then(|id| self.players.get(id))
                .is_some_and(|p| p.alive && p.tiles.contains(&t.key))
        });
        owned == self.tiles.len() && dead_hold_nothing && consistent
    }

    pub(crate) fn mark_battled(&mut self, attacker_tile: TileKey, defender_tile: TileKey) {
        for key in [attacker_tile, defender_tile] {
            let Some(owner) = self.tile(key).and_then(|t| t.owner) else { continue };
            let index = self.grid.index(key);
            self.tiles[index].has_battled = true;
            if let Some(player) = self.players.get_mut(owner) {
                player.has_battled = true;
            }
        }
    }

    /// Eliminate `loser` and hand every one of its tiles to `winner`.
    ///
    /// Returns the keys that changed hands.
    pub(crate) fn eliminate(&mut self, loser: PlayerId, winner: PlayerId) -> Vec<TileKey> {
        let moved: Vec<TileKey> = match self.players.get_mut(loser) {
            Some(player) => {
                player.alive = false;
                std::mem::take(&mut player.tiles).into_iter().collect()
            }
            None => return Vec::new(),
        };

        for key in &moved {
            let index = self.grid.index(*key);
            self.tiles[index].owner = Some(winner);
        }
        if let Some(player) = self.players.get_mut(winner) {
            player.tiles.extend(moved.iter().copied());
        }

        info!(%loser, %winner, tiles = moved.len(), "player eliminated");
        moved
    }

    /// Replace a player's home category.
    pub(crate) fn set_category(&mut self, player: PlayerId, category: String) {
        if let Some(p) = self.players.get_mut(player) {
            p.category = category;
        }
    }
}
