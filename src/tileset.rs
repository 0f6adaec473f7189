//! Tile inventory, shuffling, dealing, and the draw pile.
//!
//! A [`TileSet`] is built once per round, shuffled, and dealt into [`Hand`]s.
//! Whatever is left after dealing becomes the draw pile, which is served
//! from its back like a stack.

use crate::constants::{MAX_PIP, MAX_SEATS, MIN_SEATS, TILE_COUNT, hand_size};
use crate::error::GameError;
use crate::tile::Tile;

/// The tiles held by one seat. Order carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    tiles: Vec<Tile>,
}

impl Hand {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    /// Sum of pips over every tile still held.
    pub fn pip_total(&self) -> u32 {
        self.tiles.iter().map(|t| t.total_pips()).sum()
    }

    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    /// Remove `tile`, returning false if it was not held.
    pub fn remove(&mut self, tile: Tile) -> bool {
        match self.tiles.iter().position(|&t| t == tile) {
            Some(i) => {
                self.tiles.swap_remove(i);
                true
            }
            None => false,
        }
    }
}

/// The round's tile inventory.
#[derive(Clone, Debug, Default)]
pub struct TileSet {
    /// Undealt tiles; after dealing this is the draw pile.
    tiles: Vec<Tile>,
    /// Tiles reported as placed on the board (statistics only).
    placed: Vec<Tile>,
}

impl TileSet {
    /// An empty set. Call [`TileSet::build`] before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly built, unshuffled double-six set.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.tiles = all_tiles();
        set
    }

    /// A set holding `tiles` in exactly the given order.
    ///
    /// Used to replay a known deal. Rejects duplicates.
    pub fn from_order(tiles: Vec<Tile>) -> Result<Self, GameError> {
        for (i, t) in tiles.iter().enumerate() {
            if tiles[..i].contains(t) {
                return Err(GameError::InvariantViolation(format!(
                    "tile {t} appears twice in the supplied order"
                )));
            }
        }
        Ok(Self {
            tiles,
            placed: Vec::new(),
        })
    }

    /// Populate the set with all 28 tiles.
    ///
    /// Fails if the set still holds tiles; call [`TileSet::reset`] first.
    pub fn build(&mut self) -> Result<(), GameError> {
        if !self.tiles.is_empty() || !self.placed.is_empty() {
            return Err(GameError::InvariantViolation(
                "build called on a non-empty tile set without reset".into(),
            ));
        }
        self.tiles = all_tiles();
        Ok(())
    }

    /// Return the set to its empty state.
    pub fn reset(&mut self) {
        self.tiles.clear();
        self.placed.clear();
    }

    /// Fisher-Yates shuffle: for i from the last index down to 1, swap
    /// element i with a uniformly chosen element in `0..=i`.
    pub fn shuffle(&mut self, rng: &mut fastrand::Rng) {
        for i in (1..self.tiles.len()).rev() {
            let j = rng.usize(0..=i);
            self.tiles.swap(i, j);
        }
    }

    /// Deal one hand per seat from the front of the set.
    ///
    /// Hands get 6 tiles with four seats and 7 otherwise. The remainder
    /// stays behind as the draw pile.
    pub fn deal(&mut self, seats: usize) -> Result<Vec<Hand>, GameError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
            return Err(GameError::InvalidConfig(format!(
                "seat count must be {MIN_SEATS}..={MAX_SEATS}, got {seats}"
            )));
        }
        let per_hand = hand_size(seats);
        if seats * per_hand > self.tiles.len() {
            return Err(GameError::InvalidConfig(format!(
                "cannot deal {seats} hands of {per_hand} from {} tiles",
                self.tiles.len()
            )));
        }

        let mut dealt = self.tiles.drain(..seats * per_hand);
        let hands = (0..seats)
            .map(|_| Hand::new(dealt.by_ref().take(per_hand).collect()))
            .collect();
        Ok(hands)
    }

    /// Pop the last tile of the draw pile, or `None` when it is exhausted.
    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }

    /// Tiles left in the draw pile.
    pub fn pile(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn pile_len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_pile_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn record_placed(&mut self, tile: Tile) {
        self.placed.push(tile);
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// The double with the highest pip value in `tiles`.
    pub fn largest_double(tiles: &[Tile]) -> Option<Tile> {
        tiles
            .iter()
            .copied()
            .filter(|t| t.is_double())
            .max_by_key(|t| t.high())
    }

    /// The tile with the most pips in `tiles`, ties going to the higher top pip.
    pub fn heaviest(tiles: &[Tile]) -> Option<Tile> {
        tiles
            .iter()
            .copied()
            .max_by_key(|t| (t.total_pips(), t.high()))
    }
}

/// Every unordered pair `(i, j)` with `i <= j <= MAX_PIP`.
fn all_tiles() -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(TILE_COUNT);
    for i in 0..=MAX_PIP {
        for j in i..=MAX_PIP {
            tiles.push(Tile::new(i, j));
        }
    }
    tiles
}
