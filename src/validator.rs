//! Move legality.
//!
//! Pure functions over a hand and the board's current [`Ends`]. A tile is
//! playable iff one of its pips equals the left or the right end value.

use crate::board::{End, Ends};
use crate::tile::Tile;

/// A tile paired with the end it attaches to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub tile: Tile,
    pub end: End,
}

impl Move {
    pub fn new(tile: Tile, end: End) -> Self {
        Self { tile, end }
    }
}

/// Outcome of checking one tile against the ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCheck {
    pub valid: bool,
    pub ends: Vec<End>,
}

pub fn validate_move(tile: Tile, ends: Ends) -> MoveCheck {
    let valid_ends = ends.matching(tile);
    MoveCheck {
        valid: !valid_ends.is_empty(),
        ends: valid_ends,
    }
}

/// Tiles in `hand` with at least one valid end.
///
/// Empty exactly when the holder must draw or pass.
pub fn playable_tiles(hand: &[Tile], ends: Ends) -> Vec<Tile> {
    hand.iter()
        .copied()
        .filter(|&t| tile_fits(t, ends))
        .collect()
}

pub fn has_any_legal_move(hand: &[Tile], ends: Ends) -> bool {
    hand.iter().any(|&t| tile_fits(t, ends))
}

/// Every legal (tile, end) pair, in hand order with left before right.
pub fn legal_moves(hand: &[Tile], ends: Ends) -> Vec<Move> {
    hand.iter()
        .flat_map(|&t| {
            validate_move(t, ends)
                .ends
                .into_iter()
                .map(move |e| Move::new(t, e))
        })
        .collect()
}

#[inline]
fn tile_fits(tile: Tile, ends: Ends) -> bool {
    tile.has(ends.left) || tile.has(ends.right)
}
