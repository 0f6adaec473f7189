//! Constants for the double-six tile set, seating, scoring, and AI weights.
//!
//! All rule parameters live here so the engine modules never carry magic numbers.

// =============================================================================
// Tile Set Geometry
// =============================================================================

/// Highest pip value on a double-six tile.
pub const MAX_PIP: u8 = 6;

/// Number of distinct tiles in a double-six set: (MAX_PIP + 1)(MAX_PIP + 2) / 2.
pub const TILE_COUNT: usize = 28;

// =============================================================================
// Seating and Dealing
// =============================================================================

/// Fewest seats a round can be played with.
pub const MIN_SEATS: usize = 2;

/// Most seats a round can be played with.
pub const MAX_SEATS: usize = 4;

/// Tiles dealt to each hand with two or three seats.
pub const HAND_SIZE: usize = 7;

/// Tiles dealt to each hand with four seats.
pub const HAND_SIZE_FOUR_SEATS: usize = 6;

/// Hand size for a given seat count.
pub const fn hand_size(seats: usize) -> usize {
    if seats == 4 { HAND_SIZE_FOUR_SEATS } else { HAND_SIZE }
}

// =============================================================================
// Scoring
// =============================================================================

/// Cumulative score that ends a race-to-100 match.
pub const TARGET_SCORE: u32 = 100;

/// Points awarded per round win in the block modality.
pub const BLOCK_ROUND_POINTS: u32 = 1;

// =============================================================================
// Scored-lookahead AI Weights
// =============================================================================

/// Bonus for shedding a double.
pub const DOUBLE_BONUS: i32 = 20;

/// Bonus per remaining tile that still fits one of the resulting ends.
pub const COMPATIBLE_WEIGHT: i32 = 5;

/// Penalty for leaving an end that many tiles can answer.
pub const COMMON_END_PENALTY: i32 = 5;

/// End values treated as "common".
pub const COMMON_END_VALUES: [u8; 2] = [3, 4];
