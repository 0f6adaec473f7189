//! Domino tile value object.
//!
//! A tile is an unordered pair of pip values in `0..=MAX_PIP`. It is stored
//! normalized with the higher pip first, so `(3,5)` and `(5,3)` compare,
//! hash, and print identically. Orientation on the table is recorded by the
//! board's placement records, never by mutating the tile.

use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_PIP;
use crate::error::GameError;

/// An immutable domino tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    high: u8,
    low: u8,
}

impl Tile {
    /// Create a tile from two pip values in either order.
    ///
    /// # Panics
    /// Panics if either value exceeds [`MAX_PIP`]. Use [`Tile::try_new`] for
    /// untrusted input.
    pub const fn new(a: u8, b: u8) -> Self {
        assert!(a <= MAX_PIP && b <= MAX_PIP, "pip value out of range");
        if a >= b {
            Tile { high: a, low: b }
        } else {
            Tile { high: b, low: a }
        }
    }

    /// Fallible constructor for values coming from outside the engine.
    pub fn try_new(a: u8, b: u8) -> Result<Self, GameError> {
        if a > MAX_PIP || b > MAX_PIP {
            return Err(GameError::InvalidTile(format!(
                "pips ({a},{b}) outside 0..={MAX_PIP}"
            )));
        }
        Ok(Tile::new(a, b))
    }

    /// The two pip values, higher first.
    #[inline]
    pub fn pips(self) -> (u8, u8) {
        (self.high, self.low)
    }

    #[inline]
    pub fn high(self) -> u8 {
        self.high
    }

    #[inline]
    pub fn low(self) -> u8 {
        self.low
    }

    #[inline]
    pub fn is_double(self) -> bool {
        self.high == self.low
    }

    #[inline]
    pub fn total_pips(self) -> u32 {
        (self.high + self.low) as u32
    }

    /// True if either side shows `value`.
    #[inline]
    pub fn has(self, value: u8) -> bool {
        self.high == value || self.low == value
    }

    /// The pip value on the far side when `connected` is the touching side.
    ///
    /// Returns `None` if `connected` appears on neither side.
    #[inline]
    pub fn opposite_side(self, connected: u8) -> Option<u8> {
        if self.high == connected {
            Some(self.low)
        } else if self.low == connected {
            Some(self.high)
        } else {
            None
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.high, self.low)
    }
}

/// Accepts `6-3`, `6|3`, `6,3`, `63` and bracketed forms such as `[6|3]`.
impl FromStr for Tile {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .trim()
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')'])
            .split(|c: char| c == '-' || c == '|' || c == ',')
            .flat_map(|part| part.trim().bytes())
            .collect();

        if digits.len() != 2 || !digits.iter().all(u8::is_ascii_digit) {
            return Err(GameError::InvalidTile(format!("cannot parse '{s}'")));
        }
        Tile::try_new(digits[0] - b'0', digits[1] - b'0')
    }
}
