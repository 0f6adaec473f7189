use std::collections::VecDeque;
use std::fmt;

use crate::error::GameError;
use crate::tile::Tile;

/// One of the two open extremities of the chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum End {
    Left,
    Right,
}

impl End {
    pub const BOTH: [End; 2] = [End::Left, End::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            End::Left => "left",
            End::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<End> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Some(End::Left),
            "right" | "r" => Some(End::Right),
            _ => None,
        }
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The exposed pip values at both extremities of a non-empty chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ends {
    pub left: u8,
    pub right: u8,
}

impl Ends {
    pub fn get(self, end: End) -> u8 {
        match end {
            End::Left => self.left,
            End::Right => self.right,
        }
    }

    /// Ends whose value `tile` carries, left before right.
    pub fn matching(self, tile: Tile) -> Vec<End> {
        End::BOTH
            .into_iter()
            .filter(|&e| tile.has(self.get(e)))
            .collect()
    }
}

/// Where and how a tile sits in the chain.
///
/// The tile itself is never re-oriented; `flipped` says whether its low pip
/// faces left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub tile: Tile,
    pub flipped: bool,
    /// Offset from the opening tile: negative to the left, positive to the right.
    pub position: i32,
}

impl Placement {
    fn new(tile: Tile, left_pip: u8, position: i32) -> Self {
        Self {
            tile,
            flipped: tile.high() != left_pip,
            position,
        }
    }

    /// Pip value facing the left end of the chain.
    pub fn left_pip(&self) -> u8 {
        if self.flipped { self.tile.low() } else { self.tile.high() }
    }

    /// Pip value facing the right end of the chain.
    pub fn right_pip(&self) -> u8 {
        if self.flipped { self.tile.high() } else { self.tile.low() }
    }

    /// Doubles are laid across the line of play.
    pub fn is_crosswise(&self) -> bool {
        self.tile.is_double()
    }
}

/// The chain of placed tiles.
#[derive(Clone, Debug, Default)]
pub struct Board {
    chain: VecDeque<Placement>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Placements from the left extremity to the right extremity.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.chain.iter()
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.chain.iter().map(|p| p.tile)
    }

    /// Current open ends, or `None` before the opening tile.
    pub fn ends(&self) -> Option<Ends> {
        let first = self.chain.front()?;
        let last = self.chain.back()?;
        Some(Ends {
            left: first.left_pip(),
            right: last.right_pip(),
        })
    }

    pub fn clear(&mut self) {
        self.chain.clear();
    }

    /// Place the first tile of the round at the center.
    pub fn place_opening(&mut self, tile: Tile) -> Result<Ends, GameError> {
        if !self.is_empty() {
            return Err(GameError::InvariantViolation(format!(
                "opening {tile} on a board that already holds {} tiles",
                self.len()
            )));
        }
        self.chain.push_back(Placement::new(tile, tile.high(), 0));
        Ok(Ends {
            left: tile.high(),
            right: tile.low(),
        })
    }

    /// Attach `tile` at `end`, oriented so its matching side touches the chain.
    ///
    /// Returns the new exposed value at `end`. The board is unchanged on error.
    pub fn place_at(&mut self, tile: Tile, end: End) -> Result<u8, GameError> {
        let ends = self
            .ends()
            .ok_or_else(|| GameError::IllegalMove("board is empty; play the opening tile".into()))?;
        let target = ends.get(end);
        let exposed = tile.opposite_side(target).ok_or_else(|| {
            GameError::IllegalMove(format!("{tile} does not match {end} end {target}"))
        })?;

        match end {
            End::Left => {
                let position = self.chain.front().map_or(0, |p| p.position - 1);
                self.chain.push_front(Placement::new(tile, exposed, position));
            }
            End::Right => {
                let position = self.chain.back().map_or(0, |p| p.position + 1);
                self.chain.push_back(Placement::new(tile, target, position));
            }
        }
        Ok(exposed)
    }

    /// Ends at which `tile` could attach. Both ends when it matches both.
    pub fn legal_ends_for(&self, tile: Tile) -> Vec<End> {
        self.ends()
            .map(|ends| ends.matching(tile))
            .unwrap_or_default()
    }

    /// Verify that every joint matches and positions are contiguous.
    pub fn check_chain(&self) -> Result<(), GameError> {
        for (a, b) in self.chain.iter().zip(self.chain.iter().skip(1)) {
            if a.right_pip() != b.left_pip() {
                return Err(GameError::InvariantViolation(format!(
                    "joint mismatch between {} and {}",
                    a.tile, b.tile
                )));
            }
            if b.position != a.position + 1 {
                return Err(GameError::InvariantViolation(format!(
                    "position gap between {} and {}",
                    a.tile, b.tile
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for p in &self.chain {
            write!(f, "[{}|{}]", p.left_pip(), p.right_pip())?;
        }
        Ok(())
    }
}
