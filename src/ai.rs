//! AI move selection.
//!
//! Three interchangeable policies, one per [`Difficulty`]:
//! - [`RandomStrategy`] - uniform over legal (tile, end) pairs
//! - [`GreedyStrategy`] - heaviest tile first, end that keeps its own hand least connected
//! - [`ScoredStrategy`] - static one-ply score per (tile, end) pair
//!
//! Every policy only picks from [`legal_moves`], so it can never produce an
//! illegal move. With no legal move it draws if the pile allows, else passes.

use crate::board::{End, Ends};
use crate::config::Difficulty;
use crate::constants::{COMMON_END_PENALTY, COMMON_END_VALUES, COMPATIBLE_WEIGHT, DOUBLE_BONUS};
use crate::tile::Tile;
use crate::validator::{Move, legal_moves};

/// What a seat does on its turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Play(Move),
    Draw,
    Pass,
}

/// A move-selection policy.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Pick one legal move, or `None` if `hand` has none.
    fn choose_move(&mut self, hand: &[Tile], ends: Ends) -> Option<Move>;

    /// Full decision including the draw/pass fallback.
    fn decide(&mut self, hand: &[Tile], ends: Ends, can_draw: bool) -> Decision {
        match self.choose_move(hand, ends) {
            Some(mv) => Decision::Play(mv),
            None if can_draw => Decision::Draw,
            None => Decision::Pass,
        }
    }
}

/// Build the policy for `difficulty`. `seed` feeds the random policy.
pub fn strategy_for(difficulty: Difficulty, seed: u64) -> Box<dyn Strategy> {
    match difficulty {
        Difficulty::Easy => Box::new(RandomStrategy::new(seed)),
        Difficulty::Medium => Box::new(GreedyStrategy),
        Difficulty::Hard => Box::new(ScoredStrategy),
    }
}

pub struct RandomStrategy {
    rng: fastrand::Rng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_move(&mut self, hand: &[Tile], ends: Ends) -> Option<Move> {
        let moves = legal_moves(hand, ends);
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.usize(..moves.len())])
    }
}

pub struct GreedyStrategy;

impl Strategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose_move(&mut self, hand: &[Tile], ends: Ends) -> Option<Move> {
        let moves = legal_moves(hand, ends);
        // Equally heavy tiles keep hand order.
        let tile = moves
            .iter()
            .map(|m| m.tile)
            .fold(None, |best: Option<Tile>, t| match best {
                Some(b) if b.total_pips() >= t.total_pips() => Some(b),
                _ => Some(t),
            })?;

        let remaining = remaining_after(hand, tile);
        moves
            .iter()
            .filter(|m| m.tile == tile)
            .min_by_key(|m| {
                let exposed = exposed_value(*m, ends);
                remaining.iter().filter(|t| t.has(exposed)).count()
            })
            .copied()
    }
}

pub struct ScoredStrategy;

impl ScoredStrategy {
    /// Static score of playing `mv` from `hand` against `ends`.
    pub fn score(hand: &[Tile], ends: Ends, mv: Move) -> i32 {
        let exposed = exposed_value(&mv, ends);
        let after = match mv.end {
            End::Left => Ends { left: exposed, right: ends.right },
            End::Right => Ends { left: ends.left, right: exposed },
        };
        let compatible = remaining_after(hand, mv.tile)
            .iter()
            .filter(|t| t.has(after.left) || t.has(after.right))
            .count() as i32;

        let mut score = mv.tile.total_pips() as i32 + COMPATIBLE_WEIGHT * compatible;
        if mv.tile.is_double() {
            score += DOUBLE_BONUS;
        }
        if COMMON_END_VALUES.contains(&exposed) {
            score -= COMMON_END_PENALTY;
        }
        score
    }
}

impl Strategy for ScoredStrategy {
    fn name(&self) -> &'static str {
        "scored"
    }

    fn choose_move(&mut self, hand: &[Tile], ends: Ends) -> Option<Move> {
        let mut best: Option<(i32, Move)> = None;
        for mv in legal_moves(hand, ends) {
            let s = Self::score(hand, ends, mv);
            // Strict comparison keeps the first of equal scores.
            if best.is_none_or(|(b, _)| s > b) {
                best = Some((s, mv));
            }
        }
        best.map(|(_, mv)| mv)
    }
}

/// End value left exposed after `mv`. Only called on legal moves.
fn exposed_value(mv: &Move, ends: Ends) -> u8 {
    let target = ends.get(mv.end);
    mv.tile.opposite_side(target).unwrap_or(target)
}

fn remaining_after(hand: &[Tile], played: Tile) -> Vec<Tile> {
    hand.iter().copied().filter(|&t| t != played).collect()
}
