//! Game configuration consumed when a session starts.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_SEATS, MIN_SEATS, TARGET_SCORE};
use crate::error::GameError;

/// Scoring rule set for a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Modality {
    /// Domino winner collects the other hands' pips; blocks score nothing.
    #[default]
    Classic,
    /// Every round winner gains one point.
    Block,
    /// Domino winner collects all pips; first to 100 wins the match.
    Scoring,
}

impl Modality {
    /// Cumulative score that ends the match, if the modality has one.
    pub fn target_score(self) -> Option<u32> {
        match self {
            Modality::Scoring => Some(TARGET_SCORE),
            Modality::Classic | Modality::Block => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Classic => "classico",
            Modality::Block => "bloqueio",
            Modality::Scoring => "pontuacao",
        }
    }
}

impl FromStr for Modality {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classico" | "classic" => Ok(Modality::Classic),
            "bloqueio" | "block" => Ok(Modality::Block),
            "pontuacao" | "scoring" => Ok(Modality::Scoring),
            other => Err(GameError::InvalidConfig(format!("unknown modality '{other}'"))),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI difficulty, one per AI seat.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// Uniformly random legal move.
    Easy,
    /// Heaviest tile first.
    #[default]
    Medium,
    /// One-ply scored heuristic.
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "facil",
            Difficulty::Medium => "medio",
            Difficulty::Hard => "dificil",
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "facil" | "easy" => Ok(Difficulty::Easy),
            "medio" | "medium" => Ok(Difficulty::Medium),
            "dificil" | "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::InvalidConfig(format!("unknown difficulty '{other}'"))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who controls a seat.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeatKind {
    Human,
    Ai(Difficulty),
}

impl SeatKind {
    pub fn is_human(self) -> bool {
        matches!(self, SeatKind::Human)
    }
}

/// Everything a session needs to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub modality: Modality,
    pub seats: Vec<SeatKind>,
    /// When true, a player who draws a playable tile may not pass.
    pub force_play_after_draw: bool,
    /// Seed for shuffling and random AI choices; `None` uses entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            modality: Modality::default(),
            seats: vec![SeatKind::Human, SeatKind::Ai(Difficulty::default())],
            force_play_after_draw: true,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Seat 0 human, the rest AI at `difficulty`.
    pub fn single_player(modality: Modality, seats: usize, difficulty: Difficulty) -> Self {
        let mut kinds = vec![SeatKind::Human];
        kinds.extend(std::iter::repeat_n(SeatKind::Ai(difficulty), seats.saturating_sub(1)));
        Self {
            modality,
            seats: kinds,
            ..Self::default()
        }
    }

    /// Every seat AI, one difficulty per seat.
    pub fn all_ai(modality: Modality, difficulties: &[Difficulty]) -> Self {
        Self {
            modality,
            seats: difficulties.iter().map(|&d| SeatKind::Ai(d)).collect(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let n = self.seats.len();
        if !(MIN_SEATS..=MAX_SEATS).contains(&n) {
            return Err(GameError::InvalidConfig(format!(
                "seat count must be {MIN_SEATS}..={MAX_SEATS}, got {n}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_parse() {
        assert_eq!("classico".parse::<Modality>(), Ok(Modality::Classic));
        assert_eq!("BLOQUEIO".parse::<Modality>(), Ok(Modality::Block));
        assert_eq!("scoring".parse::<Modality>(), Ok(Modality::Scoring));
        assert!("poker".parse::<Modality>().is_err());
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("facil".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("medio".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("insane".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_target_score() {
        assert_eq!(Modality::Scoring.target_score(), Some(100));
        assert_eq!(Modality::Classic.target_score(), None);
    }

    #[test]
    fn test_validate_seat_bounds() {
        assert!(GameConfig::single_player(Modality::Classic, 1, Difficulty::Easy).validate().is_err());
        assert!(GameConfig::single_player(Modality::Classic, 4, Difficulty::Easy).validate().is_ok());
        assert!(GameConfig::all_ai(Modality::Block, &[Difficulty::Hard; 5]).validate().is_err());
    }

    #[test]
    fn test_single_player_layout() {
        let cfg = GameConfig::single_player(Modality::Classic, 3, Difficulty::Hard);
        assert_eq!(
            cfg.seats,
            vec![
                SeatKind::Human,
                SeatKind::Ai(Difficulty::Hard),
                SeatKind::Ai(Difficulty::Hard)
            ]
        );
        assert!(cfg.force_play_after_draw);
    }
}
