//! Headless playouts (AI-only rounds and matches).
//!
//! A playout drives every seat through the AI until the round ends. A match
//! repeats rounds until the modality's target score is reached or the round
//! limit runs out.

use tracing::info;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{GameSession, Phase, RoundResult};

/// Outcome of a headless match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSummary {
    pub rounds: Vec<RoundResult>,
    pub scores: Vec<u32>,
    /// Target-score winner, or the leader when the round limit was hit.
    /// Equal scores go to the lowest seat index.
    pub winner: usize,
    /// True if a seat reached the target score.
    pub decided: bool,
}

/// Play the current round to completion with AI on every seat.
///
/// Fails with [`GameError::NotAiTurn`] if a human seat comes up.
pub fn play_round(session: &mut GameSession) -> Result<RoundResult, GameError> {
    session.advance_ai()?;
    match session.phase() {
        Phase::RoundOver | Phase::MatchOver => session
            .round_result()
            .cloned()
            .ok_or_else(|| GameError::InvariantViolation("round over without a result".into())),
        _ => Err(GameError::NotAiTurn {
            seat: session.current_seat(),
        }),
    }
}

/// Play up to `max_rounds` rounds of an all-AI match.
pub fn play_match(config: GameConfig, max_rounds: u32) -> Result<MatchSummary, GameError> {
    let mut session = GameSession::new(config)?;
    let mut rounds = Vec::new();

    loop {
        rounds.push(play_round(&mut session)?);
        if session.phase() == Phase::MatchOver || session.round() >= max_rounds {
            break;
        }
        session.next_round()?;
    }

    let scores = session.scores().to_vec();
    let decided = session.match_winner().is_some();
    let winner = session.match_winner().unwrap_or_else(|| leader(&scores));
    info!(rounds = rounds.len(), winner, decided, ?scores, "match finished");

    Ok(MatchSummary {
        rounds,
        scores,
        winner,
        decided,
    })
}

/// Seat with the highest score, lowest index on ties.
fn leader(scores: &[u32]) -> usize {
    scores
        .iter()
        .enumerate()
        .max_by_key(|&(seat, &s)| (s, std::cmp::Reverse(seat)))
        .map_or(0, |(seat, _)| seat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Modality, SeatKind};

    #[test]
    fn test_leader_ties_go_low() {
        assert_eq!(leader(&[3, 7, 7]), 1);
        assert_eq!(leader(&[0, 0]), 0);
    }

    #[test]
    fn test_play_round_completes() {
        let config = GameConfig::all_ai(Modality::Classic, &[Difficulty::Easy, Difficulty::Hard]);
        let mut session = GameSession::new(config.with_seed(42)).unwrap();
        let result = play_round(&mut session).unwrap();
        assert_eq!(result.round, 1);
        assert!(result.winner < 2);
        session.check_invariants().unwrap();
    }

    #[test]
    fn test_play_round_stops_at_human() {
        let config = GameConfig {
            seats: vec![SeatKind::Human, SeatKind::Human],
            ..GameConfig::default()
        };
        let mut session = GameSession::new(config.with_seed(2)).unwrap();
        assert!(matches!(
            play_round(&mut session),
            Err(GameError::NotAiTurn { .. })
        ));
    }

    #[test]
    fn test_block_match_respects_round_limit() {
        let config = GameConfig::all_ai(Modality::Block, &[Difficulty::Medium; 3]);
        let summary = play_match(config.with_seed(9), 5).unwrap();
        assert_eq!(summary.rounds.len(), 5);
        assert_eq!(summary.scores.iter().sum::<u32>(), 5);
        assert!(!summary.decided);
    }

    #[test]
    fn test_scoring_match_reaches_target() {
        let config = GameConfig::all_ai(Modality::Scoring, &[Difficulty::Hard, Difficulty::Easy]);
        let summary = play_match(config.with_seed(17), 500).unwrap();
        assert!(summary.decided);
        assert!(summary.scores[summary.winner] >= 100);
    }
}
