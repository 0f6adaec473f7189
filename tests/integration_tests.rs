//! Integration tests for domino-rust
//!
//! Scenario tests for the turn engine, built on deterministic deals
//! (`GameSession::with_deck`) and restored mid-round states (`GameSession::resume`).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use domino_rust::GameError;
use domino_rust::board::{Board, End, Ends};
use domino_rust::config::{Difficulty, GameConfig, Modality, SeatKind};
use domino_rust::constants::TILE_COUNT;
use domino_rust::game::{Action, GameSession, Phase, RoundEnd, RoundSetup, Snapshot, StateObserver};
use domino_rust::tile::Tile;
use domino_rust::tileset::TileSet;
use domino_rust::validator::playable_tiles;

// =============================================================================
// Helper functions
// =============================================================================

fn humans(seats: usize) -> GameConfig {
    GameConfig {
        seats: vec![SeatKind::Human; seats],
        ..GameConfig::default()
    }
}

fn t(a: u8, b: u8) -> Tile {
    Tile::new(a, b)
}

/// The listed tiles first, followed by the rest of the set in build order.
fn deck_starting_with(front: &[Tile]) -> Vec<Tile> {
    let mut deck = front.to_vec();
    deck.extend(
        TileSet::standard()
            .pile()
            .iter()
            .filter(|tile| !front.contains(*tile)),
    );
    deck
}

/// Seat 0 holds [6|6]; seat 1 holds [6|3].
fn scenario_deck() -> Vec<Tile> {
    deck_starting_with(&[
        t(6, 6), t(0, 1), t(0, 2), t(1, 2), t(2, 3), t(1, 4), t(0, 4),
        t(6, 3), t(5, 5), t(0, 0), t(1, 1), t(2, 5), t(3, 4), t(0, 5),
    ])
}

// =============================================================================
// Tile set
// =============================================================================

#[test]
fn test_fresh_set_is_complete() {
    let mut set = TileSet::new();
    set.build().unwrap();
    let tiles: HashSet<(u8, u8)> = set.pile().iter().map(|t| (t.low(), t.high())).collect();
    assert_eq!(tiles.len(), TILE_COUNT);
    for i in 0..=6 {
        for j in i..=6 {
            assert!(tiles.contains(&(i, j)), "missing ({i},{j})");
        }
    }
}

#[test]
fn test_deal_conservation() {
    let mut rng = fastrand::Rng::with_seed(1234);
    for seats in 2..=4 {
        let mut set = TileSet::standard();
        set.shuffle(&mut rng);
        let hands = set.deal(seats).unwrap();

        let dealt: usize = hands.iter().map(|h| h.len()).sum();
        assert_eq!(dealt + set.pile_len(), TILE_COUNT);

        let all: HashSet<Tile> = hands
            .iter()
            .flat_map(|h| h.tiles().iter().copied())
            .chain(set.pile().iter().copied())
            .collect();
        assert_eq!(all.len(), TILE_COUNT, "a tile appears twice with {seats} seats");
    }
}

#[test]
fn test_shuffle_is_roughly_uniform() {
    const SHUFFLES: usize = 20_000;
    let reference = TileSet::standard().pile().to_vec();
    let index = |tile: Tile| reference.iter().position(|&r| r == tile).unwrap();

    let mut counts = vec![[0u32; TILE_COUNT]; TILE_COUNT];
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..SHUFFLES {
        let mut set = TileSet::standard();
        set.shuffle(&mut rng);
        for (pos, &tile) in set.pile().iter().enumerate() {
            counts[index(tile)][pos] += 1;
        }
    }

    // Chi-square over the 28x28 tile/position table. Degrees of freedom are
    // 27 * 27 = 729; the bound sits about five standard deviations above.
    let expected = SHUFFLES as f64 / TILE_COUNT as f64;
    let chi2: f64 = counts
        .iter()
        .flat_map(|row| row.iter())
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();
    assert!(chi2 < 920.0, "chi-square {chi2:.1} too large");
}

// =============================================================================
// Board and validator
// =============================================================================

#[test]
fn test_chain_invariant_under_legal_play() {
    let mut rng = fastrand::Rng::with_seed(77);
    for _ in 0..50 {
        let mut set = TileSet::standard();
        set.shuffle(&mut rng);
        let mut stock = set.pile().to_vec();
        let mut board = Board::new();
        board.place_opening(stock.remove(0)).unwrap();

        while let Some(ends) = board.ends() {
            let Some(tile) = playable_tiles(&stock, ends).first().copied() else {
                break;
            };
            let end = board.legal_ends_for(tile)[0];
            board.place_at(tile, end).unwrap();
            stock.retain(|&s| s != tile);

            board.check_chain().unwrap();
            let placements: Vec<_> = board.placements().collect();
            let exposed = Ends {
                left: placements[0].left_pip(),
                right: placements[placements.len() - 1].right_pip(),
            };
            assert_eq!(board.ends(), Some(exposed));
        }
    }
}

#[test]
fn test_validator_sound_and_complete() {
    let all = TileSet::standard().pile().to_vec();
    for left in 0..=6 {
        for right in 0..=6 {
            let ends = Ends { left, right };
            let playable = playable_tiles(&all, ends);
            for &tile in &all {
                let fits = tile.has(left) || tile.has(right);
                assert_eq!(playable.contains(&tile), fits, "{tile} vs {left}/{right}");
            }
        }
    }
}

// =============================================================================
// Turn engine scenarios
// =============================================================================

#[test]
fn test_two_player_classic_opening_scenario() {
    let mut session = GameSession::with_deck(humans(2), scenario_deck()).unwrap();
    assert_eq!(session.phase(), Phase::AwaitingOpening);
    assert_eq!(session.current_seat(), 0);
    assert_eq!(session.opening_tile(), Some(t(6, 6)));

    session.play_opening().unwrap();
    assert_eq!(session.ends(), Some(Ends { left: 6, right: 6 }));
    assert_eq!(session.current_seat(), 1);

    let before = session.hand(1).len();
    session.play_tile(t(6, 3), End::Right).unwrap();
    assert_eq!(session.ends(), Some(Ends { left: 6, right: 3 }));
    assert_eq!(session.board().tiles().collect::<Vec<_>>(), vec![t(6, 6), t(6, 3)]);
    assert_eq!(session.hand(1).len(), before - 1);
    assert_eq!(session.current_seat(), 0);
}

#[test]
fn test_illegal_move_leaves_state_unchanged() {
    let mut session = GameSession::with_deck(humans(2), scenario_deck()).unwrap();
    session.play_opening().unwrap();
    let before = session.snapshot();

    // Not in seat 1's hand.
    let err = session.play_tile(t(6, 4), End::Left).unwrap_err();
    assert!(matches!(err, GameError::IllegalMove(_)));
    // In hand, but matches neither end.
    let err = session.play_tile(t(2, 5), End::Left).unwrap_err();
    assert!(matches!(err, GameError::IllegalMove(_)));
    // Seat 1 has a legal move, so drawing and passing are rejected.
    assert!(matches!(session.draw_tile(), Err(GameError::IllegalDraw(_))));
    assert!(matches!(session.pass_turn(), Err(GameError::IllegalPass(_))));

    assert_eq!(session.snapshot(), before);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_domino_ends_round_immediately() {
    let setup = RoundSetup {
        hands: vec![vec![t(6, 3)], vec![t(1, 1), t(2, 4)]],
        pile: vec![t(0, 5)],
        chain: vec![(t(6, 6), End::Left)],
        current_seat: 0,
    };
    let mut session = GameSession::resume(humans(2), setup).unwrap();
    session.play_tile(t(6, 3), End::Right).unwrap();

    assert_eq!(session.phase(), Phase::RoundOver);
    let result = session.round_result().unwrap();
    assert_eq!(result.winner, 0);
    assert_eq!(result.end, RoundEnd::Domino);
    assert_eq!(result.remaining_pips, vec![0, 8]);
    assert_eq!(result.points_awarded, 8);
    assert_eq!(session.scores(), &[8, 0]);

    assert!(matches!(
        session.play_tile(t(1, 1), End::Left),
        Err(GameError::WrongPhase { .. })
    ));
}

#[test]
fn test_block_goes_to_lowest_pip_total() {
    // Hands sum to 10, 4, and 15; nothing fits a chain of [0|0].
    let setup = RoundSetup {
        hands: vec![
            vec![t(4, 6)],
            vec![t(1, 3)],
            vec![t(5, 6), t(2, 2)],
        ],
        pile: vec![],
        chain: vec![(t(0, 0), End::Left)],
        current_seat: 0,
    };
    let mut session = GameSession::resume(humans(3), setup).unwrap();
    session.pass_turn().unwrap();

    assert_eq!(session.phase(), Phase::RoundOver);
    let result = session.round_result().unwrap();
    assert_eq!(result.end, RoundEnd::Block);
    assert_eq!(result.winner, 1);
    assert_eq!(result.remaining_pips, vec![10, 4, 15]);
    assert_eq!(result.points_awarded, 0);
}

#[test]
fn test_block_tie_goes_to_lowest_seat() {
    let setup = RoundSetup {
        hands: vec![vec![t(5, 6)], vec![t(2, 3)], vec![t(1, 4)]],
        pile: vec![],
        chain: vec![(t(0, 0), End::Left)],
        current_seat: 0,
    };
    let config = GameConfig {
        modality: Modality::Block,
        ..humans(3)
    };
    let mut session = GameSession::resume(config, setup).unwrap();
    session.pass_turn().unwrap();

    let result = session.round_result().unwrap();
    assert_eq!(result.winner, 1);
    assert_eq!(result.points_awarded, 1);
    assert_eq!(session.scores(), &[0, 1, 0]);
}

#[test]
fn test_pass_requires_empty_pile() {
    let setup = RoundSetup {
        hands: vec![vec![t(1, 2)], vec![t(6, 0)]],
        pile: vec![t(3, 4)],
        chain: vec![(t(6, 6), End::Left)],
        current_seat: 0,
    };
    let mut session = GameSession::resume(humans(2), setup).unwrap();
    assert!(matches!(session.pass_turn(), Err(GameError::IllegalPass(_))));
    assert_eq!(session.draw_tile(), Ok(t(3, 4)));
    session.pass_turn().unwrap();
    assert_eq!(session.current_seat(), 1);
    assert!(matches!(session.draw_tile(), Err(GameError::IllegalDraw(_))));
}

#[test]
fn test_ai_draws_once_then_passes() {
    let setup = RoundSetup {
        hands: vec![vec![t(1, 2)], vec![t(6, 0)]],
        pile: vec![t(3, 4)],
        chain: vec![(t(6, 6), End::Left)],
        current_seat: 0,
    };
    let config = GameConfig {
        seats: vec![SeatKind::Ai(Difficulty::Easy), SeatKind::Human],
        ..GameConfig::default()
    };
    let mut session = GameSession::resume(config, setup).unwrap();

    let actions = session.take_ai_turn().unwrap();
    assert_eq!(actions, vec![Action::Draw(t(3, 4)), Action::Pass]);
    assert_eq!(session.hand(0).len(), 2);
    assert_eq!(session.pile_len(), 0);
    assert_eq!(session.current_seat(), 1);
    assert_eq!(session.phase(), Phase::Playing);
}

#[test]
fn test_ai_plays_drawn_tile() {
    let setup = RoundSetup {
        hands: vec![vec![t(1, 2)], vec![t(5, 0)]],
        pile: vec![t(3, 4), t(2, 6)],
        chain: vec![(t(6, 6), End::Left)],
        current_seat: 0,
    };
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let config = GameConfig {
            seats: vec![SeatKind::Ai(difficulty), SeatKind::Human],
            ..GameConfig::default()
        };
        let mut session = GameSession::resume(config, setup.clone()).unwrap();
        let actions = session.take_ai_turn().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], Action::Draw(t(2, 6)));
        assert!(matches!(actions[1], Action::Play(m) if m.tile == t(2, 6)));
        assert_eq!(session.hand(0), &[t(1, 2)]);
    }
}

#[test]
fn test_turn_rotation_in_ai_rounds() {
    for seed in 0..20 {
        let seats = 2 + (seed as usize % 3);
        let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Easy];
        let config = GameConfig::all_ai(Modality::Classic, &difficulties[..seats]).with_seed(seed);
        let mut session = GameSession::new(config).unwrap();

        while matches!(session.phase(), Phase::AwaitingOpening | Phase::Playing) {
            let before = session.current_seat();
            session.take_ai_turn().unwrap();
            if session.phase() == Phase::Playing {
                assert_eq!(session.current_seat(), (before + 1) % seats);
            }
        }
        session.check_invariants().unwrap();
    }
}

#[test]
fn test_next_round_keeps_scores() {
    let config = GameConfig::all_ai(Modality::Classic, &[Difficulty::Hard, Difficulty::Medium]);
    let mut session = GameSession::new(config.with_seed(8)).unwrap();
    session.advance_ai().unwrap();
    assert_eq!(session.phase(), Phase::RoundOver);
    let scores = session.scores().to_vec();

    session.next_round().unwrap();
    assert_eq!(session.round(), 2);
    assert_eq!(session.phase(), Phase::AwaitingOpening);
    assert_eq!(session.scores(), scores.as_slice());
    assert!(session.history().is_empty());
    assert!(session.round_result().is_none());
    session.check_invariants().unwrap();
}

// =============================================================================
// Observer
// =============================================================================

struct Recorder(Rc<RefCell<Vec<Snapshot>>>);

impl StateObserver for Recorder {
    fn on_state_changed(&mut self, snapshot: &Snapshot) {
        self.0.borrow_mut().push(snapshot.clone());
    }
}

#[test]
fn test_observer_sees_every_transition() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut session = GameSession::with_deck(humans(2), scenario_deck()).unwrap();
    session.set_observer(Box::new(Recorder(Rc::clone(&seen))));

    session.play_opening().unwrap();
    session.play_tile(t(6, 3), End::Right).unwrap();
    // Rejected actions do not notify.
    let _ = session.play_tile(t(5, 5), End::Left);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].phase, Phase::Playing);
    assert_eq!(seen[0].current_seat, 1);
    assert_eq!(seen[1].placements.len(), 2);
    assert_eq!(seen[1].ends, Some(Ends { left: 6, right: 3 }));
    // Seat 0 is human and to act, so its legal moves are included.
    assert!(seen[1]
        .legal_moves
        .iter()
        .all(|m| m.tile.has(6) || m.tile.has(3)));
    assert!(!seen[1].legal_moves.is_empty());
}
