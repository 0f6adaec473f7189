//! Turn engine: the only place that mutates hands, board, and draw pile.
//!
//! A [`GameSession`] runs one match as a sequence of rounds. Each round moves
//! through [`Phase::AwaitingOpening`] -> [`Phase::Playing`] ->
//! [`Phase::RoundOver`] (or [`Phase::MatchOver`] once a target score is hit).
//!
//! Every action is validated completely before anything is mutated, so a
//! rejected action leaves the session exactly as it was. After each accepted
//! action the engine re-checks its invariants, looks for a domino or a block,
//! rotates the turn, and notifies the [`StateObserver`] if one is attached.
//!
//! AI seats never act on their own: the host calls [`GameSession::take_ai_turn`]
//! (or [`GameSession::advance_ai`]) whenever and with whatever delay it likes.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::ai::{Decision, Strategy, strategy_for};
use crate::board::{Board, End, Ends, Placement};
use crate::config::{GameConfig, Modality, SeatKind};
use crate::constants::BLOCK_ROUND_POINTS;
use crate::error::GameError;
use crate::tile::Tile;
use crate::tileset::{Hand, TileSet};
use crate::validator::{Move, has_any_legal_move, legal_moves};

/// Where a session is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Hands are dealt; the holder of the opening tile must place it.
    AwaitingOpening,
    Playing,
    RoundOver,
    /// A seat reached the modality's target score.
    MatchOver,
    /// An invariant check failed. No further actions are accepted.
    Halted,
}

/// How a round ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundEnd {
    /// A seat emptied its hand.
    Domino,
    /// Nobody could move and the draw pile was exhausted.
    Block,
}

/// One accepted action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Open(Tile),
    Play(Move),
    Draw(Tile),
    Pass,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub seat: usize,
    pub action: Action,
    /// Time since the round started.
    pub elapsed: Duration,
}

/// Outcome of a finished round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub round: u32,
    pub winner: usize,
    pub end: RoundEnd,
    /// Pip total left in each seat's hand.
    pub remaining_pips: Vec<u32>,
    pub points_awarded: u32,
    /// Cumulative scores after this round.
    pub scores: Vec<u32>,
    /// Number of recorded actions (openings, plays, draws, and passes).
    pub move_count: usize,
    pub duration: Duration,
}

/// Read-only view handed to the presentation layer after every transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub round: u32,
    pub current_seat: usize,
    pub placements: Vec<Placement>,
    pub ends: Option<Ends>,
    pub hand_sizes: Vec<usize>,
    pub pile_size: usize,
    pub scores: Vec<u32>,
    pub opening_tile: Option<Tile>,
    /// Legal moves for the current seat when it is a human seat.
    pub legal_moves: Vec<Move>,
}

/// Notification port for whatever renders the game.
pub trait StateObserver {
    fn on_state_changed(&mut self, snapshot: &Snapshot);
}

/// A round in progress, used to resume a session.
#[derive(Clone, Debug, Default)]
pub struct RoundSetup {
    pub hands: Vec<Vec<Tile>>,
    /// Draw pile; the last tile is drawn first.
    pub pile: Vec<Tile>,
    /// Placements in play order. The first entry is the opening tile and its end is ignored.
    pub chain: Vec<(Tile, End)>,
    pub current_seat: usize,
}

pub struct GameSession {
    config: GameConfig,
    hands: Vec<Hand>,
    strategies: Vec<Option<Box<dyn Strategy>>>,
    tileset: TileSet,
    board: Board,
    phase: Phase,
    current: usize,
    round: u32,
    scores: Vec<u32>,
    history: Vec<MoveRecord>,
    opening_tile: Option<Tile>,
    drew_this_turn: bool,
    /// Tiles in play this round across hands, pile, and board.
    tile_total: usize,
    round_started: Instant,
    last_result: Option<RoundResult>,
    rng: fastrand::Rng,
    observer: Option<Box<dyn StateObserver>>,
}

impl GameSession {
    /// Start a match and deal its first round from a shuffled set.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let mut session = Self::empty(config)?;
        session.start_round(None)?;
        Ok(session)
    }

    /// Start a match whose first round is dealt from `deck` in order.
    pub fn with_deck(config: GameConfig, deck: Vec<Tile>) -> Result<Self, GameError> {
        let mut session = Self::empty(config)?;
        session.start_round(Some(deck))?;
        Ok(session)
    }

    /// Rebuild a session in the middle of a round.
    pub fn resume(config: GameConfig, setup: RoundSetup) -> Result<Self, GameError> {
        let mut session = Self::empty(config)?;
        let seats = session.seat_count();
        if setup.hands.len() != seats {
            return Err(GameError::InvalidConfig(format!(
                "setup has {} hands for {seats} seats",
                setup.hands.len()
            )));
        }
        if setup.current_seat >= seats {
            return Err(GameError::InvalidConfig(format!(
                "current seat {} out of range",
                setup.current_seat
            )));
        }

        let mut chain = setup.chain.iter();
        if let Some(&(opening, _)) = chain.next() {
            session.board.place_opening(opening)?;
            for &(tile, end) in chain {
                session
                    .board
                    .place_at(tile, end)
                    .map_err(|e| GameError::InvariantViolation(format!("bad chain: {e}")))?;
            }
        }

        session.tileset = TileSet::from_order(setup.pile)?;
        for tile in session.board.tiles() {
            session.tileset.record_placed(tile);
        }
        session.hands = setup.hands.into_iter().map(Hand::new).collect();
        session.tile_total = session.board.len()
            + session.tileset.pile_len()
            + session.hands.iter().map(Hand::len).sum::<usize>();
        session.current = setup.current_seat;

        if session.board.is_empty() {
            let (seat, tile) = opening_for(&session.hands).ok_or_else(|| {
                GameError::InvalidConfig("no tiles in any hand to open with".into())
            })?;
            session.current = seat;
            session.opening_tile = Some(tile);
            session.phase = Phase::AwaitingOpening;
        } else {
            // An empty hand mid-round means that seat has already dominoed.
            if let Some(seat) = session.hands.iter().position(Hand::is_empty) {
                return Err(GameError::InvariantViolation(format!(
                    "seat {seat} has no tiles but the round is still in play"
                )));
            }
            session.phase = Phase::Playing;
        }

        session.check_invariants()?;
        Ok(session)
    }

    fn empty(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let strategies: Vec<Option<Box<dyn Strategy>>> = config
            .seats
            .iter()
            .map(|kind| match *kind {
                SeatKind::Human => None,
                SeatKind::Ai(d) => Some(strategy_for(d, rng.u64(..))),
            })
            .collect();
        let seats = config.seat_count();

        Ok(Self {
            config,
            hands: vec![Hand::default(); seats],
            strategies,
            tileset: TileSet::new(),
            board: Board::new(),
            phase: Phase::AwaitingOpening,
            current: 0,
            round: 1,
            scores: vec![0; seats],
            history: Vec::new(),
            opening_tile: None,
            drew_this_turn: false,
            tile_total: 0,
            round_started: Instant::now(),
            last_result: None,
            rng,
            observer: None,
        })
    }

    fn start_round(&mut self, deck: Option<Vec<Tile>>) -> Result<(), GameError> {
        self.board.clear();
        match deck {
            Some(order) => self.tileset = TileSet::from_order(order)?,
            None => {
                self.tileset.reset();
                self.tileset.build()?;
                self.tileset.shuffle(&mut self.rng);
            }
        }
        self.tile_total = self.tileset.pile_len();
        self.hands = self.tileset.deal(self.seat_count())?;

        let (seat, tile) = opening_for(&self.hands)
            .ok_or_else(|| GameError::InvariantViolation("dealt hands are empty".into()))?;
        self.current = seat;
        self.opening_tile = Some(tile);
        self.phase = Phase::AwaitingOpening;
        self.history.clear();
        self.drew_this_turn = false;
        self.last_result = None;
        self.round_started = Instant::now();

        info!(round = self.round, seat, %tile, "round dealt");
        self.notify();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_seat(&self) -> usize {
        self.current
    }

    pub fn seat_count(&self) -> usize {
        self.config.seat_count()
    }

    pub fn seat_kind(&self, seat: usize) -> Option<SeatKind> {
        self.config.seats.get(seat).copied()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn hand(&self, seat: usize) -> &[Tile] {
        self.hands.get(seat).map(Hand::tiles).unwrap_or_default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ends(&self) -> Option<Ends> {
        self.board.ends()
    }

    pub fn pile_len(&self) -> usize {
        self.tileset.pile_len()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn opening_tile(&self) -> Option<Tile> {
        self.opening_tile
    }

    pub fn round_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// The seat that reached the target score, once the match is over.
    pub fn match_winner(&self) -> Option<usize> {
        let target = self.config.modality.target_score()?;
        self.scores.iter().position(|&s| s >= target)
    }

    /// Legal moves for `seat`. While awaiting the opening only the holder of
    /// the opening tile has moves, and that tile is accepted at either end.
    pub fn legal_moves_for(&self, seat: usize) -> Vec<Move> {
        match (self.phase, self.board.ends()) {
            (Phase::Playing, Some(ends)) => legal_moves(self.hand(seat), ends),
            (Phase::AwaitingOpening, _) if seat == self.current => self
                .opening_tile
                .map(|tile| End::BOTH.into_iter().map(|e| Move::new(tile, e)).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Ends a selected tile could attach to, for highlighting.
    pub fn legal_ends_for(&self, tile: Tile) -> Vec<End> {
        self.board.legal_ends_for(tile)
    }

    pub fn snapshot(&self) -> Snapshot {
        let human_turn = self
            .seat_kind(self.current)
            .is_some_and(SeatKind::is_human);
        Snapshot {
            phase: self.phase,
            round: self.round,
            current_seat: self.current,
            placements: self.board.placements().copied().collect(),
            ends: self.board.ends(),
            hand_sizes: self.hands.iter().map(Hand::len).collect(),
            pile_size: self.tileset.pile_len(),
            scores: self.scores.clone(),
            opening_tile: self.opening_tile,
            legal_moves: if human_turn {
                self.legal_moves_for(self.current)
            } else {
                Vec::new()
            },
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observer = Some(observer);
    }

    /// Replace the policy driving an AI seat.
    pub fn set_strategy(&mut self, seat: usize, strategy: Box<dyn Strategy>) -> Result<(), GameError> {
        let Some(slot) = self.strategies.get_mut(seat).filter(|s| s.is_some()) else {
            return Err(GameError::NotAiTurn { seat });
        };
        debug!(seat, strategy = strategy.name(), "strategy replaced");
        *slot = Some(strategy);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Human entry points
    // -------------------------------------------------------------------------

    /// Play `tile` at `end` for the human seat whose turn it is.
    ///
    /// During the opening the required tile is accepted at either end.
    pub fn play_tile(&mut self, tile: Tile, end: End) -> Result<(), GameError> {
        self.ensure_human()?;
        self.apply_play(tile, end)
    }

    /// Place the required opening tile for the human seat.
    pub fn play_opening(&mut self) -> Result<(), GameError> {
        self.ensure_human()?;
        self.apply_opening()
    }

    /// Draw one tile for the human seat. The turn does not advance.
    pub fn draw_tile(&mut self) -> Result<Tile, GameError> {
        self.ensure_human()?;
        self.apply_draw()
    }

    pub fn pass_turn(&mut self) -> Result<(), GameError> {
        self.ensure_human()?;
        self.apply_pass()
    }

    // -------------------------------------------------------------------------
    // AI driving
    // -------------------------------------------------------------------------

    /// Execute one complete turn for the AI seat whose turn it is.
    ///
    /// A draw is followed by a second decision, which plays the drawn tile
    /// if possible and passes otherwise.
    pub fn take_ai_turn(&mut self) -> Result<Vec<Action>, GameError> {
        self.ensure_in_round()?;
        let seat = self.current;
        if self.strategies.get(seat).is_none_or(Option::is_none) {
            return Err(GameError::NotAiTurn { seat });
        }

        if self.phase == Phase::AwaitingOpening {
            let tile = self.opening_tile.ok_or_else(|| {
                GameError::InvariantViolation("awaiting opening without an opening tile".into())
            })?;
            self.apply_opening()?;
            return Ok(vec![Action::Open(tile)]);
        }

        let mut actions = Vec::with_capacity(2);
        loop {
            let decision = self.ai_decision(seat)?;
            debug!(seat, ?decision, "ai decision");
            match decision {
                Decision::Play(mv) => {
                    self.apply_play(mv.tile, mv.end)?;
                    actions.push(Action::Play(mv));
                    return Ok(actions);
                }
                Decision::Draw => {
                    let tile = self.apply_draw()?;
                    actions.push(Action::Draw(tile));
                }
                Decision::Pass => {
                    self.apply_pass()?;
                    actions.push(Action::Pass);
                    return Ok(actions);
                }
            }
        }
    }

    /// Run AI turns until a human seat must act or the round ends.
    ///
    /// Returns the number of AI turns taken.
    pub fn advance_ai(&mut self) -> Result<usize, GameError> {
        let mut turns = 0;
        while matches!(self.phase, Phase::AwaitingOpening | Phase::Playing)
            && self.seat_kind(self.current).is_some_and(|k| !k.is_human())
        {
            self.take_ai_turn()?;
            turns += 1;
        }
        Ok(turns)
    }

    fn ai_decision(&mut self, seat: usize) -> Result<Decision, GameError> {
        let ends = self.playing_ends()?;
        let can_draw = !self.drew_this_turn && !self.tileset.is_pile_empty();
        let strategy = self.strategies[seat]
            .as_mut()
            .ok_or(GameError::NotAiTurn { seat })?;
        Ok(strategy.decide(self.hands[seat].tiles(), ends, can_draw))
    }

    // -------------------------------------------------------------------------
    // Match flow
    // -------------------------------------------------------------------------

    /// Deal the next round of the match.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.ensure_phase(Phase::RoundOver)?;
        self.round += 1;
        self.start_round(None)
    }

    /// Verify tile conservation and the chain property.
    pub fn check_invariants(&self) -> Result<(), GameError> {
        self.board.check_chain()?;

        let mut seen = HashSet::with_capacity(self.tile_total);
        let all = self
            .hands
            .iter()
            .flat_map(|h| h.tiles().iter().copied())
            .chain(self.tileset.pile().iter().copied())
            .chain(self.board.tiles());
        for tile in all {
            if !seen.insert(tile) {
                return Err(GameError::InvariantViolation(format!(
                    "tile {tile} is held in two places"
                )));
            }
        }
        if seen.len() != self.tile_total {
            return Err(GameError::InvariantViolation(format!(
                "expected {} tiles in play, found {}",
                self.tile_total,
                seen.len()
            )));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Action application
    // -------------------------------------------------------------------------

    fn apply_opening(&mut self) -> Result<(), GameError> {
        self.ensure_phase(Phase::AwaitingOpening)?;
        let seat = self.current;
        let tile = self.opening_tile.ok_or_else(|| {
            GameError::InvariantViolation("awaiting opening without an opening tile".into())
        })?;
        if !self.hands[seat].contains(tile) {
            return Err(GameError::InvariantViolation(format!(
                "seat {seat} must open with {tile} but does not hold it"
            )));
        }

        self.board.place_opening(tile)?;
        self.hands[seat].remove(tile);
        self.tileset.record_placed(tile);
        self.opening_tile = None;
        self.phase = Phase::Playing;
        self.record(seat, Action::Open(tile));
        self.finish_action(seat)
    }

    fn apply_play(&mut self, tile: Tile, end: End) -> Result<(), GameError> {
        if self.phase == Phase::AwaitingOpening {
            return match self.opening_tile {
                Some(required) if required == tile => self.apply_opening(),
                Some(required) => Err(GameError::IllegalMove(format!(
                    "the round must open with {required}"
                ))),
                None => Err(GameError::InvariantViolation(
                    "awaiting opening without an opening tile".into(),
                )),
            };
        }
        self.ensure_phase(Phase::Playing)?;
        let seat = self.current;
        if !self.hands[seat].contains(tile) {
            return Err(GameError::IllegalMove(format!("{tile} is not in seat {seat}'s hand")));
        }

        self.board.place_at(tile, end)?;
        self.hands[seat].remove(tile);
        self.tileset.record_placed(tile);
        self.record(seat, Action::Play(Move::new(tile, end)));

        if self.hands[seat].is_empty() {
            self.verify()?;
            self.end_round(RoundEnd::Domino, seat);
            return Ok(());
        }
        self.finish_action(seat)
    }

    fn apply_draw(&mut self) -> Result<Tile, GameError> {
        self.ensure_phase(Phase::Playing)?;
        let seat = self.current;
        let ends = self.playing_ends()?;
        if self.drew_this_turn {
            return Err(GameError::IllegalDraw("already drew this turn".into()));
        }
        if has_any_legal_move(self.hands[seat].tiles(), ends) {
            return Err(GameError::IllegalDraw("a legal move is available".into()));
        }
        let tile = self
            .tileset
            .draw()
            .ok_or_else(|| GameError::IllegalDraw("the draw pile is empty".into()))?;

        self.hands[seat].push(tile);
        self.drew_this_turn = true;
        self.record(seat, Action::Draw(tile));
        self.verify()?;
        self.notify();
        Ok(tile)
    }

    fn apply_pass(&mut self) -> Result<(), GameError> {
        self.ensure_phase(Phase::Playing)?;
        let seat = self.current;
        let ends = self.playing_ends()?;
        let can_move = has_any_legal_move(self.hands[seat].tiles(), ends);

        if self.drew_this_turn {
            if can_move && self.config.force_play_after_draw {
                return Err(GameError::IllegalPass("the drawn tile must be played".into()));
            }
        } else if can_move {
            return Err(GameError::IllegalPass("a legal move is available".into()));
        } else if !self.tileset.is_pile_empty() {
            return Err(GameError::IllegalPass("draw from the pile first".into()));
        }

        self.record(seat, Action::Pass);
        self.finish_action(seat)
    }

    /// Post-action bookkeeping: invariants, block detection, turn rotation.
    fn finish_action(&mut self, seat: usize) -> Result<(), GameError> {
        self.verify()?;

        if let Some(winner) = self.block_winner() {
            self.end_round(RoundEnd::Block, winner);
            return Ok(());
        }

        self.current = (seat + 1) % self.seat_count();
        self.drew_this_turn = false;
        self.notify();
        Ok(())
    }

    /// Lowest-pip seat if the round is blocked. Ties go to the lowest seat index.
    fn block_winner(&self) -> Option<usize> {
        let ends = self.board.ends()?;
        if !self.tileset.is_pile_empty()
            || self.hands.iter().any(|h| has_any_legal_move(h.tiles(), ends))
        {
            return None;
        }
        self.hands
            .iter()
            .enumerate()
            .min_by_key(|(i, h)| (h.pip_total(), *i))
            .map(|(i, _)| i)
    }

    fn end_round(&mut self, end: RoundEnd, winner: usize) {
        let remaining_pips: Vec<u32> = self.hands.iter().map(Hand::pip_total).collect();
        let points = round_points(self.config.modality, end, winner, &remaining_pips);
        self.scores[winner] += points;

        let result = RoundResult {
            round: self.round,
            winner,
            end,
            remaining_pips,
            points_awarded: points,
            scores: self.scores.clone(),
            move_count: self.history.len(),
            duration: self.round_started.elapsed(),
        };
        info!(
            round = self.round,
            winner,
            ?end,
            points,
            scores = ?self.scores,
            "round over"
        );

        self.phase = if self.match_winner().is_some() {
            info!(winner = ?self.match_winner(), "match over");
            Phase::MatchOver
        } else {
            Phase::RoundOver
        };
        self.last_result = Some(result);
        self.notify();
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn record(&mut self, seat: usize, action: Action) {
        debug!(seat, ?action, "action");
        self.history.push(MoveRecord {
            seat,
            action,
            elapsed: self.round_started.elapsed(),
        });
    }

    /// Check invariants, halting the session if they fail.
    fn verify(&mut self) -> Result<(), GameError> {
        if let Err(e) = self.check_invariants() {
            error!(error = %e, round = self.round, "halting round");
            self.phase = Phase::Halted;
            return Err(e);
        }
        Ok(())
    }

    fn notify(&mut self) {
        if self.observer.is_none() {
            return;
        }
        let snapshot = self.snapshot();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_state_changed(&snapshot);
        }
    }

    fn playing_ends(&self) -> Result<Ends, GameError> {
        self.board
            .ends()
            .ok_or_else(|| GameError::InvariantViolation("playing on an empty board".into()))
    }

    fn ensure_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn ensure_in_round(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingOpening | Phase::Playing => Ok(()),
            actual => Err(GameError::WrongPhase {
                expected: Phase::Playing,
                actual,
            }),
        }
    }

    fn ensure_human(&self) -> Result<(), GameError> {
        self.ensure_in_round()?;
        match self.seat_kind(self.current) {
            Some(SeatKind::Human) => Ok(()),
            _ => Err(GameError::NotHumanTurn { seat: self.current }),
        }
    }
}

/// Seat and tile that open a round: the globally largest double, or failing
/// that the heaviest tile. Ties on the heaviest tile cannot occur since no
/// tile is held twice.
fn opening_for(hands: &[Hand]) -> Option<(usize, Tile)> {
    let holder = |pick: fn(&[Tile]) -> Option<Tile>| {
        hands
            .iter()
            .enumerate()
            .filter_map(|(seat, h)| pick(h.tiles()).map(|t| (seat, t)))
            .max_by_key(|&(_, t)| (t.total_pips(), t.high()))
    };
    holder(TileSet::largest_double).or_else(|| holder(TileSet::heaviest))
}

/// Points the round winner collects under `modality`.
fn round_points(modality: Modality, end: RoundEnd, winner: usize, remaining: &[u32]) -> u32 {
    match (modality, end) {
        (Modality::Classic, RoundEnd::Domino) => remaining
            .iter()
            .enumerate()
            .filter(|&(seat, _)| seat != winner)
            .map(|(_, pips)| pips)
            .sum(),
        (Modality::Scoring, RoundEnd::Domino) => remaining.iter().sum(),
        (Modality::Classic | Modality::Scoring, RoundEnd::Block) => 0,
        (Modality::Block, _) => BLOCK_ROUND_POINTS,
    }
}
