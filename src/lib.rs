//! Domino-Rust: a double-six domino rules engine.
//!
//! This crate provides the rules core of a domino game: the tile set,
//! dealing and drawing, the board chain, move validation, a turn engine
//! with three scoring modalities, and three AI opponents. Rendering, input,
//! and persistence are left to the host.
//!
//! ## Modules
//!
//! - [`constants`] - Tile set geometry, hand sizes, scoring and AI weights
//! - [`tile`] - The immutable tile value object
//! - [`tileset`] - Building, shuffling, dealing, and the draw pile
//! - [`board`] - The placed chain and its two open ends
//! - [`validator`] - Move legality
//! - [`ai`] - Random, greedy, and scored move selection
//! - [`config`] - Modality, seats, and difficulty
//! - [`game`] - The turn engine (`GameSession`)
//! - [`playout`] - Headless AI-only rounds and matches
//! - [`protocol`] - Text command protocol for driving a session
//!
//! ## Example
//!
//! ```
//! use domino_rust::config::{Difficulty, GameConfig, Modality};
//! use domino_rust::game::{GameSession, Phase};
//!
//! // Seat 0 is human, seat 1 is the heuristic AI
//! let config = GameConfig::single_player(Modality::Classic, 2, Difficulty::Medium).with_seed(7);
//! let mut session = GameSession::new(config).unwrap();
//!
//! // Let the AI act if it holds the opening tile
//! session.advance_ai().unwrap();
//! if session.phase() == Phase::AwaitingOpening {
//!     session.play_opening().unwrap();
//! }
//! println!("Board: {}", session.board());
//! ```

pub mod ai;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod playout;
pub mod protocol;
pub mod tile;
pub mod tileset;
pub mod validator;

pub use error::GameError;
