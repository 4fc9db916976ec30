//! Game rules and session orchestration.
//!
//! This module builds the turn-by-turn game on top of the core data structures:
//!
//! - [`GameConfig`] / [`GameRules`] - Externally supplied parameters and their validated form
//! - [`GameSession`] - One game: board, hand, statistics and the terminal flag
//! - [`GameStats`] / [`ScoringRules`] - Score, combo streak and line-clear bookkeeping
//! - [`Hand`] - The pieces currently available to place
//! - [`PieceDealer`] / [`PieceSeed`] - Seeded hand refills
//! - [`SessionSnapshot`] - Stable serializable view of a session for external agents
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from validated rules and a seed; the first hand is dealt
//! 2. Pick a hand slot and an origin, call [`GameSession::place`]
//! 3. Full rows and columns are cleared and the turn is scored
//! 4. The hand is refilled once every slot has been used
//! 5. Repeat until no piece in the hand fits anywhere
//!
//! Sessions built from the same rules and seed replay identically for the same
//! sequence of placements.

pub use self::{
    config::*, game_session::*, game_stats::*, hand::*, piece_dealer::*, snapshot::*,
};

mod config;
mod game_session;
mod game_stats;
mod hand;
mod piece_dealer;
mod snapshot;
