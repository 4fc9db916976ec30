//! Deterministic game engine for the gridblast block-placement puzzle.
//!
//! Pieces from a fixed [`PieceCatalog`] are dealt into a [`Hand`] and placed
//! anywhere they fit on a [`Board`]. Every row or column that becomes fully
//! occupied is cleared, and points are awarded for placed cells, cleared lines
//! and consecutive clearing turns (the combo streak). A [`GameSession`] ends
//! when no piece in the hand fits anywhere on the board.
//!
//! # Example
//!
//! ```
//! use gridblast_engine::{GameConfig, GameSession, PieceSeed};
//!
//! let rules = GameConfig::default().validate().unwrap();
//! let mut session = GameSession::new(&rules, PieceSeed::from_u64(7));
//!
//! let placement = session.legal_placements().next().unwrap();
//! let outcome = session.place(placement.slot(), placement.origin()).unwrap();
//! assert!(outcome.points() > 0);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A placement request the board or the hand rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalPlacementError {
    #[display("hand slot {slot} is empty or does not exist")]
    EmptySlot { slot: usize },
    #[display("piece {piece} does not fit at {origin}")]
    Blocked { piece: PieceId, origin: Position },
}

/// Failure of a single game turn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum TurnError {
    #[display("illegal placement: {_0}")]
    IllegalPlacement(IllegalPlacementError),
    #[display("session is already over")]
    #[from(ignore)]
    SessionOver,
}

/// An out-of-range configuration value.
///
/// Reported at startup and never silently clamped. `field` is the dotted path
/// of the offending value (e.g. `game.width`).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid configuration `{field}`: {reason}")]
pub struct ConfigError {
    field: String,
    reason: String,
}

impl ConfigError {
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Prepends a parent section name to the field path.
    #[must_use]
    pub fn within(mut self, section: &str) -> Self {
        self.field = format!("{section}.{}", self.field);
        self
    }
}
