pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;

/// Widest board supported (one bit per column in a [`BitRow`]).
pub const MAX_BOARD_WIDTH: usize = 16;
/// Tallest board supported.
pub const MAX_BOARD_HEIGHT: usize = 16;
/// Largest extent of a piece along either axis.
pub const MAX_PIECE_EXTENT: usize = 5;
