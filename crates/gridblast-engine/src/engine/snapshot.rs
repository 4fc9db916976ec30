use serde::{Deserialize, Serialize};

use crate::core::piece::{PieceId, Position};

use super::game_session::GameSession;

/// Serializable view of a session for external agents.
///
/// The layout is stable: fields are only ever added, and `version` is bumped
/// when their meaning changes.
///
/// ```
/// use gridblast_engine::{GameRules, GameSession, PieceSeed};
///
/// let session = GameSession::new(&GameRules::default(), PieceSeed::from_u64(4));
/// let json = serde_json::to_value(session.snapshot()).unwrap();
///
/// assert_eq!(json["board"]["grid"].as_array().unwrap().len(), 8);
/// assert_eq!(json["hand"].as_array().unwrap().len(), 3);
/// assert_eq!(json["status"]["game_over"], false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub board: BoardSnapshot,
    pub score: u64,
    pub moves: usize,
    pub hand: Vec<HandSlotSnapshot>,
    pub combo: ComboSnapshot,
    pub status: StatusSnapshot,
}

/// Occupancy matrix, `grid[row][col]` is 1 for an occupied cell and 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSlotSnapshot {
    pub slot: usize,
    pub piece: Option<PieceSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub name: String,
    pub cells: Vec<Position>,
    pub width: usize,
    pub height: usize,
    /// Every origin where the piece currently fits, in row-major order.
    pub legal_origins: Vec<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSnapshot {
    pub streak: u32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub game_over: bool,
    pub any_move_available: bool,
}

impl SessionSnapshot {
    pub const VERSION: u32 = 1;

    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        let board = session.board();
        let grid = board
            .rows()
            .map(|row| row.iter_cells(board.width()).map(u8::from).collect())
            .collect();

        let hand = session
            .hand()
            .slots()
            .enumerate()
            .map(|(slot, piece)| HandSlotSnapshot {
                slot,
                piece: piece.map(|piece| PieceSnapshot {
                    id: piece.id(),
                    name: piece.id().to_string(),
                    cells: piece.offsets().collect(),
                    width: piece.width(),
                    height: piece.height(),
                    legal_origins: board.legal_origins(piece).collect(),
                }),
            })
            .collect();

        let stats = session.stats();
        Self {
            version: Self::VERSION,
            board: BoardSnapshot {
                width: board.width(),
                height: board.height(),
                grid,
            },
            score: stats.score(),
            moves: stats.moves(),
            hand,
            combo: ComboSnapshot {
                streak: stats.combo_streak(),
                active: stats.combo_streak() > 0,
            },
            status: StatusSnapshot {
                game_over: session.is_game_over(),
                any_move_available: session.has_any_legal_move(),
            },
        }
    }
}

impl GameSession {
    /// Captures the current state for the live hand-off.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}
