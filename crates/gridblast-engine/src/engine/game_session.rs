use crate::{
    IllegalPlacementError, TurnError,
    core::{
        board::{Board, FilledLines},
        piece::{Piece, Position},
    },
};

use super::{
    config::GameRules,
    game_stats::GameStats,
    hand::Hand,
    piece_dealer::{PieceDealer, PieceSeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Active,
    GameOver,
}

/// A legal move: the piece in `slot` placed with its top-left corner at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    slot: usize,
    piece: Piece,
    origin: Position,
}

impl Placement {
    #[must_use]
    pub fn new(slot: usize, piece: Piece, origin: Position) -> Self {
        Self {
            slot,
            piece,
            origin,
        }
    }

    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn origin(&self) -> Position {
        self.origin
    }
}

/// Result of an accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    points: u64,
    cleared: FilledLines,
    all_clear: bool,
    combo_streak: u32,
    hand_refilled: bool,
    game_over: bool,
}

impl TurnOutcome {
    /// Points earned by this turn.
    #[must_use]
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Rows and columns cleared by this turn.
    #[must_use]
    pub fn cleared(&self) -> FilledLines {
        self.cleared
    }

    #[must_use]
    pub fn cleared_count(&self) -> usize {
        self.cleared.count()
    }

    #[must_use]
    pub fn is_all_clear(&self) -> bool {
        self.all_clear
    }

    /// Combo streak after this turn.
    #[must_use]
    pub fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    #[must_use]
    pub fn hand_refilled(&self) -> bool {
        self.hand_refilled
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

/// One game from the first hand to game over.
///
/// Each accepted placement is one atomic turn: the piece is placed, every full
/// row and column is cleared, the turn is scored, the hand is refilled when all
/// of its slots are used, and the session ends if no piece in the hand fits.
/// Game over is absorbing. A rejected placement leaves the session untouched.
///
/// # Example
///
/// ```
/// use gridblast_engine::{GameRules, GameSession, PieceSeed, Position, TurnError};
///
/// let mut session = GameSession::new(&GameRules::default(), PieceSeed::from_u64(1));
/// let slot = session.hand().pieces().next().unwrap().0;
///
/// session.place(slot, Position::new(0, 0)).unwrap();
/// let err = session.place(slot, Position::new(0, 0)).unwrap_err();
/// assert!(err.is_illegal_placement());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    rules: GameRules,
    board: Board,
    hand: Hand,
    dealer: PieceDealer,
    stats: GameStats,
    state: SessionState,
    seed: PieceSeed,
}

impl GameSession {
    /// Starts a game on an empty board and deals the first hand.
    #[must_use]
    pub fn new(rules: &GameRules, seed: PieceSeed) -> Self {
        Self::with_board(rules, seed, Board::empty(rules.size()))
    }

    /// Like [`Self::new`], but starting from an arbitrary board.
    ///
    /// # Panics
    ///
    /// Panics if the board size differs from the rules.
    #[must_use]
    pub fn with_board(rules: &GameRules, seed: PieceSeed, board: Board) -> Self {
        assert_eq!(board.size(), rules.size(), "board size must match the rules");
        let mut dealer = PieceDealer::new(rules.catalog().clone(), rules.deal_policy(), seed);
        let hand = dealer.deal(&board, rules.hand_slots());
        let mut this = Self {
            rules: rules.clone(),
            board,
            hand,
            dealer,
            stats: GameStats::new(),
            state: SessionState::Active,
            seed,
        };
        this.update_state();
        this
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    /// Checks whether any piece in the hand fits anywhere on the board.
    #[must_use]
    pub fn has_any_legal_move(&self) -> bool {
        self.board
            .has_any_legal_move(self.hand.pieces().map(|(_, piece)| piece))
    }

    /// All legal placements, ordered by slot, then row, then column.
    pub fn legal_placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.hand.pieces().flat_map(move |(slot, piece)| {
            self.board
                .legal_origins(piece)
                .map(move |origin| Placement {
                    slot,
                    piece: *piece,
                    origin,
                })
        })
    }

    /// Plays one turn with the piece in `slot` at `origin`.
    pub fn place(&mut self, slot: usize, origin: Position) -> Result<TurnOutcome, TurnError> {
        if self.state.is_game_over() {
            return Err(TurnError::SessionOver);
        }
        let piece = *self
            .hand
            .get(slot)
            .ok_or(IllegalPlacementError::EmptySlot { slot })?;
        let filled = self.board.place(&piece, origin)?;
        self.hand.take(slot);

        let cleared = self.board.clear_lines(filled);
        let all_clear = cleared > 0 && self.board.is_empty();
        let points = self.stats.complete_turn(
            self.rules.scoring(),
            piece.cell_count(),
            cleared,
            all_clear,
        );

        let hand_refilled = self.hand.is_empty();
        if hand_refilled {
            self.hand = self.dealer.deal(&self.board, self.rules.hand_slots());
        }
        self.update_state();

        Ok(TurnOutcome {
            points,
            cleared: filled,
            all_clear,
            combo_streak: self.stats.combo_streak(),
            hand_refilled,
            game_over: self.state.is_game_over(),
        })
    }

    fn update_state(&mut self) {
        if !self.has_any_legal_move() {
            self.state = SessionState::GameOver;
        }
    }
}
