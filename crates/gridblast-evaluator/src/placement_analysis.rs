//! Analysis of board state after a placement.
//!
//! [`PlacementAnalysis`] simulates one turn on a copy of the board: the piece is
//! placed, full lines are cleared and the turn is scored with the session's
//! rules and current combo streak. It combines
//!
//! 1. **Turn result** - lines cleared and points gained by this placement
//! 2. **Board state** - the resulting board metrics via [`BoardAnalysis`]
//!
//! Board features read both parts, so placement-specific features (piece fit,
//! edge contact) and board-state features (holes, heights) share one analysis.

use gridblast_engine::{Board, GameSession, Placement, Position, ScoringRules};

use crate::board_analysis::BoardAnalysis;

#[derive(Debug)]
pub struct PlacementAnalysis {
    placement: Placement,
    cleared_lines: usize,
    score_gain: u64,
    combo_active: bool,
    board_analysis: BoardAnalysis,
}

impl PlacementAnalysis {
    /// Simulates `placement` against the current state of `session`.
    ///
    /// Returns `None` if the placement is not legal on the session's board.
    #[must_use]
    pub fn from_session(session: &GameSession, placement: Placement) -> Option<Self> {
        Self::from_board(
            session.board(),
            session.rules().scoring(),
            session.stats().combo_streak(),
            placement,
        )
    }

    /// Simulates `placement` on `board` with an explicit scoring context.
    #[must_use]
    pub fn from_board(
        before_placement: &Board,
        scoring: &ScoringRules,
        combo_streak: u32,
        placement: Placement,
    ) -> Option<Self> {
        let mut board = before_placement.clone();
        let filled = board.place(placement.piece(), placement.origin()).ok()?;
        let cleared_lines = board.clear_lines(filled);
        let all_clear = cleared_lines > 0 && board.is_empty();
        let score_gain = scoring.turn_points(
            placement.piece().cell_count(),
            cleared_lines,
            combo_streak,
            all_clear,
        );

        Some(Self {
            placement,
            cleared_lines,
            score_gain,
            combo_active: combo_streak > 0,
            board_analysis: BoardAnalysis::from_board(&board),
        })
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Points the placement would earn.
    #[must_use]
    pub fn score_gain(&self) -> u64 {
        self.score_gain
    }

    /// Whether a combo streak was running before the placement.
    #[must_use]
    pub fn combo_active(&self) -> bool {
        self.combo_active
    }

    /// Metrics of the board after placement and clearing.
    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }

    /// Cells covered by the placed piece.
    pub fn piece_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.placement
            .piece()
            .cells_at(self.placement.origin())
    }
}
