//! Board evaluation features.
//!
//! Every placement is described by a fixed, ordered vocabulary of fourteen
//! features computed on the board after the piece is placed and full lines are
//! cleared. The order of [`BoardFeature::ALL`] is the coefficient order of a
//! [`WeightVector`](crate::weights::WeightVector).
//!
//! **Board-state features** measure the resulting board:
//! - [`BoardFeature::Holes`] - Empty cells covered by an occupied cell in their column
//! - [`BoardFeature::MaxHeight`] / [`BoardFeature::AvgHeight`] - Column heights
//! - [`BoardFeature::Filled`] - Occupied cells
//! - [`BoardFeature::Cluster`] - Adjacency of occupied cells
//! - [`BoardFeature::RowsAlmostFull`] / [`BoardFeature::ColsAlmostFull`] - Lines one or two cells from clearing
//! - [`BoardFeature::EmptyRows`] - Rows with no occupied cell
//! - [`BoardFeature::HeightSpread`] - Standard deviation of column heights
//!
//! **Placement features** depend on the move itself:
//! - [`BoardFeature::EdgeContact`] - Piece cells on the board border
//! - [`BoardFeature::PieceFit`] - Occupied or out-of-bounds neighbors of the piece cells
//! - [`BoardFeature::ClearedLines`] - Rows plus columns cleared
//! - [`BoardFeature::ComboPreservation`] - Line clears, worth more while a streak is running
//! - [`BoardFeature::ImmediateGain`] - Points earned by the turn
//!
//! Raw values are used as-is; the sign and scale of each contribution live in
//! the weights.

use std::fmt;

use crate::placement_analysis::PlacementAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardFeature {
    Holes,
    MaxHeight,
    AvgHeight,
    Filled,
    EdgeContact,
    Cluster,
    RowsAlmostFull,
    ColsAlmostFull,
    EmptyRows,
    ComboPreservation,
    PieceFit,
    HeightSpread,
    ClearedLines,
    ImmediateGain,
}

impl BoardFeature {
    pub const LEN: usize = 14;

    pub const ALL: [Self; Self::LEN] = [
        Self::Holes,
        Self::MaxHeight,
        Self::AvgHeight,
        Self::Filled,
        Self::EdgeContact,
        Self::Cluster,
        Self::RowsAlmostFull,
        Self::ColsAlmostFull,
        Self::EmptyRows,
        Self::ComboPreservation,
        Self::PieceFit,
        Self::HeightSpread,
        Self::ClearedLines,
        Self::ImmediateGain,
    ];

    /// Position of the feature in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used in weight files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Holes => "holes",
            Self::MaxHeight => "max_height",
            Self::AvgHeight => "avg_height",
            Self::Filled => "filled",
            Self::EdgeContact => "edge_contact",
            Self::Cluster => "cluster",
            Self::RowsAlmostFull => "rows_almost_full",
            Self::ColsAlmostFull => "cols_almost_full",
            Self::EmptyRows => "empty_rows",
            Self::ComboPreservation => "combo_preservation",
            Self::PieceFit => "piece_fit",
            Self::HeightSpread => "height_spread",
            Self::ClearedLines => "cleared_lines",
            Self::ImmediateGain => "immediate_gain",
        }
    }


    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    /// Coefficient used when no trained weights are available.
    #[must_use]
    pub const fn default_weight(self) -> f32 {
        match self {
            Self::Holes => -8.0,
            Self::MaxHeight => -3.0,
            Self::AvgHeight => -1.0,
            Self::Filled => -0.3,
            Self::EdgeContact => -2.0,
            Self::Cluster => 4.0,
            Self::RowsAlmostFull | Self::ColsAlmostFull => 15.0,
            Self::EmptyRows => 5.0,
            Self::ComboPreservation => 50.0,
            Self::PieceFit => 8.0,
            Self::HeightSpread => -3.0,
            Self::ClearedLines => 100.0,
            Self::ImmediateGain => 1.0,
        }
    }

    /// Range `(low, high)` random initial coefficients are drawn from.
    ///
    /// The range is also the scale of mutation noise during training.
    #[must_use]
    pub const fn init_range(self) -> (f32, f32) {
        match self {
            Self::Holes => (-15.0, -1.0),
            Self::MaxHeight => (-8.0, -0.5),
            Self::AvgHeight => (-5.0, -0.1),
            Self::Filled => (-2.0, 0.0),
            Self::EdgeContact => (-5.0, 0.0),
            Self::Cluster => (0.0, 10.0),
            Self::RowsAlmostFull | Self::ColsAlmostFull => (5.0, 30.0),
            Self::EmptyRows => (0.0, 15.0),
            Self::ComboPreservation => (20.0, 100.0),
            Self::PieceFit => (2.0, 20.0),
            Self::HeightSpread => (-10.0, 0.0),
            Self::ClearedLines => (50.0, 200.0),
            Self::ImmediateGain => (0.0, 5.0),
        }
    }

    /// Computes the raw value of this feature for a placement.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(self, analysis: &PlacementAnalysis) -> f32 {
        let board = analysis.board_analysis();
        match self {
            Self::Holes => board.num_holes() as f32,
            Self::MaxHeight => f32::from(board.max_height()),
            Self::AvgHeight => board.avg_height(),
            Self::Filled => board.occupied_cells() as f32,
            Self::EdgeContact => edge_contact(analysis) as f32,
            Self::Cluster => board.cluster_contacts() as f32,
            Self::RowsAlmostFull => board.rows_almost_full() as f32,
            Self::ColsAlmostFull => board.cols_almost_full() as f32,
            Self::EmptyRows => board.empty_rows() as f32,
            Self::ComboPreservation => {
                let per_line = if analysis.combo_active() { 30.0 } else { 10.0 };
                per_line * analysis.cleared_lines() as f32
            }
            Self::PieceFit => piece_fit(analysis) as f32,
            Self::HeightSpread => board.height_std_dev(),
            Self::ClearedLines => analysis.cleared_lines() as f32,
            Self::ImmediateGain => analysis.score_gain() as f32,
        }
    }

    /// Computes every feature in vocabulary order.
    #[must_use]
    pub fn compute_all(analysis: &PlacementAnalysis) -> [f32; Self::LEN] {
        Self::ALL.map(|f| f.compute(analysis))
    }
}

impl fmt::Display for BoardFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn edge_contact(analysis: &PlacementAnalysis) -> usize {
    let board = analysis.board_analysis().board();
    let (last_row, last_col) = (board.height() - 1, board.width() - 1);
    analysis
        .piece_cells()
        .filter(|p| p.row() == 0 || p.col() == 0 || p.row() == last_row || p.col() == last_col)
        .count()
}

fn piece_fit(analysis: &PlacementAnalysis) -> usize {
    let board = analysis.board_analysis().board();
    let (height, width) = (board.height(), board.width());
    let blocked = |row: Option<usize>, col: Option<usize>| match (row, col) {
        (Some(r), Some(c)) if r < height && c < width => {
            board.is_occupied(gridblast_engine::Position::new(r, c))
        }
        _ => true,
    };
    analysis
        .piece_cells()
        .map(|p| {
            let (r, c) = (p.row(), p.col());
            [
                (Some(r), Some(c + 1)),
                (Some(r + 1), Some(c)),
                (Some(r), c.checked_sub(1)),
                (r.checked_sub(1), Some(c)),
            ]
            .into_iter()
            .filter(|&(nr, nc)| blocked(nr, nc))
            .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use gridblast_engine::{Board, PieceCatalog, PieceId, Placement, Position, ScoringRules};

    use super::*;

    fn analyze(art: &str, piece: u8, origin: (usize, usize), streak: u32) -> PlacementAnalysis {
        let piece = *PieceCatalog::standard().get(PieceId::new(piece)).unwrap();
        let placement = Placement::new(0, piece, Position::new(origin.0, origin.1));
        PlacementAnalysis::from_board(
            &Board::from_ascii(art),
            &ScoringRules::default(),
            streak,
            placement,
        )
        .unwrap()
    }

    #[test]
    fn test_ids_are_unique_and_round_trip() {
        for (i, feature) in BoardFeature::ALL.into_iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(BoardFeature::from_id(feature.id()), Some(feature));
            let (low, high) = feature.init_range();
            assert!(low < high, "{feature}");
        }
        assert_eq!(BoardFeature::from_id("diversity"), None);
    }

    #[test]
    fn test_corner_single_cell() {
        let a = analyze(
            "
            ....
            ....
            ....
            ....
            ",
            0,
            (0, 0),
            0,
        );
        let values = BoardFeature::compute_all(&a);
        assert_eq!(values[BoardFeature::Filled.index()], 1.0);
        assert_eq!(values[BoardFeature::MaxHeight.index()], 4.0);
        assert_eq!(values[BoardFeature::Holes.index()], 3.0);
        assert_eq!(values[BoardFeature::EdgeContact.index()], 1.0);
        // two border sides
        assert_eq!(values[BoardFeature::PieceFit.index()], 2.0);
        assert_eq!(values[BoardFeature::EmptyRows.index()], 3.0);
        assert_eq!(values[BoardFeature::ClearedLines.index()], 0.0);
        assert_eq!(values[BoardFeature::ComboPreservation.index()], 0.0);
        assert_eq!(values[BoardFeature::ImmediateGain.index()], 1.0);
    }

    #[test]
    fn test_clearing_placement() {
        let board = "
            ###.
            ....
            ....
            ....
            ";
        let a = analyze(board, 0, (0, 3), 0);
        assert_eq!(a.cleared_lines(), 1);
        assert_eq!(BoardFeature::ClearedLines.compute(&a), 1.0);
        assert_eq!(BoardFeature::ComboPreservation.compute(&a), 10.0);
        // 1 cell + 10 line bonus + 300 all-clear
        assert_eq!(BoardFeature::ImmediateGain.compute(&a), 311.0);
        assert_eq!(BoardFeature::Filled.compute(&a), 0.0);

        let streaking = analyze(board, 0, (0, 3), 2);
        assert_eq!(BoardFeature::ComboPreservation.compute(&streaking), 30.0);
        assert_eq!(BoardFeature::ImmediateGain.compute(&streaking), 1.0 + 30.0 + 300.0);
    }

    #[test]
    fn test_piece_fit_counts_neighbors() {
        let a = analyze(
            "
            ....
            .#..
            ....
            ....
            ",
            0,
            (1, 2),
            0,
        );
        // left neighbor occupied, no border
        assert_eq!(BoardFeature::PieceFit.compute(&a), 1.0);
        assert_eq!(BoardFeature::EdgeContact.compute(&a), 0.0);
        assert_eq!(BoardFeature::Cluster.compute(&a), 2.0);
    }

    #[test]
    fn test_illegal_placement_has_no_analysis() {
        let piece = *PieceCatalog::standard().get(PieceId::new(0)).unwrap();
        let placement = Placement::new(0, piece, Position::new(0, 0));
        let board = Board::from_ascii("#.\n..");
        assert!(
            PlacementAnalysis::from_board(&board, &ScoringRules::default(), 0, placement)
                .is_none()
        );
    }
}
