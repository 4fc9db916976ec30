use std::cell::OnceCell;

use arrayvec::ArrayVec;
use gridblast_engine::{Board, MAX_BOARD_HEIGHT, MAX_BOARD_WIDTH};

/// Lazily computed metrics of a board.
///
/// Each metric is computed on first access and cached, so features that share
/// intermediate values (column heights, fill counts) do not recompute them.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<ArrayVec<u8, MAX_BOARD_WIDTH>>,
    column_occupied_cells: OnceCell<ArrayVec<u8, MAX_BOARD_WIDTH>>,
    num_holes: OnceCell<u32>,
    max_height: OnceCell<u8>,
    cluster_contacts: OnceCell<u32>,
    height_std_dev: OnceCell<f32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self {
            board: board.clone(),
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            num_holes: OnceCell::new(),
            max_height: OnceCell::new(),
            cluster_contacts: OnceCell::new(),
            height_std_dev: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Height of each column: board height minus the row of its topmost cell.
    #[must_use]
    pub fn column_heights(&self) -> &[u8] {
        self.column_heights.get_or_init(|| {
            let height = self.board.height();
            (0..self.board.width())
                .map(|col| {
                    self.board
                        .rows()
                        .position(|row| row.is_cell_occupied(col))
                        .map_or(0, |top| u8::try_from(height - top).unwrap_or(u8::MAX))
                })
                .collect()
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8] {
        self.column_occupied_cells.get_or_init(|| {
            (0..self.board.width())
                .map(|col| {
                    let count = self
                        .board
                        .rows()
                        .filter(|row| row.is_cell_occupied(col))
                        .count();
                    u8::try_from(count).unwrap_or(u8::MAX)
                })
                .collect()
        })
    }

    /// Empty cells below the topmost occupied cell of their column.
    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            std::iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(h, occ)| u32::from(h - occ))
                .sum()
        })
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        *self
            .max_height
            .get_or_init(|| self.column_heights().iter().copied().max().unwrap_or(0))
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn avg_height(&self) -> f32 {
        let heights = self.column_heights();
        let total: u32 = heights.iter().copied().map(u32::from).sum();
        total as f32 / heights.len() as f32
    }

    /// Population standard deviation of the column heights.
    #[must_use]
    pub fn height_std_dev(&self) -> f32 {
        *self.height_std_dev.get_or_init(|| {
            let heights = self.column_heights();
            let avg = self.avg_height();
            #[expect(clippy::cast_precision_loss)]
            let variance = heights
                .iter()
                .map(|&h| (f32::from(h) - avg).powi(2))
                .sum::<f32>()
                / heights.len() as f32;
            variance.sqrt()
        })
    }

    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.board.occupied_count()
    }

    /// Rows with one or two empty cells.
    #[must_use]
    pub fn rows_almost_full(&self) -> usize {
        let width = self.board.width();
        self.board
            .rows()
            .filter(|row| (width.saturating_sub(2)..width).contains(&row.count_occupied()))
            .count()
    }

    /// Columns with one or two empty cells.
    #[must_use]
    pub fn cols_almost_full(&self) -> usize {
        let height = self.board.height();
        self.column_occupied_cells()
            .iter()
            .filter(|&&n| (height.saturating_sub(2)..height).contains(&usize::from(n)))
            .count()
    }

    #[must_use]
    pub fn empty_rows(&self) -> usize {
        self.board
            .rows()
            .filter(|row| row.count_occupied() == 0)
            .count()
    }

    /// Sum over occupied cells of their occupied orthogonal neighbors.
    ///
    /// Every adjacent pair of occupied cells contributes 2.
    #[must_use]
    pub fn cluster_contacts(&self) -> u32 {
        *self.cluster_contacts.get_or_init(|| {
            let rows: ArrayVec<u16, MAX_BOARD_HEIGHT> =
                self.board.rows().map(|row| row.bits()).collect();
            let horizontal: u32 = rows.iter().map(|b| (b & (b >> 1)).count_ones()).sum();
            let vertical: u32 = rows.windows(2).map(|w| (w[0] & w[1]).count_ones()).sum();
            2 * (horizontal + vertical)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(art: &str) -> BoardAnalysis {
        BoardAnalysis::from_board(&Board::from_ascii(art))
    }

    #[test]
    fn test_empty_board() {
        let a = analysis(
            "
            ....
            ....
            ....
            ",
        );
        assert_eq!(a.column_heights(), &[0, 0, 0, 0]);
        assert_eq!(a.num_holes(), 0);
        assert_eq!(a.max_height(), 0);
        assert!(a.avg_height().abs() < f32::EPSILON);
        assert!(a.height_std_dev().abs() < f32::EPSILON);
        assert_eq!(a.empty_rows(), 3);
        assert_eq!(a.cluster_contacts(), 0);
    }

    #[test]
    fn test_heights_and_holes() {
        let a = analysis(
            "
            .#..
            ....
            ##.#
            #...
            ",
        );
        assert_eq!(a.column_heights(), &[2, 4, 0, 2]);
        assert_eq!(a.column_occupied_cells(), &[2, 2, 0, 1]);
        assert_eq!(a.num_holes(), 3);
        assert_eq!(a.max_height(), 4);
        assert!((a.avg_height() - 2.0).abs() < 1e-6);
        // heights 2,4,0,2 around mean 2: variance (0 + 4 + 4 + 0) / 4 = 2
        assert!((a.height_std_dev() - 2.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(a.occupied_cells(), 5);
        assert_eq!(a.empty_rows(), 1);
    }

    #[test]
    fn test_almost_full_lines() {
        let a = analysis(
            "
            ###.
            ##..
            #...
            ###.
            ",
        );
        // width 4: rows with 2 or 3 cells count
        assert_eq!(a.rows_almost_full(), 3);
        // column fills are 4, 3, 2, 0 on height 4
        assert_eq!(a.cols_almost_full(), 2);
    }

    #[test]
    fn test_cluster_contacts() {
        let a = analysis(
            "
            ##.
            #..
            ...
            ",
        );
        // pairs: (0,0)-(0,1) and (0,0)-(1,0)
        assert_eq!(a.cluster_contacts(), 4);
    }
}
