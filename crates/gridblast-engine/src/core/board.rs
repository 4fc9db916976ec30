use std::fmt;

use arrayvec::ArrayVec;

use crate::{ConfigError, IllegalPlacementError};

use super::{
    MAX_BOARD_HEIGHT, MAX_BOARD_WIDTH,
    piece::{Piece, Position},
};

/// Single row of the board as a 16-bit bitmask.
///
/// Bit N is column N. Bits at or beyond the board width are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    /// Checks if the cell at column `col` is occupied.
    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, col: usize) -> bool {
        (self.bits & (1 << col)) != 0
    }

    /// Checks if any cell in the given mask (shifted by col0) is occupied.
    #[inline]
    #[must_use]
    fn is_any_cell_occupied(self, col0: usize, mask: u16) -> bool {
        (self.bits & (mask << col0)) != 0
    }

    /// Sets cells in the given mask (shifted by col0) as occupied.
    #[inline]
    fn occupy_cells(&mut self, col0: usize, mask: u16) {
        self.bits |= mask << col0;
    }

    #[inline]
    fn clear_cells(&mut self, mask: u16) {
        self.bits &= !mask;
    }

    /// Number of occupied cells in the row.
    #[inline]
    #[must_use]
    pub const fn count_occupied(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Checks if every cell of a row `width` cells wide is occupied.
    #[inline]
    #[must_use]
    pub const fn is_filled(self, width: usize) -> bool {
        let mask = width_mask(width);
        self.bits & mask == mask
    }

    /// Iterates over the first `width` cells, returning their occupied status.
    pub fn iter_cells(self, width: usize) -> impl Iterator<Item = bool> {
        (0..width).map(move |col| self.is_cell_occupied(col))
    }
}

const fn width_mask(width: usize) -> u16 {
    if width == 0 {
        0
    } else {
        u16::MAX >> (MAX_BOARD_WIDTH - width)
    }
}

/// Board dimensions, each within `1..=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSize {
    width: u8,
    height: u8,
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BoardSize {
    /// The 8×8 board of the standard game.
    pub const STANDARD: Self = Self {
        width: 8,
        height: 8,
    };

    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if !(1..=MAX_BOARD_WIDTH).contains(&width) {
            return Err(ConfigError::new(
                "width",
                format!("must be between 1 and {MAX_BOARD_WIDTH}, got {width}"),
            ));
        }
        if !(1..=MAX_BOARD_HEIGHT).contains(&height) {
            return Err(ConfigError::new(
                "height",
                format!("must be between 1 and {MAX_BOARD_HEIGHT}, got {height}"),
            ));
        }
        #[expect(clippy::cast_possible_truncation)]
        let size = Self {
            width: width as u8,
            height: height as u8,
        };
        Ok(size)
    }

    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width() * self.height()
    }

    /// Checks if a piece fits inside the bounds when placed at `origin`.
    #[must_use]
    pub const fn contains(self, piece: &Piece, origin: Position) -> bool {
        origin.row() + piece.height() <= self.height()
            && origin.col() + piece.width() <= self.width()
    }
}

/// Full rows and columns reported by [`Board::place`].
///
/// Stored as one bit per row index and one bit per column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilledLines {
    rows: u16,
    columns: u16,
}

impl FilledLines {
    pub const NONE: Self = Self {
        rows: 0,
        columns: 0,
    };

    /// Indices of the full rows, ascending.
    pub fn rows(self) -> impl Iterator<Item = usize> {
        (0..MAX_BOARD_HEIGHT).filter(move |r| self.rows & (1 << r) != 0)
    }

    /// Indices of the full columns, ascending.
    pub fn columns(self) -> impl Iterator<Item = usize> {
        (0..MAX_BOARD_WIDTH).filter(move |c| self.columns & (1 << c) != 0)
    }

    /// Total number of lines (rows plus columns).
    #[must_use]
    pub const fn count(self) -> usize {
        (self.rows.count_ones() + self.columns.count_ones()) as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.rows == 0 && self.columns == 0
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.rows |= 1 << row;
        self
    }

    #[must_use]
    pub fn with_column(mut self, col: usize) -> Self {
        self.columns |= 1 << col;
        self
    }
}

/// The playing grid.
///
/// Each row is a [`BitRow`]; a cell is occupied iff some placed piece covered
/// it and it has not been cleared since. The board is only mutated through
/// [`Board::place`] and [`Board::clear_lines`].
///
/// # Example
///
/// ```
/// use gridblast_engine::{Board, PieceCatalog, Position};
///
/// let catalog = PieceCatalog::standard();
/// let bar = catalog.iter().find(|p| p.width() == 4 && p.height() == 1).unwrap();
///
/// let mut board = Board::from_ascii(
///     "
///     ....####
///     ........
///     ",
/// );
/// let filled = board.place(bar, Position::new(0, 0)).unwrap();
/// assert_eq!(filled.rows().collect::<Vec<_>>(), [0]);
///
/// assert_eq!(board.clear_lines(filled), 1);
/// assert!(board.is_empty());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: BoardSize,
    rows: ArrayVec<BitRow, MAX_BOARD_HEIGHT>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(BoardSize::STANDARD)
    }
}

impl Board {
    #[must_use]
    pub fn empty(size: BoardSize) -> Self {
        let mut rows = ArrayVec::new();
        for _ in 0..size.height() {
            rows.push(BitRow::EMPTY);
        }
        Self { size, rows }
    }

    #[must_use]
    pub const fn size(&self) -> BoardSize {
        self.size
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.size.width()
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.size.height()
    }

    /// Returns an iterator over the rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows.iter().copied()
    }

    #[must_use]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.rows[pos.row()].is_cell_occupied(pos.col())
    }

    /// Checks if no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.bits == 0)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(|row| row.count_occupied()).sum()
    }

    /// Checks whether every cell of `piece` at `origin` is in bounds and empty.
    #[must_use]
    pub fn can_place(&self, piece: &Piece, origin: Position) -> bool {
        if !self.size.contains(piece, origin) {
            return false;
        }
        let col0 = origin.col();
        piece
            .row_masks()
            .iter()
            .zip(&self.rows[origin.row()..])
            .all(|(&mask, row)| !row.is_any_cell_occupied(col0, mask))
    }

    /// Marks the footprint of `piece` at `origin` as occupied.
    ///
    /// Returns every row and column that is fully occupied afterwards. The
    /// board is left unchanged when the placement is illegal.
    pub fn place(
        &mut self,
        piece: &Piece,
        origin: Position,
    ) -> Result<FilledLines, IllegalPlacementError> {
        if !self.can_place(piece, origin) {
            return Err(IllegalPlacementError::Blocked {
                piece: piece.id(),
                origin,
            });
        }
        let col0 = origin.col();
        for (&mask, row) in piece.row_masks().iter().zip(&mut self.rows[origin.row()..]) {
            row.occupy_cells(col0, mask);
        }
        Ok(self.filled_lines())
    }

    /// Collects every fully occupied row and column.
    #[must_use]
    pub fn filled_lines(&self) -> FilledLines {
        let width = self.width();
        let mut lines = FilledLines::NONE;
        let mut full_columns = width_mask(width);
        for (r, row) in self.rows.iter().enumerate() {
            if row.is_filled(width) {
                lines = lines.with_row(r);
            }
            full_columns &= row.bits;
        }
        lines.columns = full_columns;
        lines
    }

    /// Empties every cell in the given rows and columns.
    ///
    /// Clearing is unconditional: lines need not be full. Returns the number
    /// of lines in `lines`. Cells at a row/column intersection are cleared once
    /// but both lines count.
    pub fn clear_lines(&mut self, lines: FilledLines) -> usize {
        let height = self.height();
        for r in lines.rows().filter(|&r| r < height) {
            self.rows[r] = BitRow::EMPTY;
        }
        let column_mask = lines.columns & width_mask(self.width());
        if column_mask != 0 {
            for row in &mut self.rows {
                row.clear_cells(column_mask);
            }
        }
        lines.count()
    }

    /// Legal origins of `piece`, in row-major order.
    pub fn legal_origins<'a>(&'a self, piece: &'a Piece) -> impl Iterator<Item = Position> + 'a {
        let max_row = (self.height() + 1).saturating_sub(piece.height());
        let max_col = (self.width() + 1).saturating_sub(piece.width());
        (0..max_row)
            .flat_map(move |r| (0..max_col).map(move |c| Position::new(r, c)))
            .filter(move |&origin| self.can_place(piece, origin))
    }

    /// The first legal origin of `piece` in row-major order, if any.
    #[must_use]
    pub fn first_legal_origin(&self, piece: &Piece) -> Option<Position> {
        self.legal_origins(piece).next()
    }

    /// Checks whether at least one of `pieces` fits somewhere.
    pub fn has_any_legal_move<'a, I>(&self, pieces: I) -> bool
    where
        I: IntoIterator<Item = &'a Piece>,
    {
        pieces
            .into_iter()
            .any(|piece| self.first_legal_origin(piece).is_some())
    }

    /// Occupancy as a row-major matrix of booleans.
    #[must_use]
    pub fn to_grid(&self) -> Vec<Vec<bool>> {
        self.rows
            .iter()
            .map(|row| row.iter_cells(self.width()).collect())
            .collect()
    }

    /// Creates a `Board` from ASCII art, for tests and examples.
    ///
    /// `#` is an occupied cell and `.` an empty one; other characters are
    /// ignored. Blank lines are skipped and the first row sets the width.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in width or the dimensions are out of range.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<Vec<bool>> = art
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| *c == '#' || *c == '.')
                    .map(|c| c == '#')
                    .collect()
            })
            .collect();
        let width = lines.first().map_or(0, Vec::len);
        let size = BoardSize::new(width, lines.len()).expect("ASCII board dimensions in range");

        let mut board = Self::empty(size);
        for (r, cells) in lines.iter().enumerate() {
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {r}",
                cells.len(),
            );
            for (c, &occupied) in cells.iter().enumerate() {
                if occupied {
                    board.rows[r].occupy_cells(c, 0b1);
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for occupied in row.iter_cells(self.width()) {
                f.write_str(if occupied { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.width(), self.height())?;
        fmt::Display::fmt(self, f)
    }
}
