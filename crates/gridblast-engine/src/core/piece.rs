use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

use super::MAX_PIECE_EXTENT;

/// Identifier of a piece shape within its [`PieceCatalog`].
///
/// Displayed as `P{index}` (e.g. `P0` for the single cell of the standard catalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(u8);

impl PieceId {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A cell coordinate on the board, or a piece origin.
///
/// Row 0 is the top row and column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn new(row: usize, col: usize) -> Self {
        assert!(row <= u8::MAX as usize && col <= u8::MAX as usize);
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An immutable piece shape.
///
/// The shape is stored as one bitmask per row (bit N set means column N of the
/// bounding box is covered), which lets the board test and apply a placement
/// with one mask operation per row. Offsets are normalized so that the topmost
/// row and the leftmost column of the shape are both 0.
///
/// # Example
///
/// ```
/// use gridblast_engine::{PieceCatalog, Position};
///
/// let catalog = PieceCatalog::standard();
/// let corner = catalog.iter().find(|p| p.id().to_string() == "P22").unwrap();
///
/// assert_eq!((corner.height(), corner.width()), (2, 2));
/// let cells: Vec<_> = corner.offsets().collect();
/// assert_eq!(cells, [Position::new(0, 0), Position::new(0, 1), Position::new(1, 0)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    id: PieceId,
    width: u8,
    height: u8,
    cell_count: u8,
    masks: [u16; MAX_PIECE_EXTENT],
}

impl Piece {
    #[expect(clippy::cast_possible_truncation)]
    fn from_offsets(id: PieceId, offsets: &[(u8, u8)]) -> Result<Self, ConfigError> {
        let field = || format!("pieces.{id}");
        if offsets.is_empty() {
            return Err(ConfigError::new(field(), "a piece must cover at least one cell"));
        }

        let min_row = offsets.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let min_col = offsets.iter().map(|&(_, c)| c).min().unwrap_or(0);

        let mut masks = [0_u16; MAX_PIECE_EXTENT];
        let mut width = 0;
        let mut height = 0;
        for &(r, c) in offsets {
            let (r, c) = (usize::from(r - min_row), usize::from(c - min_col));
            if r >= MAX_PIECE_EXTENT || c >= MAX_PIECE_EXTENT {
                return Err(ConfigError::new(
                    field(),
                    format!("a piece may span at most {MAX_PIECE_EXTENT} rows and columns"),
                ));
            }
            let bit = 1_u16 << c;
            if masks[r] & bit != 0 {
                return Err(ConfigError::new(
                    field(),
                    format!("duplicate cell ({r}, {c})"),
                ));
            }
            masks[r] |= bit;
            width = width.max(c + 1);
            height = height.max(r + 1);
        }

        Ok(Self {
            id,
            width: width as u8,
            height: height as u8,
            cell_count: offsets.len() as u8,
            masks,
        })
    }

    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    /// Number of columns spanned by the shape.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of rows spanned by the shape.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Number of cells the shape covers.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.cell_count as usize
    }

    /// Per-row column masks, top row first, `height()` entries.
    #[must_use]
    pub fn row_masks(&self) -> &[u16] {
        &self.masks[..self.height()]
    }

    /// Covered cells relative to the origin, in row-major order.
    pub fn offsets(&self) -> impl Iterator<Item = Position> + '_ {
        self.row_masks()
            .iter()
            .enumerate()
            .flat_map(move |(r, &mask)| {
                (0..self.width())
                    .filter(move |&c| mask & (1_u16 << c) != 0)
                    .map(move |c| Position::new(r, c))
            })
    }

    /// Absolute cells covered when the piece is placed at `origin`.
    pub fn cells_at(&self, origin: Position) -> impl Iterator<Item = Position> + '_ {
        self.offsets()
            .map(move |p| Position::new(origin.row() + p.row(), origin.col() + p.col()))
    }
}

// (row, col) offsets of the standard shapes, no rotations.
const STANDARD_SHAPES: [&[(u8, u8)]; 26] = [
    // single cell
    &[(0, 0)],
    // horizontal bars
    &[(0, 0), (0, 1)],
    &[(0, 0), (0, 1), (0, 2)],
    &[(0, 0), (0, 1), (0, 2), (0, 3)],
    // vertical bars
    &[(0, 0), (1, 0)],
    &[(0, 0), (1, 0), (2, 0)],
    &[(0, 0), (1, 0), (2, 0), (3, 0)],
    // squares
    &[(0, 0), (0, 1), (1, 0), (1, 1)],
    &[
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 0),
        (1, 1),
        (1, 2),
        (2, 0),
        (2, 1),
        (2, 2),
    ],
    // L and J
    &[(0, 0), (1, 0), (2, 0), (2, 1)],
    &[(0, 1), (1, 1), (2, 0), (2, 1)],
    &[(0, 0), (0, 1), (0, 2), (1, 0)],
    &[(0, 0), (0, 1), (0, 2), (1, 2)],
    // T
    &[(0, 0), (0, 1), (0, 2), (1, 1)],
    &[(0, 1), (1, 0), (1, 1), (2, 1)],
    &[(0, 1), (1, 0), (1, 1), (1, 2)],
    &[(0, 0), (1, 0), (1, 1), (2, 0)],
    // S and Z
    &[(0, 0), (0, 1), (1, 1), (1, 2)],
    &[(0, 1), (1, 0), (1, 1), (2, 0)],
    &[(0, 1), (0, 2), (1, 0), (1, 1)],
    // corners
    &[(0, 0), (1, 0), (1, 1)],
    &[(0, 1), (1, 0), (1, 1)],
    &[(0, 0), (0, 1), (1, 0)],
    &[(0, 0), (0, 1), (1, 1)],
    // rectangles
    &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
    &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)],
];

static STANDARD_CATALOG: LazyLock<Arc<PieceCatalog>> = LazyLock::new(|| {
    Arc::new(PieceCatalog::from_shapes(&STANDARD_SHAPES).expect("standard shapes are valid"))
});

/// Immutable set of piece shapes, shared read-only by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    pieces: Vec<Piece>,
}

impl PieceCatalog {
    /// Builds a catalog from `(row, col)` cell lists.
    ///
    /// Piece identifiers follow the order of `shapes`. Offsets are normalized
    /// so each shape touches row 0 and column 0.
    pub fn from_shapes<S>(shapes: &[S]) -> Result<Self, ConfigError>
    where
        S: AsRef<[(u8, u8)]>,
    {
        if shapes.is_empty() {
            return Err(ConfigError::new("pieces", "catalog must not be empty"));
        }
        if shapes.len() > usize::from(u8::MAX) + 1 {
            return Err(ConfigError::new("pieces", "too many shapes"));
        }
        let pieces = shapes
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                #[expect(clippy::cast_possible_truncation)]
                let id = PieceId::new(i as u8);
                Piece::from_offsets(id, cells.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pieces })
    }

    /// The 26 shapes of the standard game.
    #[must_use]
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD_CATALOG)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Piece] {
        &self.pieces
    }

    /// The piece with the fewest cells (lowest identifier on ties).
    #[must_use]
    pub fn smallest(&self) -> &Piece {
        self.pieces
            .iter()
            .min_by_key(|p| p.cell_count())
            .unwrap_or(&self.pieces[0])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_standard_catalog_has_26_distinct_shapes() {
        let catalog = PieceCatalog::standard();
        assert_eq!(catalog.len(), 26);

        let shapes: HashSet<_> = catalog
            .iter()
            .map(|p| p.offsets().collect::<Vec<_>>())
            .collect();
        assert_eq!(shapes.len(), 26, "every standard shape must be distinct");
    }

    #[test]
    fn test_standard_catalog_ids_and_names() {
        let catalog = PieceCatalog::standard();
        for (i, piece) in catalog.iter().enumerate() {
            assert_eq!(piece.id().index(), i);
            assert_eq!(piece.id().to_string(), format!("P{i}"));
        }
    }

    #[test]
    fn test_standard_shapes_are_normalized() {
        for piece in PieceCatalog::standard().iter() {
            assert_eq!(piece.offsets().map(Position::row).min(), Some(0));
            assert_eq!(piece.offsets().map(Position::col).min(), Some(0));
            assert_eq!(piece.offsets().count(), piece.cell_count());
            assert_eq!(
                piece.offsets().map(Position::row).max(),
                Some(piece.height() - 1)
            );
            assert_eq!(
                piece.offsets().map(Position::col).max(),
                Some(piece.width() - 1)
            );
        }
    }

    #[test]
    fn test_bars_orientation() {
        let catalog = PieceCatalog::standard();
        let horizontal = catalog.get(PieceId::new(3)).unwrap();
        assert_eq!((horizontal.height(), horizontal.width()), (1, 4));
        let vertical = catalog.get(PieceId::new(6)).unwrap();
        assert_eq!((vertical.height(), vertical.width()), (4, 1));
        let square = catalog.get(PieceId::new(8)).unwrap();
        assert_eq!(square.cell_count(), 9);
    }

    #[test]
    fn test_smallest_is_single_cell() {
        let catalog = PieceCatalog::standard();
        assert_eq!(catalog.smallest().id(), PieceId::new(0));
        assert_eq!(catalog.smallest().cell_count(), 1);
    }

    #[test]
    fn test_from_shapes_normalizes_offsets() {
        let catalog = PieceCatalog::from_shapes(&[[(2_u8, 3_u8), (3, 3), (3, 4)]]).unwrap();
        let piece = catalog.get(PieceId::new(0)).unwrap();
        let offsets: Vec<_> = piece.offsets().collect();
        assert_eq!(
            offsets,
            [Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)]
        );
        assert_eq!(piece.row_masks(), &[0b01, 0b11]);
    }

    #[test]
    fn test_from_shapes_rejects_bad_shapes() {
        let empty: [&[(u8, u8)]; 1] = [&[]];
        let err = PieceCatalog::from_shapes(&empty).unwrap_err();
        assert_eq!(err.field(), "pieces.P0");

        let duplicate: [&[(u8, u8)]; 2] = [&[(0, 0)], &[(0, 0), (0, 0)]];
        let err = PieceCatalog::from_shapes(&duplicate).unwrap_err();
        assert_eq!(err.field(), "pieces.P1");

        let too_wide: [&[(u8, u8)]; 1] = [&[(0, 0), (0, 5)]];
        assert!(PieceCatalog::from_shapes(&too_wide).is_err());

        let none: [&[(u8, u8)]; 0] = [];
        assert!(PieceCatalog::from_shapes(&none).is_err());
    }

    #[test]
    fn test_cells_at_translates_offsets() {
        let catalog = PieceCatalog::standard();
        let t = catalog.get(PieceId::new(13)).unwrap();
        let cells: Vec<_> = t.cells_at(Position::new(4, 2)).collect();
        assert_eq!(
            cells,
            [
                Position::new(4, 2),
                Position::new(4, 3),
                Position::new(4, 4),
                Position::new(5, 3),
            ]
        );
    }

    #[test]
    fn test_position_serialization() {
        let pos = Position::new(3, 5);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, r#"{"row":3,"col":5}"#);
        assert_eq!(pos.to_string(), "(3, 5)");
    }
}
