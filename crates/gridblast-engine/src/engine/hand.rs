use arrayvec::ArrayVec;

use crate::core::piece::Piece;

/// Most slots a hand may have.
pub const MAX_HAND_SLOTS: usize = 8;

/// Ordered slots of pieces available to place.
///
/// A slot becomes empty once its piece is placed; the session refills every
/// slot at once when the whole hand is used up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    slots: ArrayVec<Option<Piece>, MAX_HAND_SLOTS>,
}

impl Hand {
    pub(crate) fn new(pieces: impl IntoIterator<Item = Piece>) -> Self {
        Self {
            slots: pieces.into_iter().map(Some).collect(),
        }
    }

    /// Number of slots, filled or not.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The piece in `slot`, or `None` if the slot is empty or out of range.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Piece> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn take(&mut self, slot: usize) -> Option<Piece> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Checks if every slot has been used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates over all slots in order, including empty ones.
    pub fn slots(&self) -> impl Iterator<Item = Option<&Piece>> + '_ {
        self.slots.iter().map(Option::as_ref)
    }

    /// Iterates over the remaining pieces with their slot index.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, &Piece)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|piece| (i, piece)))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::{PieceCatalog, PieceId};

    use super::*;

    fn hand_of(ids: &[u8]) -> Hand {
        let catalog = PieceCatalog::standard();
        Hand::new(ids.iter().map(|&i| *catalog.get(PieceId::new(i)).unwrap()))
    }

    #[test]
    fn test_take_empties_slot() {
        let mut hand = hand_of(&[0, 7, 3]);
        assert_eq!(hand.slot_count(), 3);
        assert_eq!(hand.take(1).map(|p| p.id()), Some(PieceId::new(7)));
        assert!(hand.get(1).is_none());
        assert!(hand.take(1).is_none());
        assert!(hand.take(5).is_none());

        let remaining: Vec<_> = hand.pieces().map(|(i, p)| (i, p.id().index())).collect();
        assert_eq!(remaining, [(0, 0), (2, 3)]);
        assert!(!hand.is_empty());
    }

    #[test]
    fn test_empty_after_all_taken() {
        let mut hand = hand_of(&[0, 1]);
        hand.take(0);
        hand.take(1);
        assert!(hand.is_empty());
        assert_eq!(hand.slots().filter(Option::is_none).count(), 2);
    }
}
