use std::{fmt::Write as _, sync::Arc};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{
    board::Board,
    piece::{Piece, PieceCatalog, Position},
};

use super::hand::Hand;

/// Seed for deterministic piece dealing.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator of a [`PieceDealer`]. Using the same seed with the same rules and
/// the same placements reproduces the same hands, enabling:
///
/// - Reproducible games for debugging
/// - Comparing weight vectors on identical deals during training
/// - Deterministic testing
///
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use gridblast_engine::{GameConfig, GameSession, PieceSeed};
/// use rand::Rng as _;
///
/// let rules = GameConfig::default().validate().unwrap();
/// let seed: PieceSeed = rand::rng().random();
///
/// let session1 = GameSession::new(&rules, seed);
/// let session2 = GameSession::new(&rules, seed);
/// assert_eq!(session1.hand(), session2.hand());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    /// Expands a 64-bit number into a full seed.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Pcg32::seed_from_u64(value).random()
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// How a new hand is drawn from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealPolicy {
    /// Every slot is an independent uniform draw.
    Uniform,
    /// Slots are drawn so that the hand is usually playable in full.
    ///
    /// Each slot takes the first piece of a freshly shuffled catalog that fits
    /// on a scratch board already holding the previously dealt pieces of the
    /// hand (each applied at its first legal origin, lines cleared). When no
    /// piece fits the smallest piece is tried, and failing that a uniform draw
    /// is used.
    #[default]
    EnsurePlayable,
}

/// Seeded source of hands.
#[derive(Debug, Clone)]
pub struct PieceDealer {
    rng: Pcg32,
    policy: DealPolicy,
    catalog: Arc<PieceCatalog>,
}

impl PieceDealer {
    #[must_use]
    pub fn new(catalog: Arc<PieceCatalog>, policy: DealPolicy, seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            policy,
            catalog,
        }
    }

    /// Deals a full hand of `slots` pieces for the current `board`.
    pub fn deal(&mut self, board: &Board, slots: usize) -> Hand {
        match self.policy {
            DealPolicy::Uniform => {
                let pieces: Vec<_> = (0..slots).map(|_| self.draw_uniform()).collect();
                Hand::new(pieces)
            }
            DealPolicy::EnsurePlayable => self.deal_playable(board, slots),
        }
    }

    fn draw_uniform(&mut self) -> Piece {
        let pieces = self.catalog.as_slice();
        pieces[self.rng.random_range(0..pieces.len())]
    }

    fn deal_playable(&mut self, board: &Board, slots: usize) -> Hand {
        let catalog = Arc::clone(&self.catalog);
        let pieces = catalog.as_slice();
        let mut remaining: Vec<usize> = (0..pieces.len()).collect();
        let mut scratch = board.clone();
        let mut hand = Vec::with_capacity(slots);

        for _ in 0..slots {
            remaining.shuffle(&mut self.rng);
            let fitting = remaining.iter().enumerate().find_map(|(k, &index)| {
                let piece = pieces[index];
                scratch
                    .first_legal_origin(&piece)
                    .map(|origin| (k, piece, origin))
            });

            let piece = if let Some((k, piece, origin)) = fitting {
                remaining.remove(k);
                apply(&mut scratch, &piece, origin);
                piece
            } else {
                let smallest = *catalog.smallest();
                if let Some(origin) = scratch.first_legal_origin(&smallest) {
                    apply(&mut scratch, &smallest, origin);
                    smallest
                } else {
                    self.draw_uniform()
                }
            };
            hand.push(piece);
        }
        Hand::new(hand)
    }
}

fn apply(scratch: &mut Board, piece: &Piece, origin: Position) {
    if let Ok(lines) = scratch.place(piece, origin) {
        scratch.clear_lines(lines);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceId;

    use super::*;

    fn dealer(policy: DealPolicy, seed: u64) -> PieceDealer {
        PieceDealer::new(PieceCatalog::standard(), policy, PieceSeed::from_u64(seed))
    }

    fn ids(hand: &Hand) -> Vec<PieceId> {
        hand.pieces().map(|(_, p)| p.id()).collect()
    }

    #[test]
    fn test_same_seed_same_hands() {
        for policy in [DealPolicy::Uniform, DealPolicy::EnsurePlayable] {
            let board = Board::default();
            let mut d1 = dealer(policy, 42);
            let mut d2 = dealer(policy, 42);
            for _ in 0..20 {
                assert_eq!(ids(&d1.deal(&board, 3)), ids(&d2.deal(&board, 3)));
            }
        }
    }

    #[test]
    fn test_deal_fills_every_slot() {
        let board = Board::default();
        let mut d = dealer(DealPolicy::Uniform, 1);
        let hand = d.deal(&board, 5);
        assert_eq!(hand.slot_count(), 5);
        assert_eq!(hand.pieces().count(), 5);
    }

    #[test]
    fn test_ensure_playable_on_empty_board_has_distinct_pieces() {
        let board = Board::default();
        let mut d = dealer(DealPolicy::EnsurePlayable, 7);
        for _ in 0..10 {
            let mut hand = ids(&d.deal(&board, 3));
            hand.sort();
            hand.dedup();
            assert_eq!(hand.len(), 3);
        }
    }

    #[test]
    fn test_ensure_playable_picks_the_only_fitting_piece() {
        let board = Board::from_ascii(
            "
            ########
            ########
            ########
            ########
            ####.###
            ########
            ########
            ########
            ",
        );
        let mut d = dealer(DealPolicy::EnsurePlayable, 3);
        let hand = d.deal(&board, 3);
        assert_eq!(hand.get(0).map(Piece::id), Some(PieceId::new(0)));
        assert!(board.has_any_legal_move(hand.pieces().map(|(_, p)| p)));
    }

    #[test]
    fn test_ensure_playable_falls_back_on_full_board() {
        let board = Board::from_ascii(
            "
            ####
            ####
            ####
            ####
            ",
        );
        let mut d = dealer(DealPolicy::EnsurePlayable, 3);
        let hand = d.deal(&board, 3);
        assert_eq!(hand.pieces().count(), 3);
    }

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = PieceSeed([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: PieceSeed = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.0[0], 0x01);
            assert_eq!(deserialized.0[15], 0x10);
        }

        #[test]
        fn test_error_invalid_hex() {
            for json in [
                "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
                "\"0123456789abcdef0123456789abcde\"",
                "\"0123456789abcdef0123456789abcdef0\"",
                "\"\"",
            ] {
                let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex"), "{json}");
            }
        }

        #[test]
        fn test_from_u64_is_stable() {
            assert_eq!(PieceSeed::from_u64(9), PieceSeed::from_u64(9));
            assert_ne!(PieceSeed::from_u64(9), PieceSeed::from_u64(10));
        }
    }
}
