//! Placement evaluation: scoring individual piece placements.
//!
//! A placement is scored from the board it leaves behind. The
//! [`FeatureBasedPlacementEvaluator`] computes every [`BoardFeature`] for the
//! placement and takes the weighted sum:
//!
//! ```text
//! score = w₁·f₁ + w₂·f₂ + ... + w₁₄·f₁₄
//! ```
//!
//! Feature values are raw (counts, heights, points), so a coefficient carries
//! both the direction and the scale of its feature's contribution.
//!
//! # Usage
//!
//! ```
//! use gridblast_engine::{GameRules, GameSession, PieceSeed};
//! use gridblast_evaluator::{
//!     placement_analysis::PlacementAnalysis,
//!     placement_evaluator::{FeatureBasedPlacementEvaluator, PlacementEvaluator},
//!     weights::WeightVector,
//! };
//!
//! let session = GameSession::new(&GameRules::default(), PieceSeed::from_u64(1));
//! let evaluator = FeatureBasedPlacementEvaluator::new(WeightVector::default());
//!
//! let placement = session.legal_placements().next().unwrap();
//! let analysis = PlacementAnalysis::from_session(&session, placement).unwrap();
//! let score = evaluator.evaluate_placement(&analysis);
//! assert!(score.is_finite());
//! ```

use std::fmt;

use crate::{
    board_feature::BoardFeature, placement_analysis::PlacementAnalysis, weights::WeightVector,
};

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a placement and returns a score (higher is better).
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;
}

/// Linear evaluator over the full feature vocabulary.
#[derive(Debug, Clone)]
pub struct FeatureBasedPlacementEvaluator {
    weights: WeightVector,
}

impl FeatureBasedPlacementEvaluator {
    #[must_use]
    pub fn new(weights: WeightVector) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }
}

impl PlacementEvaluator for FeatureBasedPlacementEvaluator {
    #[inline]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        self.weights.dot(&BoardFeature::compute_all(analysis))
    }
}
