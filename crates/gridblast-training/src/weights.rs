//! Weight vector operations for the genetic algorithm.
//!
//! These are the genetic operators applied by
//! [`PopulationEvolver`](crate::genetic::PopulationEvolver):
//!
//! - **Initialization**: [`random`] draws each coefficient from its feature's
//!   initialization range
//! - **Crossover**: [`uniform_crossover`] picks each coefficient from either
//!   parent; [`blx_alpha`] samples around the parents' interval
//! - **Mutation**: [`mutate`] applies Gaussian noise
//!
//! All operators work coordinate-wise, so the length and feature order of a
//! [`WeightVector`] are preserved. A feature's initialization range only sets
//! the scale of the noise applied to it; offspring coefficients are kept
//! within `±`[`MAX_ABS_WEIGHT`] so repeated blending or mutation cannot drift
//! to infinity.

use gridblast_evaluator::{board_feature::BoardFeature, weights::WeightVector};
use rand::Rng;
use rand_distr::{Distribution as _, Normal};

/// Largest magnitude a coefficient produced by crossover or mutation can have.
pub const MAX_ABS_WEIGHT: f32 = 1.0e6;

fn bounded(value: f64) -> f32 {
    let limit = f64::from(MAX_ABS_WEIGHT);
    #[expect(clippy::cast_possible_truncation)]
    let value = value.clamp(-limit, limit) as f32;
    value
}

/// Width of a feature's initialization range.
#[must_use]
pub fn init_span(feature: BoardFeature) -> f32 {
    let (low, high) = feature.init_range();
    high - low
}

/// Generates a weight vector with each coefficient uniform in its feature's
/// initialization range.
pub fn random<R>(rng: &mut R) -> WeightVector
where
    R: Rng + ?Sized,
{
    WeightVector::from_fn(|f| {
        let (low, high) = f.init_range();
        rng.random_range(low..=high)
    })
}

/// Takes each coefficient from `p1` or `p2` with equal probability.
pub fn uniform_crossover<R>(p1: &WeightVector, p2: &WeightVector, rng: &mut R) -> WeightVector
where
    R: Rng + ?Sized,
{
    WeightVector::from_fn(|f| if rng.random_bool(0.5) { p1[f] } else { p2[f] })
}

/// Performs BLX-α (Blend Crossover) between two parents.
///
/// For parents `x1` and `x2` at each position, with `d = |x2 - x1|`, the child
/// coefficient is sampled uniformly from `[min - α·d, max + α·d]`.
///
/// - `alpha = 0.0`: Offspring strictly between parents
/// - `alpha = 0.5`: Standard BLX-0.5
///
/// The interval is computed in `f64` and clipped to `±`[`MAX_ABS_WEIGHT`].
///
/// # Panics
///
/// Panics if `alpha` is negative or not finite.
pub fn blx_alpha<R>(p1: &WeightVector, p2: &WeightVector, alpha: f32, rng: &mut R) -> WeightVector
where
    R: Rng + ?Sized,
{
    assert!(alpha.is_finite() && alpha >= 0.0, "invalid BLX alpha: {alpha}");
    let alpha = f64::from(alpha);
    WeightVector::from_fn(|f| {
        let min = f64::from(f32::min(p1[f], p2[f]));
        let max = f64::from(f32::max(p1[f], p2[f]));
        let d = max - min;
        rng.random_range(bounded(min - alpha * d)..=bounded(max + alpha * d))
    })
}

/// Applies Gaussian mutation in place.
///
/// Each coefficient is perturbed with probability `rate` by noise drawn from
/// `N(0, scale × span)`, where `span` is the width of the feature's
/// initialization range. Every coefficient ends within `±`[`MAX_ABS_WEIGHT`].
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `scale` is negative or not finite.
pub fn mutate<R>(weights: &mut WeightVector, rate: f32, scale: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert!(scale.is_finite() && scale >= 0.0, "invalid mutation scale: {scale}");
    for feature in BoardFeature::ALL {
        let mut value = f64::from(weights[feature]);
        if rng.random_bool(rate.into()) {
            let sigma = f64::from(scale) * f64::from(init_span(feature));
            let normal =
                Normal::new(0.0, sigma).expect("standard deviation is finite and non-negative");
            value += normal.sample(rng);
        }
        weights[feature] = bounded(value);
    }
}
