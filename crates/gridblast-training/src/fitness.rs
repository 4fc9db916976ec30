//! Fitness evaluation by simulated games.
//!
//! An individual's fitness is the final score of each game it plays,
//! averaged over the games. Every individual of a generation plays the same
//! piece sequences (one [`PieceSeed`] per game), so fitness differences come
//! from the weights and not from luck of the draw.

use gridblast_engine::{GameRules, GameSession, PieceSeed, TurnError};
use gridblast_evaluator::{heuristic_agent::HeuristicAgent, weights::WeightVector};

/// Fitness assigned to an individual whose evaluation failed.
///
/// Lower than any achievable fitness, so such individuals rank last.
pub const SENTINEL_FITNESS: f32 = f32::MIN;

/// Why a weight vector could not be evaluated.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvaluationFailure {
    #[display("no legal first move in game {game}")]
    #[from(ignore)]
    NoFirstMove { game: usize },
    #[display("turn rejected during evaluation")]
    Turn(TurnError),
}

/// Plays the games that define fitness for one generation.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    rules: GameRules,
    seeds: Vec<PieceSeed>,
    turn_limit: usize,
}

impl FitnessEvaluator {
    /// # Panics
    ///
    /// Panics if `seeds` is empty.
    #[must_use]
    pub fn new(rules: GameRules, seeds: Vec<PieceSeed>, turn_limit: usize) -> Self {
        assert!(!seeds.is_empty(), "at least one game is required");
        Self {
            rules,
            seeds,
            turn_limit,
        }
    }

    /// Average final score of `weights` over all games.
    pub fn evaluate(&self, weights: &WeightVector) -> Result<f32, EvaluationFailure> {
        let agent = HeuristicAgent::from_weights(*weights);
        let mut total = 0_u64;
        for (game, seed) in self.seeds.iter().enumerate() {
            let mut session = GameSession::new(&self.rules, *seed);
            if session.is_game_over() {
                return Err(EvaluationFailure::NoFirstMove { game });
            }
            let played = agent.play_session(&mut session, self.turn_limit, |_, _, _| {})?;
            total += played.score();
        }
        #[expect(clippy::cast_precision_loss)]
        let fitness = (total as f64 / self.seeds.len() as f64) as f32;
        Ok(fitness)
    }

    /// Like [`Self::evaluate`], but a failure yields [`SENTINEL_FITNESS`].
    pub fn fitness_or_sentinel(&self, weights: &WeightVector) -> f32 {
        self.evaluate(weights).unwrap_or_else(|err| {
            tracing::warn!(%err, "evaluation failed, using sentinel fitness");
            SENTINEL_FITNESS
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gridblast_engine::{DealPolicy, GameConfig, PieceCatalog};

    use super::*;

    #[test]
    fn test_fitness_is_deterministic() {
        let seeds = vec![PieceSeed::from_u64(1), PieceSeed::from_u64(2)];
        let evaluator = FitnessEvaluator::new(GameRules::default(), seeds, 40);
        let weights = WeightVector::default();

        let a = evaluator.evaluate(&weights).unwrap();
        let b = evaluator.evaluate(&weights).unwrap();
        assert!(a > 0.0);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_fitness_is_mean_score() {
        let rules = GameRules::default();
        let seeds = vec![PieceSeed::from_u64(7), PieceSeed::from_u64(8)];
        let agent = HeuristicAgent::from_weights(WeightVector::default());
        let total: u64 = seeds
            .iter()
            .map(|seed| {
                let mut session = GameSession::new(&rules, *seed);
                agent
                    .play_session(&mut session, 25, |_, _, _| {})
                    .unwrap()
                    .score()
            })
            .sum();

        let evaluator = FitnessEvaluator::new(rules, seeds, 25);
        #[expect(clippy::cast_precision_loss)]
        let expected = total as f32 / 2.0;
        assert!((evaluator.evaluate(&WeightVector::default()).unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_no_first_move_gives_sentinel() {
        // the 3-cell bar never fits on a 2x2 board
        let catalog = PieceCatalog::from_shapes(&[vec![(0_u8, 0_u8)], vec![(0, 0), (0, 1), (0, 2)]])
            .unwrap();
        let config = GameConfig {
            width: 2,
            height: 2,
            hand_slots: 1,
            deal_policy: DealPolicy::Uniform,
            ..GameConfig::default()
        };
        let rules = config
            .validate()
            .unwrap()
            .with_catalog(Arc::new(catalog))
            .unwrap();
        let blocked_seed = (0..64)
            .map(PieceSeed::from_u64)
            .find(|seed| GameSession::new(&rules, *seed).is_game_over())
            .unwrap();

        let evaluator = FitnessEvaluator::new(rules, vec![blocked_seed], 10);
        let weights = WeightVector::default();
        assert!(matches!(
            evaluator.evaluate(&weights),
            Err(EvaluationFailure::NoFirstMove { game: 0 })
        ));
        assert_eq!(evaluator.fitness_or_sentinel(&weights), SENTINEL_FITNESS);
    }
}
