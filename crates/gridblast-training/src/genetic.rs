//! Genetic algorithm over weight vectors.
//!
//! This module evolves populations of [`WeightVector`]s to maximize fitness. Each
//! generation follows the same cycle:
//!
//! 1. **Evaluate Fitness** - Every individual plays the generation's games in parallel
//! 2. **Rank** - Individuals are sorted by fitness, best first
//! 3. **Elite Selection** - The top individuals are carried over unchanged
//! 4. **Tournament Selection** - Parents for the remaining slots are picked by tournament
//! 5. **Crossover** - Uniform or BLX-α, coordinate-wise
//! 6. **Mutation** - Gaussian noise scaled by each feature's initialization range
//!
//! # Key Components
//!
//! - [`Individual`] - A weight vector and its most recent fitness
//! - [`Population`] - Individuals evaluated together
//! - [`PopulationEvolver`] - Selection, crossover and mutation parameters
//!
//! # Parallelization
//!
//! Fitness evaluations are independent: each individual is evaluated on its own
//! scoped thread and the generation waits for all of them before ranking.
//!
//! # Example
//!
//! ```
//! use gridblast_engine::{GameRules, PieceSeed};
//! use gridblast_training::{
//!     config::Crossover,
//!     fitness::FitnessEvaluator,
//!     genetic::{Population, PopulationEvolver},
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut population = Population::random(6, &mut rng);
//! let evaluator = FitnessEvaluator::new(GameRules::default(), vec![PieceSeed::from_u64(1)], 20);
//! population.evaluate_fitness(&evaluator);
//!
//! let evolver = PopulationEvolver {
//!     elite_count: 1,
//!     tournament_size: 2,
//!     crossover: Crossover::Uniform,
//!     mutation_rate: 0.2,
//!     mutation_scale: 0.25,
//! };
//! let next = evolver.evolve(&population, &mut rng);
//! assert_eq!(next.individuals().len(), 6);
//! assert_eq!(next.individuals()[0].weights(), population.best().weights());
//! ```

use std::thread;

use gridblast_evaluator::{board_feature::BoardFeature, weights::WeightVector};
use rand::{Rng, seq::IndexedRandom};

use crate::{
    config::Crossover,
    fitness::{FitnessEvaluator, SENTINEL_FITNESS},
    stats::DescriptiveStats,
    weights,
};

#[derive(Debug, Clone)]
pub struct Individual {
    weights: WeightVector,
    fitness: f32,
}

impl Individual {
    /// An individual that has not been evaluated yet.
    #[must_use]
    pub fn new(weights: WeightVector) -> Self {
        Self {
            weights,
            fitness: SENTINEL_FITNESS,
        }
    }

    #[must_use]
    pub fn with_fitness(weights: WeightVector, fitness: f32) -> Self {
        Self { weights, fitness }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Fitness from the most recent evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` individuals with weights drawn from the initialization ranges.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    #[must_use]
    pub fn random<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(count > 0);
        let individuals = (0..count)
            .map(|_| Individual::new(weights::random(rng)))
            .collect();
        Self { individuals }
    }

    /// Creates `count` individuals around `seed`.
    ///
    /// The first individual carries `seed` unchanged, the others are copies with
    /// every coefficient mutated by `mutation_scale`.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    #[must_use]
    pub fn seeded<R>(seed: &WeightVector, count: usize, mutation_scale: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(count > 0);
        let individuals = (0..count)
            .map(|i| {
                let mut weights = *seed;
                if i > 0 {
                    weights::mutate(&mut weights, 1.0, mutation_scale, rng);
                }
                Individual::new(weights)
            })
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// The best individual of the last evaluation.
    #[must_use]
    pub fn best(&self) -> &Individual {
        &self.individuals[0]
    }

    /// Evaluates every individual in parallel, then sorts by fitness (best first).
    ///
    /// Ties keep their previous relative order.
    pub fn evaluate_fitness(&mut self, evaluator: &FitnessEvaluator) {
        thread::scope(|s| {
            for ind in &mut self.individuals {
                s.spawn(move || {
                    ind.fitness = evaluator.fitness_or_sentinel(&ind.weights);
                });
            }
        });

        // sort by fitness descending
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    /// Spread of each coefficient across the population, in feature order.
    #[must_use]
    pub fn compute_weight_stats(&self) -> Vec<(BoardFeature, DescriptiveStats)> {
        BoardFeature::ALL
            .into_iter()
            .filter_map(|feature| {
                let values = self.individuals.iter().map(|ind| ind.weights[feature]);
                DescriptiveStats::new(values).map(|stats| (feature, stats))
            })
            .collect()
    }

    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }
}

/// Controls how one generation produces the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    pub crossover: Crossover,
    /// Probability of mutating each coefficient
    pub mutation_rate: f32,
    /// Mutation noise, relative to each feature's initialization range
    pub mutation_scale: f32,
}

impl PopulationEvolver {
    /// Evolves the population to create the next generation.
    ///
    /// `population` must be ranked by [`Population::evaluate_fitness`]. The
    /// result has the same size; its elites keep their last fitness and the
    /// offspring are unevaluated.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let individuals = &population.individuals;
        assert!(individuals.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let mut next_individuals = Vec::with_capacity(individuals.len());

        // elite selection
        let elite_count = self.elite_count.min(individuals.len());
        next_individuals.extend(individuals[..elite_count].iter().cloned());

        // generate the rest individuals
        while next_individuals.len() < individuals.len() {
            let p1 = tournament_select(individuals, self.tournament_size, rng);
            let p2 = tournament_select(individuals, self.tournament_size, rng);

            let mut child = match self.crossover {
                Crossover::Uniform => weights::uniform_crossover(&p1.weights, &p2.weights, rng),
                Crossover::Blend { blx_alpha } => {
                    weights::blx_alpha(&p1.weights, &p2.weights, blx_alpha, rng)
                }
            };
            weights::mutate(&mut child, self.mutation_rate, self.mutation_scale, rng);

            next_individuals.push(Individual::new(child));
        }

        Population {
            individuals: next_individuals,
        }
    }
}

/// Selects an individual using tournament selection.
///
/// Randomly selects `tournament_size` distinct individuals and returns the
/// one with the highest fitness.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0 && !population.is_empty());
    population
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .unwrap_or(&population[0])
}

#[cfg(test)]
mod tests {
    use gridblast_engine::{GameRules, PieceSeed};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn ranked(fitness: &[f32]) -> Population {
        let individuals = fitness
            .iter()
            .map(|&f| Individual {
                weights: WeightVector::new([f; BoardFeature::LEN]),
                fitness: f,
            })
            .collect();
        Population { individuals }
    }

    #[test]
    fn test_seeded_keeps_first_individual() {
        let mut rng = Pcg32::seed_from_u64(0);
        let seed = WeightVector::default();
        let population = Population::seeded(&seed, 5, 0.1, &mut rng);
        assert_eq!(population.individuals().len(), 5);
        assert_eq!(population.individuals()[0].weights(), &seed);
        assert!(population.individuals()[1..].iter().all(|ind| ind.weights() != &seed));
    }

    #[test]
    fn test_evolve_keeps_elites_and_size() {
        let mut rng = Pcg32::seed_from_u64(1);
        let population = ranked(&[9.0, 7.0, 5.0, 3.0, 1.0]);
        let evolver = PopulationEvolver {
            elite_count: 2,
            tournament_size: 2,
            crossover: Crossover::Uniform,
            mutation_rate: 0.0,
            mutation_scale: 0.0,
        };
        let next = evolver.evolve(&population, &mut rng);
        assert_eq!(next.individuals().len(), 5);
        assert_eq!(next.individuals()[0].weights(), population.individuals()[0].weights());
        assert_eq!(next.individuals()[1].weights(), population.individuals()[1].weights());

        // without mutation, uniform crossover only recombines existing genes
        for ind in &next.individuals()[2..] {
            assert!(
                ind.weights()
                    .iter()
                    .all(|(_, w)| [9.0, 7.0, 5.0, 3.0].contains(&w))
            );
        }
    }

    #[test]
    fn test_tournament_of_whole_population_picks_best() {
        let mut rng = Pcg32::seed_from_u64(2);
        let population = ranked(&[4.0, 3.0, 2.0]);
        for _ in 0..10 {
            let winner = tournament_select(population.individuals(), 3, &mut rng);
            assert_eq!(winner.fitness(), 4.0);
        }
    }

    #[test]
    fn test_evaluate_fitness_ranks_population() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut population = Population::random(4, &mut rng);
        let evaluator =
            FitnessEvaluator::new(GameRules::default(), vec![PieceSeed::from_u64(3)], 15);
        population.evaluate_fitness(&evaluator);

        let fitness: Vec<f32> = population.individuals().iter().map(Individual::fitness).collect();
        assert!(fitness.is_sorted_by(|a, b| a >= b));
        assert!(fitness.iter().all(|&f| f > 0.0));

        let stats = population.compute_fitness_stats().unwrap();
        assert_eq!(stats.max, fitness[0]);
        assert_eq!(population.compute_weight_stats().len(), BoardFeature::LEN);
    }
}
