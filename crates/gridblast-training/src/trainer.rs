//! The generation loop.
//!
//! A [`Trainer`] owns the training parameters, the random stream and the
//! [`BestSlot`]. Each generation it draws fresh game seeds, evaluates the
//! population, offers the generation's best individual to the slot, persists
//! it when it beats everything seen so far, reports a [`GenerationRecord`] and
//! breeds the next population.
//!
//! Cancellation is checked only between generations, so the persisted weights
//! always come from a fully evaluated generation.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use gridblast_engine::PieceSeed;
use gridblast_evaluator::{
    board_feature::BoardFeature,
    weight_store::{WeightFile, WeightStore, WeightStoreError},
    weights::WeightVector,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    config::TrainingParams,
    fitness::{FitnessEvaluator, SENTINEL_FITNESS},
    genetic::{Individual, Population, PopulationEvolver},
    stats::DescriptiveStats,
};

/// The best individual seen during a run, owned by the generation loop.
#[derive(Debug, Clone, Default)]
pub struct BestSlot {
    best: Option<(usize, Individual)>,
}

impl BestSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `candidate` if it is strictly better than the current best.
    ///
    /// Individuals with sentinel fitness are never recorded. Returns whether the
    /// slot changed.
    pub fn offer(&mut self, generation: usize, candidate: &Individual) -> bool {
        if candidate.fitness() <= SENTINEL_FITNESS {
            return false;
        }
        let improved = self
            .best
            .as_ref()
            .is_none_or(|(_, best)| candidate.fitness() > best.fitness());
        if improved {
            self.best = Some((generation, candidate.clone()));
        }
        improved
    }

    #[must_use]
    pub fn individual(&self) -> Option<&Individual> {
        self.best.as_ref().map(|(_, ind)| ind)
    }

    /// Generation in which the current best was found.
    #[must_use]
    pub fn generation(&self) -> Option<usize> {
        self.best.as_ref().map(|(generation, _)| *generation)
    }

    #[must_use]
    pub fn fitness(&self) -> Option<f32> {
        self.individual().map(Individual::fitness)
    }
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub generation: usize,
    pub fitness: DescriptiveStats,
    /// Best fitness over this and all previous generations.
    pub best_ever_fitness: Option<f32>,
    /// Whether this generation produced a new best.
    pub improved: bool,
    pub weight_stats: Vec<(BoardFeature, DescriptiveStats)>,
    /// The evaluated population, best first.
    pub population: Population,
}

impl GenerationRecord {
    #[must_use]
    pub fn best(&self) -> &Individual {
        self.population.best()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StopReason {
    Completed,
    FitnessTarget,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best: BestSlot,
    pub generations_completed: usize,
    pub stop: StopReason,
    pub population: Population,
}

/// Weight file the best individual is written to.
#[derive(Debug, Clone)]
struct Output {
    store: WeightStore,
    name: String,
}

#[derive(Debug)]
pub struct Trainer {
    params: TrainingParams,
    rng: Pcg32,
    output: Option<Output>,
}

impl Trainer {
    /// Creates a trainer; without a configured seed the stream is seeded from
    /// the operating system.
    #[must_use]
    pub fn new(params: TrainingParams) -> Self {
        let seed = params.seed().unwrap_or_else(|| rand::rng().random());
        tracing::debug!(seed, "trainer random stream");
        Self {
            params,
            rng: Pcg32::seed_from_u64(seed),
            output: None,
        }
    }

    /// Persists every new best individual to `store` under `name`.
    #[must_use]
    pub fn persist_to(mut self, store: WeightStore, name: impl Into<String>) -> Self {
        self.output = Some(Output {
            store,
            name: name.into(),
        });
        self
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[must_use]
    pub fn random_population(&mut self) -> Population {
        Population::random(self.params.population_size(), &mut self.rng)
    }

    /// Population seeded from a previously trained vector.
    #[must_use]
    pub fn seeded_population(&mut self, weights: &WeightVector) -> Population {
        Population::seeded(
            weights,
            self.params.population_size(),
            self.params.mutation_scale(),
            &mut self.rng,
        )
    }

    /// Population seeded from the weight file in `store`.
    ///
    /// An unreadable or invalid file is logged and a random population is
    /// returned instead.
    #[must_use]
    pub fn resumed_population(&mut self, store: &WeightStore) -> Population {
        match store.load() {
            Ok(file) => {
                tracing::info!(
                    path = %store.path().display(),
                    name = %file.name,
                    "resuming from stored weights"
                );
                self.seeded_population(&file.weights)
            }
            Err(err) => {
                tracing::warn!(%err, "cannot resume, starting from a random population");
                self.random_population()
            }
        }
    }

    fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: self.params.elite_count(),
            tournament_size: self.params.tournament_size(),
            crossover: self.params.crossover(),
            mutation_rate: self.params.mutation_rate(),
            mutation_scale: self.params.mutation_scale(),
        }
    }

    fn generation_evaluator(&mut self) -> FitnessEvaluator {
        let seeds = (0..self.params.games_per_individual())
            .map(|_| self.rng.random::<PieceSeed>())
            .collect();
        FitnessEvaluator::new(self.params.rules().clone(), seeds, self.params.turn_limit())
    }

    /// Runs the generation loop starting from `population`.
    ///
    /// `on_generation` is called once per evaluated generation. The loop ends
    /// after the configured number of generations, when the fitness target is
    /// reached, or at the first generation boundary after `cancel` is set.
    pub fn run<F>(
        &mut self,
        mut population: Population,
        cancel: &AtomicBool,
        mut on_generation: F,
    ) -> Result<TrainingOutcome, WeightStoreError>
    where
        F: FnMut(&GenerationRecord),
    {
        let evolver = self.evolver();
        let mut best = BestSlot::new();
        let mut generations_completed = 0;
        let mut stop = StopReason::Completed;

        for generation in 0..self.params.generations() {
            if cancel.load(Ordering::Relaxed) {
                stop = StopReason::Cancelled;
                break;
            }

            let evaluator = self.generation_evaluator();
            population.evaluate_fitness(&evaluator);
            generations_completed += 1;

            for (i, ind) in population.individuals().iter().enumerate() {
                tracing::debug!(generation, rank = i, fitness = ind.fitness(), "evaluated");
            }

            let improved = best.offer(generation, population.best());
            if improved {
                self.persist(generation, population.best())?;
            }

            let Some(fitness) = population.compute_fitness_stats() else {
                break;
            };
            let record = GenerationRecord {
                generation,
                fitness,
                best_ever_fitness: best.fitness(),
                improved,
                weight_stats: population.compute_weight_stats(),
                population: population.clone(),
            };
            tracing::info!(
                generation,
                best = fitness.max,
                mean = fitness.mean,
                worst = fitness.min,
                best_ever = record.best_ever_fitness,
                "generation complete"
            );
            on_generation(&record);

            if let Some(target) = self.params.fitness_target()
                && fitness.max >= target
            {
                tracing::info!(generation, target, "fitness target reached");
                stop = StopReason::FitnessTarget;
                break;
            }

            if generation + 1 < self.params.generations() {
                population = evolver.evolve(&population, &mut self.rng);
            }
        }

        Ok(TrainingOutcome {
            best,
            generations_completed,
            stop,
            population,
        })
    }

    fn persist(&self, generation: usize, best: &Individual) -> Result<(), WeightStoreError> {
        let Some(output) = &self.output else {
            return Ok(());
        };
        let file = WeightFile {
            name: output.name.clone(),
            trained_at: Some(Utc::now()),
            fitness: Some(best.fitness()),
            generation: Some(generation),
            weights: *best.weights(),
        };
        output.store.save(&file)?;
        tracing::info!(
            generation,
            fitness = best.fitness(),
            path = %output.store.path().display(),
            "saved new best weights"
        );
        Ok(())
    }
}
