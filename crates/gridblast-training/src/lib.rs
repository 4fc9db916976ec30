//! Training system for evolving heuristic weights with a genetic algorithm.
//!
//! The weights of a [`HeuristicAgent`](gridblast_evaluator::heuristic_agent::HeuristicAgent)
//! are optimized by letting a population of weight vectors play games and
//! breeding the best players.
//!
//! # How Training Works
//!
//! 1. **Population** - Random weight vectors, or mutated copies of a stored vector
//! 2. **Evaluation** - Each individual plays the generation's games ([`fitness`])
//! 3. **Fitness** - The average final score over those games
//! 4. **Selection** - Elites survive, tournaments pick parents ([`genetic`])
//! 5. **Reproduction** - Crossover and Gaussian mutation ([`weights`])
//! 6. **Repeat** - Until the generation budget or fitness target is reached ([`trainer`])
//!
//! # Architecture
//!
//! ```text
//! Trainer (generation loop, best slot, persistence)
//!     ↓ evolves
//! Population of WeightVectors
//!     ↓ used by
//! HeuristicAgent (gridblast-evaluator)
//!     ↓ plays
//! GameSession (gridblast-engine)
//!     ↓ produces
//! Fitness
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//!
//! use gridblast_training::{config::TrainingConfig, trainer::Trainer};
//!
//! let config = TrainingConfig {
//!     population_size: 4,
//!     generations: 2,
//!     games_per_individual: 1,
//!     turn_limit: 20,
//!     seed: Some(1),
//!     ..TrainingConfig::default()
//! };
//! let mut trainer = Trainer::new(config.validate().unwrap());
//! let population = trainer.random_population();
//!
//! let outcome = trainer
//!     .run(population, &AtomicBool::new(false), |record| {
//!         println!("generation {}: best {}", record.generation, record.fitness.max);
//!     })
//!     .unwrap();
//! assert_eq!(outcome.generations_completed, 2);
//! ```

pub mod config;
pub mod fitness;
pub mod genetic;
pub mod stats;
pub mod trainer;
pub mod weights;
