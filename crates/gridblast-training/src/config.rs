//! Training parameters.
//!
//! [`TrainingConfig`] is what a user writes in a JSON file or passes on the
//! command line; [`TrainingConfig::validate`] checks every value once and
//! produces the [`TrainingParams`] the trainer runs with. Invalid values are
//! reported with the dotted path of the field, never clamped.
//!
//! ```
//! use gridblast_training::config::TrainingConfig;
//!
//! let config: TrainingConfig = serde_json::from_str(
//!     r#"{ "population_size": 20, "crossover": { "kind": "blend", "blx_alpha": 0.3 } }"#,
//! )
//! .unwrap();
//! let params = config.validate().unwrap();
//! assert_eq!(params.population_size(), 20);
//! assert_eq!(params.elite_count(), 4);
//! ```

use gridblast_engine::{ConfigError, GameConfig, GameRules};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Crossover {
    /// Each coefficient is taken from one of the parents.
    #[default]
    Uniform,
    /// BLX-α blend around the parents' coefficients.
    Blend { blx_alpha: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elite_fraction: f32,
    pub tournament_size: usize,
    pub mutation_rate: f32,
    pub mutation_scale: f32,
    pub crossover: Crossover,
    pub games_per_individual: usize,
    pub turn_limit: usize,
    pub fitness_target: Option<f32>,
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 30,
            elite_fraction: 0.2,
            tournament_size: 2,
            mutation_rate: 0.2,
            mutation_scale: 0.25,
            crossover: Crossover::default(),
            games_per_individual: 3,
            turn_limit: 1000,
            fitness_target: None,
            seed: None,
            game: GameConfig::default(),
        }
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::new(field, reason)
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<TrainingParams, ConfigError> {
        let rules = self.game.validate().map_err(|e| e.within("game"))?;

        let population_size = self.population_size;
        if population_size < 2 {
            return Err(invalid(
                "population_size",
                format!("must be at least 2, got {population_size}"),
            ));
        }
        if self.generations < 1 {
            return Err(invalid("generations", "must be at least 1".to_owned()));
        }

        let elite_fraction = self.elite_fraction;
        if !(0.0..1.0).contains(&elite_fraction) {
            return Err(invalid(
                "elite_fraction",
                format!("must be in [0, 1), got {elite_fraction}"),
            ));
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let elite_count = (population_size as f32 * elite_fraction).round() as usize;
        if elite_count >= population_size {
            return Err(invalid(
                "elite_fraction",
                format!("keeps all {population_size} individuals, leaving no room for offspring"),
            ));
        }

        let tournament_size = self.tournament_size;
        if !(1..=population_size).contains(&tournament_size) {
            return Err(invalid(
                "tournament_size",
                format!("must be between 1 and {population_size}, got {tournament_size}"),
            ));
        }

        let mutation_rate = self.mutation_rate;
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(invalid(
                "mutation_rate",
                format!("must be in [0, 1], got {mutation_rate}"),
            ));
        }
        let mutation_scale = self.mutation_scale;
        if !(mutation_scale.is_finite() && mutation_scale >= 0.0) {
            return Err(invalid(
                "mutation_scale",
                format!("must be a finite non-negative number, got {mutation_scale}"),
            ));
        }
        if let Crossover::Blend { blx_alpha } = self.crossover
            && !(0.0..=1.0).contains(&blx_alpha)
        {
            return Err(invalid(
                "crossover.blx_alpha",
                format!("must be in [0, 1], got {blx_alpha}"),
            ));
        }

        if self.games_per_individual < 1 {
            return Err(invalid("games_per_individual", "must be at least 1".to_owned()));
        }
        if self.turn_limit < 1 {
            return Err(invalid("turn_limit", "must be at least 1".to_owned()));
        }
        if let Some(target) = self.fitness_target.filter(|t| !t.is_finite()) {
            return Err(invalid(
                "fitness_target",
                format!("must be finite, got {target}"),
            ));
        }

        Ok(TrainingParams {
            population_size,
            generations: self.generations,
            elite_count,
            tournament_size,
            mutation_rate,
            mutation_scale,
            crossover: self.crossover,
            games_per_individual: self.games_per_individual,
            turn_limit: self.turn_limit,
            fitness_target: self.fitness_target,
            seed: self.seed,
            rules,
        })
    }
}

/// Validated training parameters.
#[derive(Debug, Clone)]
pub struct TrainingParams {
    population_size: usize,
    generations: usize,
    elite_count: usize,
    tournament_size: usize,
    mutation_rate: f32,
    mutation_scale: f32,
    crossover: Crossover,
    games_per_individual: usize,
    turn_limit: usize,
    fitness_target: Option<f32>,
    seed: Option<u64>,
    rules: GameRules,
}

impl TrainingParams {
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    #[must_use]
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Individuals carried unchanged into the next generation.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    #[must_use]
    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    #[must_use]
    pub fn mutation_rate(&self) -> f32 {
        self.mutation_rate
    }

    #[must_use]
    pub fn mutation_scale(&self) -> f32 {
        self.mutation_scale
    }

    #[must_use]
    pub fn crossover(&self) -> Crossover {
        self.crossover
    }

    #[must_use]
    pub fn games_per_individual(&self) -> usize {
        self.games_per_individual
    }

    #[must_use]
    pub fn turn_limit(&self) -> usize {
        self.turn_limit
    }

    #[must_use]
    pub fn fitness_target(&self) -> Option<f32> {
        self.fitness_target
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }
}
