use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context as _;
use gridblast_evaluator::weight_store::WeightStore;
use gridblast_training::{
    config::TrainingConfig,
    trainer::{GenerationRecord, StopReason, Trainer},
};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the number of individuals per generation
    #[arg(long)]
    population_size: Option<usize>,
    /// Override the number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Override the fraction of individuals kept unchanged
    #[arg(long)]
    elite_fraction: Option<f32>,
    /// Override the per-coefficient mutation probability
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Override the mutation noise, relative to each feature's range
    #[arg(long)]
    mutation_scale: Option<f32>,
    /// Override the number of games per fitness evaluation
    #[arg(long)]
    games: Option<usize>,
    /// Override the turn limit of each simulated game
    #[arg(long)]
    turn_limit: Option<usize>,
    /// Stop as soon as a generation's best fitness reaches this value
    #[arg(long)]
    fitness_target: Option<f32>,
    /// Seed of the training random stream
    #[arg(long)]
    seed: Option<u64>,
    /// Weight file the best individual is written to
    #[arg(long, default_value = "best_weights.json")]
    output: PathBuf,
    /// Name stored in the weight file
    #[arg(long, default_value = "trained")]
    name: String,
    /// Seed the population from a previously trained weight file
    #[arg(long)]
    resume: Option<PathBuf>,
}

impl TrainArg {
    fn load_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config: TrainingConfig = match &self.config {
            Some(path) => util::read_json_file("training config", path)?,
            None => TrainingConfig::default(),
        };
        if let Some(v) = self.population_size {
            config.population_size = v;
        }
        if let Some(v) = self.generations {
            config.generations = v;
        }
        if let Some(v) = self.elite_fraction {
            config.elite_fraction = v;
        }
        if let Some(v) = self.mutation_rate {
            config.mutation_rate = v;
        }
        if let Some(v) = self.mutation_scale {
            config.mutation_scale = v;
        }
        if let Some(v) = self.games {
            config.games_per_individual = v;
        }
        if let Some(v) = self.turn_limit {
            config.turn_limit = v;
        }
        if self.fitness_target.is_some() {
            config.fitness_target = self.fitness_target;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let params = config
        .validate()
        .context("invalid training configuration")?;

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_cancel = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        eprintln!("\nCtrl+C received, stopping after the current generation...");
        handler_cancel.store(true, Ordering::Relaxed);
    })
    .context("cannot install Ctrl+C handler")?;

    let mut trainer =
        Trainer::new(params).persist_to(WeightStore::new(arg.output.clone()), arg.name.clone());
    let population = match &arg.resume {
        Some(path) => trainer.resumed_population(&WeightStore::new(path.clone())),
        None => trainer.random_population(),
    };

    let outcome = trainer
        .run(population, &cancel, print_generation)
        .with_context(|| format!("cannot save weights file {}", arg.output.display()))?;

    let stop = match outcome.stop {
        StopReason::Completed => "all generations completed",
        StopReason::FitnessTarget => "fitness target reached",
        StopReason::Cancelled => "cancelled",
    };
    eprintln!();
    eprintln!(
        "Training finished after {} generation(s): {stop}",
        outcome.generations_completed
    );
    match (outcome.best.fitness(), outcome.best.generation()) {
        (Some(fitness), Some(generation)) => eprintln!(
            "Best fitness {fitness:.1} (generation #{generation}) saved to {}",
            arg.output.display()
        ),
        _ => eprintln!("No individual was evaluated successfully; nothing was saved"),
    }
    Ok(())
}

fn print_generation(record: &GenerationRecord) {
    let GenerationRecord {
        generation,
        fitness,
        best_ever_fitness,
        improved,
        weight_stats,
        ..
    } = record;

    let marker = if *improved { " (new best)" } else { "" };
    eprintln!("Generation #{generation}{marker}:");
    eprintln!(
        "  Fitness: best {:.1}, mean {:.1}, worst {:.1}, best ever {}",
        fitness.max,
        fitness.mean,
        fitness.min,
        best_ever_fitness.map_or_else(|| "-".to_owned(), |f| format!("{f:.1}")),
    );
    eprintln!(
        "  {:<20} {:>9} {:>9} {:>9} {:>9}",
        "feature", "min", "max", "mean", "stddev"
    );
    for (feature, stats) in weight_stats {
        eprintln!(
            "  {:<20} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            feature.id(),
            stats.min,
            stats.max,
            stats.mean,
            stats.std_dev
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[derive(Debug, clap::Parser)]
    struct Wrapper {
        #[clap(flatten)]
        arg: TrainArg,
    }

    #[test]
    fn test_flags_override_defaults() {
        let Wrapper { arg } = Wrapper::try_parse_from([
            "train",
            "--population-size",
            "4",
            "--games",
            "1",
            "--seed",
            "5",
        ])
        .unwrap();
        let config = arg.load_config().unwrap();
        assert_eq!(config.population_size, 4);
        assert_eq!(config.games_per_individual, 1);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.generations, TrainingConfig::default().generations);
        assert_eq!(arg.output, PathBuf::from("best_weights.json"));
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let Wrapper { arg } =
            Wrapper::try_parse_from(["train", "--population-size", "1"]).unwrap();
        let err = arg.load_config().unwrap().validate().unwrap_err();
        assert_eq!(err.field(), "population_size");
    }
}
