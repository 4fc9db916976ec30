use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, train::TrainArg};

mod auto_play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train heuristic weights using a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Let the heuristic agent play one game
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::logging::init(args.verbose);
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_train_overrides() {
        let args = CommandArgs::try_parse_from([
            "gridblast",
            "-vv",
            "train",
            "--generations",
            "3",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Mode::Train(_)));
    }
}
