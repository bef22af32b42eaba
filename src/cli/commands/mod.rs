//! CLI command implementations

mod asearch_gen;
mod candgen_train;
mod percrank_train;
mod rank_data;
mod rank_train;
mod sample_gen;

use crate::cli::args::{Cli, Command};
use crate::cli::LogLevel;
use crate::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    // Configure output based on verbose/quiet flags
    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    match cli.command {
        Command::CandgenTrain(args) => candgen_train::run_candgen_train(args, log_level),
        Command::RankData(args) => rank_data::run_rank_data(args, log_level),
        Command::RankTrain(args) => rank_train::run_rank_train(args, log_level),
        Command::PercrankTrain(args) => percrank_train::run_percrank_train(args, log_level),
        Command::SampleGen(args) => sample_gen::run_sample_gen(args, log_level),
        Command::AsearchGen(args) => asearch_gen::run_asearch_gen(args, log_level),
    }
}
