//! Candgen-train command implementation

use crate::candgen::CandidateGenerator;
use crate::cli::args::CandgenTrainArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::CandGenConfig;
use crate::io::{read_das, read_trees};
use crate::Result;

pub fn run_candgen_train(args: CandgenTrainArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training candidate generator from {} + {}",
            args.train_das.display(),
            args.train_trees.display()
        ),
    );

    let das = read_das(&args.train_das)?;
    let trees = read_trees(&args.train_trees)?;
    log(
        level,
        LogLevel::Verbose,
        &format!("  Corpus: {} dialogue acts, {} trees", das.len(), trees.len()),
    );

    let mut candgen = CandidateGenerator::new(CandGenConfig {
        prune_threshold: args.prune_threshold,
    });
    candgen.train(&das, &trees)?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Learned {} candidates over {} expansion contexts",
            candgen.total_candidate_count(),
            candgen.context_count()
        ),
    );

    candgen.save(&args.output_model)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Model saved to {}", args.output_model.display()),
    );
    Ok(())
}
