//! Rank-data command implementation

use crate::candgen::CandidateGenerator;
use crate::cli::args::RankDataArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, LogisticConfig};
use crate::io::{read_das, read_trees};
use crate::rank::RankTrainingData;
use crate::Result;

pub fn run_rank_data(args: RankDataArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Extracting ranker training data from {}",
            args.train_trees.display()
        ),
    );

    let das = read_das(&args.train_das)?;
    let trees = read_trees(&args.train_trees)?;
    let candgen = CandidateGenerator::load(&args.candgen_model)?;
    let config: LogisticConfig = load_config(&args.ranker_config)?;

    let data = RankTrainingData::create(&das, &trees, &candgen, &config)?;
    let positives = data.examples.iter().filter(|e| e.positive).count();
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Extracted {} examples ({} positive, {} negative)",
            data.examples.len(),
            positives,
            data.examples.len() - positives
        ),
    );

    data.save(&args.output_data)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Training data saved to {}", args.output_data.display()),
    );
    Ok(())
}
