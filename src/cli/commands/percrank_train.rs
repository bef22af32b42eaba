//! Percrank-train command implementation

use crate::candgen::CandidateGenerator;
use crate::cli::args::PercrankTrainArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, CandGenConfig, PerceptronConfig};
use crate::io::{read_das, read_trees};
use crate::planner::{TraceSink, WriteSink};
use crate::rank::GlobalRanker;
use crate::Result;
use std::fs::File;

pub fn run_percrank_train(args: PercrankTrainArgs, level: LogLevel) -> Result<()> {
    let config: PerceptronConfig = load_config(&args.ranker_config)?;
    let das = read_das(&args.train_das)?;
    let trees = read_trees(&args.train_trees)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training global ranker on {} dialogue acts ({} epochs max)",
            das.len(),
            config.epochs
        ),
    );

    let candgen = match &args.candgen {
        Some(path) => CandidateGenerator::load(path)?,
        None => {
            // No pretrained expansion model given: fit one on the same
            // corpus so search has candidates to rank.
            log(
                level,
                LogLevel::Verbose,
                "  No candidate-generator model given; training one from the corpus",
            );
            let mut candgen = CandidateGenerator::new(CandGenConfig::default());
            candgen.train(&das, &trees)?;
            candgen
        }
    };

    let mut sink;
    let mut trace: Option<&mut dyn TraceSink> = match &args.debug {
        Some(path) => {
            sink = WriteSink(File::create(path)?);
            Some(&mut sink)
        }
        None => None,
    };

    let mut ranker = GlobalRanker::new();
    let report = ranker.train(&das, &trees, &candgen, &config, trace.take())?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Finished after {} epochs, mismatches per epoch: {:?}",
            report.epochs, report.epoch_mismatches
        ),
    );
    if !report.converged {
        log(
            level,
            LogLevel::Normal,
            "Warning: mismatch count stopped improving before the epoch budget",
        );
    }

    ranker.save(&args.output_model)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Model saved to {}", args.output_model.display()),
    );
    Ok(())
}
