//! Rank-train command implementation

use crate::cli::args::RankTrainArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, LogisticConfig};
use crate::rank::{LocalRanker, RankTrainingData};
use crate::Result;

pub fn run_rank_train(args: RankTrainArgs, level: LogLevel) -> Result<()> {
    let config: LogisticConfig = load_config(&args.ranker_config)?;
    let data = RankTrainingData::load(&args.train_data)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training local ranker on {} examples ({} passes max)",
            data.examples.len(),
            config.passes
        ),
    );

    let (ranker, report) = LocalRanker::train(&data, &config)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Finished after {} passes, best loss {:.6}",
            report.epochs, report.best_loss
        ),
    );
    if !report.converged {
        log(
            level,
            LogLevel::Normal,
            "Warning: loss stopped improving before the pass budget; kept best-seen weights",
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
