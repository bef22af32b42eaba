//! Sample-gen command implementation

use crate::candgen::CandidateGenerator;
use crate::cli::args::SampleGenArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::SamplingConfig;
use crate::eval::{f1_from_counts, tp_fp_fn};
use crate::io::{read_das, read_trees, write_document, Document};
use crate::planner::{Planner, SamplingPlanner};
use crate::rank::{LocalRanker, Ranker};
use crate::{Error, Result};

pub fn run_sample_gen(args: SampleGenArgs, level: LogLevel) -> Result<()> {
    let candgen = CandidateGenerator::load(&args.candgen_model)?;
    let das = read_das(&args.test_das)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Sampling trees for {} dialogue acts", das.len()),
    );

    let local_ranker = match &args.ranker {
        Some(path) => Some(LocalRanker::load(path)?),
        None => None,
    };
    let ranker: Option<&dyn Ranker> = local_ranker.as_ref().map(|r| r as &dyn Ranker);

    let config = SamplingConfig {
        samples_per_da: args.num_samples,
        ..SamplingConfig::default()
    };
    let mut planner = SamplingPlanner::new(&candgen, ranker, config);
    let mut doc = Document::new();

    match &args.oracle_eval {
        Some(gold_path) => {
            // Oracle mode: emit every sample and score the best of each
            // per-DA chunk against the gold tree.
            let gold = read_trees(gold_path)?;
            if gold.len() != das.len() {
                return Err(Error::DataMismatch(format!(
                    "{} gold trees vs {} dialogue acts",
                    gold.len(),
                    das.len()
                )));
            }
            let n = args.num_samples.max(1);
            let mut f1_sum = 0.0;
            for (da, gold_tree) in das.iter().zip(&gold) {
                let samples = planner.sample_many(da, n);
                let best = samples
                    .iter()
                    .map(|t| {
                        let c = tp_fp_fn(gold_tree, t);
                        f1_from_counts(c.correct, c.gold, c.predicted)
                    })
                    .fold(0.0_f64, f64::max);
                f1_sum += best;
                log(
                    level,
                    LogLevel::Verbose,
                    &format!("  {}: best-of-{n} F1 {best:.4}", da.signature()),
                );
                for tree in samples {
                    doc.append(tree);
                }
            }
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Oracle best-of-{n} F1 (averaged over {} acts): {:.4}",
                    das.len(),
                    f1_sum / das.len().max(1) as f64
                ),
            );
        }
        None => {
            for da in &das {
                planner.generate_tree(da, &mut doc);
            }
            log(
                level,
                LogLevel::Normal,
                &format!("Generated {} trees", doc.len()),
            );
        }
    }

    if let Some(out) = &args.output {
        write_document(out, &doc)?;
        log(
            level,
            LogLevel::Normal,
            &format!("Output written to {}", out.display()),
        );
    }
    Ok(())
}
