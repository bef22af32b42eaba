//! Asearch-gen command implementation

use crate::candgen::CandidateGenerator;
use crate::cli::args::AsearchGenArgs;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, AStarConfig};
use crate::eval::{tp_fp_fn, CorpusScore};
use crate::io::{read_das, read_trees, write_document, Document};
use crate::planner::{AStarPlanner, GenerationOutcome, WriteSink};
use crate::rank::GlobalRanker;
use crate::{Error, Result};
use std::fs::File;

pub fn run_asearch_gen(args: AsearchGenArgs, level: LogLevel) -> Result<()> {
    let candgen = CandidateGenerator::load(&args.candgen_model)?;
    let ranker = GlobalRanker::load(&args.percrank_model)?;
    let das = read_das(&args.test_das)?;
    let config: AStarConfig = match &args.config {
        Some(path) => load_config(path)?,
        None => AStarConfig::default(),
    };
    log(
        level,
        LogLevel::Normal,
        &format!("Generating trees for {} dialogue acts", das.len()),
    );

    let gold = match &args.eval {
        Some(path) => {
            let gold = read_trees(path)?;
            if gold.len() != das.len() {
                return Err(Error::DataMismatch(format!(
                    "{} gold trees vs {} dialogue acts",
                    gold.len(),
                    das.len()
                )));
            }
            Some(gold)
        }
        None => None,
    };

    let mut sink;
    let mut planner = AStarPlanner::new(&candgen, &ranker, config);
    if let Some(path) = &args.debug {
        sink = WriteSink(File::create(path)?);
        planner = planner.with_trace(&mut sink);
    }

    let mut doc = Document::new();
    let mut score = CorpusScore::new();
    let mut fallbacks = 0usize;
    for (i, da) in das.iter().enumerate() {
        let gold_tree = gold.as_ref().map(|g| &g[i]);
        let result = planner.generate(da, gold_tree);
        if result.outcome == GenerationOutcome::Fallback {
            fallbacks += 1;
        }
        let mut detail = format!(
            "  {}: {} nodes, cost {:.4}, {} iterations",
            da.signature(),
            result.tree.len(),
            result.cost,
            result.iterations
        );
        if let Some(gold_tree) = gold_tree {
            score.add(tp_fp_fn(gold_tree, &result.tree));
            if let Some(f1) = result.oracle_best_f1 {
                detail.push_str(&format!(", oracle best F1 {f1:.4}"));
            }
        }
        log(level, LogLevel::Verbose, &detail);
        doc.append(result.tree);
    }

    if fallbacks > 0 {
        log(
            level,
            LogLevel::Normal,
            &format!("{fallbacks} of {} acts ended in search fallback", das.len()),
        );
    }
    if gold.is_some() {
        let (p, r, f1) = score.p_r_f1();
        log(
            level,
            LogLevel::Normal,
            &format!("Node precision {p:.4}, recall {r:.4}, F1 {f1:.4}"),
        );
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
