//! Global ranker: a structured perceptron over whole-tree features.
//!
//! Each update runs the current model through a bounded A* generation to get
//! its best predicted tree for a training dialogue act. If the prediction
//! already matches the gold tree node-for-node there is nothing to learn;
//! otherwise one structured update moves the weights toward the gold tree's
//! expansion-history features and away from the prediction's. This corrects
//! the local model's short-sightedness: individually plausible expansions
//! that compose into a globally wrong tree get pushed down as a unit.

use super::features::{tree_features, FeatureMap};
use super::{Ranker, TrainReport};
use crate::candgen::CandidateGenerator;
use crate::config::PerceptronConfig;
use crate::da::DialogueAct;
use crate::eval::tp_fp_fn;
use crate::io::{load_blob, save_blob};
use crate::planner::{astar_search, TraceSink};
use crate::tree::SyntaxTree;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const MODEL_KIND: &str = "perceptron-ranker";

#[derive(Serialize, Deserialize)]
struct PerceptronPayload {
    weights: Vec<(String, f64)>,
}

/// Whole-tree structured-perceptron scorer.
///
/// Weights are sparse and named: structured updates touch features first
/// discovered during search, which a pre-built dense vocabulary could not
/// enumerate.
#[derive(Clone, Debug, Default)]
pub struct GlobalRanker {
    weights: HashMap<String, f64>,
    /// Variance-reducing average over update snapshots; preferred for
    /// scoring once training has produced it.
    averaged: Option<HashMap<String, f64>>,
}

fn score_map(weights: &HashMap<String, f64>, features: &FeatureMap) -> f64 {
    features
        .iter()
        .filter_map(|(name, value)| weights.get(name).map(|w| w * value))
        .sum()
}

/// Scores with a borrowed weight snapshot, so training can hand the planner
/// a ranker view without cloning the table per update.
struct SnapshotRanker<'a> {
    weights: &'a HashMap<String, f64>,
}

impl Ranker for SnapshotRanker<'_> {
    fn score_tree(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64 {
        score_map(self.weights, &tree_features(tree, da))
    }
}

impl GlobalRanker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Train over the parallel corpus for the configured epoch budget, with
    /// early stopping when the epoch mismatch count stops improving.
    pub fn train(
        &mut self,
        das: &[DialogueAct],
        trees: &[SyntaxTree],
        candgen: &CandidateGenerator,
        config: &PerceptronConfig,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
    ) -> Result<TrainReport> {
        if das.len() != trees.len() {
            return Err(Error::DataMismatch(format!(
                "{} dialogue acts vs {} trees",
                das.len(),
                trees.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut order: Vec<usize> = (0..das.len()).collect();
        let mut sum_weights: HashMap<String, f64> = HashMap::new();
        let mut snapshots = 0u64;
        let mut mismatches_per_epoch = Vec::with_capacity(config.epochs);
        let mut best_mismatches = usize::MAX;
        let mut stale = 0;
        let mut converged = true;
        let mut epochs_run = 0;

        for _ in 0..config.epochs {
            epochs_run += 1;
            order.shuffle(&mut rng);
            let mut mismatches = 0;

            for &i in &order {
                let da = &das[i];
                let gold = &trees[i];

                let predicted = {
                    let snapshot = SnapshotRanker {
                        weights: &self.weights,
                    };
                    astar_search(
                        candgen,
                        &snapshot,
                        &config.search,
                        da,
                        None,
                        trace.as_deref_mut(),
                    )
                    .tree
                };

                let counts = tp_fp_fn(gold, &predicted);
                let exact =
                    counts.correct == counts.gold && counts.correct == counts.predicted;
                if exact {
                    continue;
                }
                mismatches += 1;

                // One structured update per mismatched dialogue act.
                for (name, value) in tree_features(gold, da) {
                    *self.weights.entry(name).or_insert(0.0) += value;
                }
                for (name, value) in tree_features(&predicted, da) {
                    *self.weights.entry(name).or_insert(0.0) -= value;
                }

                if config.averaging {
                    for (name, &w) in &self.weights {
                        *sum_weights.entry(name.clone()).or_insert(0.0) += w;
                    }
                    snapshots += 1;
                }
            }

            if self.weights.values().any(|w| !w.is_finite()) {
                return Err(Error::DivergentTraining(format!(
                    "non-finite perceptron weights after {epochs_run} epochs"
                )));
            }

            mismatches_per_epoch.push(mismatches);
            if mismatches == 0 {
                break;
            }
            if mismatches < best_mismatches {
                best_mismatches = mismatches;
                stale = 0;
            } else {
                stale += 1;
                if stale >= config.patience {
                    converged = false;
                    break;
                }
            }
        }

        if config.averaging && snapshots > 0 {
            let averaged = sum_weights
                .into_iter()
                .map(|(name, sum)| (name, sum / snapshots as f64))
                .collect();
            self.averaged = Some(averaged);
        }

        let final_mismatches = mismatches_per_epoch.last().copied().unwrap_or(0);
        Ok(TrainReport {
            converged,
            epochs: epochs_run,
            best_loss: final_mismatches as f64,
            epoch_mismatches: mismatches_per_epoch,
        })
    }

    fn active_weights(&self) -> &HashMap<String, f64> {
        self.averaged.as_ref().unwrap_or(&self.weights)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut weights: Vec<(String, f64)> = self
            .active_weights()
            .iter()
            .map(|(name, &w)| (name.clone(), w))
            .collect();
        weights.sort_by(|a, b| a.0.cmp(&b.0));
        save_blob(path, MODEL_KIND, &PerceptronPayload { weights })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload: PerceptronPayload = load_blob(path, MODEL_KIND)?;
        Ok(Self {
            weights: payload.weights.into_iter().collect(),
            averaged: None,
        })
    }
}

impl Ranker for GlobalRanker {
    /// Sum of feature weights over the tree's expansion-feature history.
    fn score_tree(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64 {
        score_map(self.active_weights(), &tree_features(tree, da))
    }
}
