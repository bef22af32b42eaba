//! Local ranker: binary logistic regression over expansion features.
//!
//! Training data is built contrastively: every expansion that actually
//! occurs in a gold tree is a positive example, and the candidate
//! generator's other proposals at the same context are negatives. The model
//! is fit by full-batch gradient descent with L2 regularization; if the loss
//! stops improving for a patience window, training stops early and keeps the
//! best-seen weights (reported via [`TrainReport::converged`], not an
//! error).

use super::features::{expansion_features, node_features, FeatureMap, FeatureVocab};
use super::{Ranker, TrainReport};
use crate::candgen::CandidateGenerator;
use crate::config::LogisticConfig;
use crate::da::DialogueAct;
use crate::io::{load_blob, save_blob};
use crate::tree::SyntaxTree;
use crate::{Error, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MODEL_KIND: &str = "logistic-ranker";
const DATA_KIND: &str = "rank-data";

/// One labeled expansion example.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankExample {
    pub features: FeatureMap,
    pub positive: bool,
}

/// Extracted training set for the local ranker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankTrainingData {
    pub examples: Vec<RankExample>,
}

impl RankTrainingData {
    /// Build contrastive examples from a parallel corpus and a trained
    /// candidate generator.
    pub fn create(
        das: &[DialogueAct],
        trees: &[SyntaxTree],
        candgen: &CandidateGenerator,
        config: &LogisticConfig,
    ) -> Result<Self> {
        if das.len() != trees.len() {
            return Err(Error::DataMismatch(format!(
                "{} dialogue acts vs {} trees",
                das.len(),
                trees.len()
            )));
        }

        let mut examples = Vec::new();
        for (da, tree) in das.iter().zip(trees) {
            for id in tree.non_root_ids() {
                let gold_label = &tree.node(id).label;
                let parent = tree.parent_label(id);
                let parent_depth = tree.depth(id).saturating_sub(1);
                let siblings = tree.sibling_count(id);

                examples.push(RankExample {
                    features: node_features(tree, id, da),
                    positive: true,
                });

                let mut negatives = 0;
                for cand in candgen.get_candidates(&parent, da) {
                    if cand.label == *gold_label {
                        continue;
                    }
                    if negatives >= config.negatives_per_context {
                        break;
                    }
                    examples.push(RankExample {
                        features: expansion_features(
                            &parent,
                            parent_depth,
                            siblings,
                            &cand.label,
                            cand.side,
                            da,
                        ),
                        positive: false,
                    });
                    negatives += 1;
                }
            }
        }
        Ok(Self { examples })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_blob(path, DATA_KIND, self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_blob(path, DATA_KIND)
    }
}

#[derive(Serialize, Deserialize)]
struct LogisticPayload {
    feature_names: Vec<String>,
    weights: Vec<f64>,
    bias: f64,
}

/// Fitted logistic-regression scorer.
#[derive(Clone, Debug)]
pub struct LocalRanker {
    vocab: FeatureVocab,
    weights: Array1<f64>,
    bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LocalRanker {
    /// Fit weights on extracted training data.
    pub fn train(data: &RankTrainingData, config: &LogisticConfig) -> Result<(Self, TrainReport)> {
        if data.examples.is_empty() {
            return Err(Error::DataMismatch(
                "empty ranker training data".to_string(),
            ));
        }

        // Index features once; examples become sparse (index, value) rows.
        let mut vocab = FeatureVocab::new();
        let rows: Vec<(Vec<(usize, f64)>, f64)> = data
            .examples
            .iter()
            .map(|ex| {
                let row = ex
                    .features
                    .iter()
                    .map(|(name, &value)| (vocab.get_or_insert(name), value))
                    .collect();
                (row, if ex.positive { 1.0 } else { 0.0 })
            })
            .collect();

        let n = rows.len() as f64;
        let dim = vocab.len();
        let mut weights = Array1::<f64>::zeros(dim);
        let mut bias = 0.0_f64;
        let mut best_weights = weights.clone();
        let mut best_bias = bias;
        let mut best_loss = f64::INFINITY;
        let mut stale = 0;
        let mut passes_run = 0;
        let mut converged = true;

        for _ in 0..config.passes {
            passes_run += 1;
            let mut grad = Array1::<f64>::zeros(dim);
            let mut grad_bias = 0.0_f64;
            let mut loss = 0.0_f64;

            for (row, y) in &rows {
                let z: f64 = bias + row.iter().map(|&(i, v)| weights[i] * v).sum::<f64>();
                let p = sigmoid(z);
                // Clamp to keep the log finite on confidently wrong examples.
                let p_safe = p.clamp(1e-12, 1.0 - 1e-12);
                loss -= y * p_safe.ln() + (1.0 - y) * (1.0 - p_safe).ln();
                let delta = p - y;
                for &(i, v) in row {
                    grad[i] += delta * v;
                }
                grad_bias += delta;
            }
            loss = loss / n + 0.5 * config.l2 * weights.dot(&weights);

            if !loss.is_finite() {
                return Err(Error::DivergentTraining(format!(
                    "non-finite loss after {passes_run} passes"
                )));
            }

            grad.mapv_inplace(|g| g / n);
            grad += &(config.l2 * &weights);
            weights -= &(config.learning_rate * &grad);
            bias -= config.learning_rate * grad_bias / n;

            if loss < best_loss - 1e-9 {
                best_loss = loss;
                best_weights = weights.clone();
                best_bias = bias;
                stale = 0;
            } else {
                stale += 1;
                if stale >= config.patience {
                    converged = false;
                    break;
                }
            }
        }

        let ranker = Self {
            vocab,
            weights: best_weights,
            bias: best_bias,
        };
        Ok((
            ranker,
            TrainReport {
                converged,
                epochs: passes_run,
                best_loss,
                epoch_mismatches: Vec::new(),
            },
        ))
    }

    /// Log-odds score of one expansion's features. Features outside the
    /// training vocabulary contribute nothing.
    #[must_use]
    pub fn score_features(&self, features: &FeatureMap) -> f64 {
        self.bias
            + features
                .iter()
                .filter_map(|(name, &value)| self.vocab.get(name).map(|i| self.weights[i] * value))
                .sum::<f64>()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_blob(
            path,
            MODEL_KIND,
            &LogisticPayload {
                feature_names: self.vocab.names().to_vec(),
                weights: self.weights.to_vec(),
                bias: self.bias,
            },
        )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload: LogisticPayload = load_blob(path, MODEL_KIND)?;
        if payload.feature_names.len() != payload.weights.len() {
            return Err(Error::CorruptModel(format!(
                "{} feature names vs {} weights",
                payload.feature_names.len(),
                payload.weights.len()
            )));
        }
        Ok(Self {
            vocab: FeatureVocab::from_names(payload.feature_names),
            weights: Array1::from_vec(payload.weights),
            bias: payload.bias,
        })
    }
}

impl Ranker for LocalRanker {
    /// A tree's local score is the sum of its per-node expansion scores.
    fn score_tree(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64 {
        tree.non_root_ids()
            .map(|id| self.score_features(&node_features(tree, id, da)))
            .sum()
    }
}
