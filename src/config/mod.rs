//! Configuration structs for training and generation.
//!
//! Every struct has serde derives and sensible defaults so partial YAML
//! config files work; [`load_config`] reads one struct from a YAML file.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Candidate-generator training options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandGenConfig {
    /// Candidates observed fewer than this many times are discarded after
    /// the counting pass. 1 keeps everything seen at least once.
    pub prune_threshold: u32,
}

impl Default for CandGenConfig {
    fn default() -> Self {
        Self { prune_threshold: 1 }
    }
}

/// Node-termination policy for tree building.
///
/// The original system's exact stop heuristic is not recoverable, so
/// termination is configuration: a hard node and depth cap, plus the
/// unnormalized mass of the explicit "stop expanding this node"
/// pseudo-candidate mixed into each sampling distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationPolicy {
    pub max_nodes: usize,
    pub max_depth: usize,
    pub stop_weight: f64,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            max_nodes: 20,
            max_depth: 5,
            stop_weight: 1.0,
        }
    }
}

/// Sampling-planner options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Trees sampled per dialogue act when a reranker is available.
    pub samples_per_da: usize,
    pub policy: TerminationPolicy,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples_per_da: 1,
            policy: TerminationPolicy::default(),
            seed: 1206,
        }
    }
}

/// A*-planner options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarConfig {
    /// Frontier pops before giving up and returning the best state so far.
    pub max_iterations: usize,
    pub max_tree_size: usize,
    pub max_depth: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            max_tree_size: 20,
            max_depth: 5,
        }
    }
}

/// Logistic-regression (local ranker) training options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub passes: usize,
    pub learning_rate: f64,
    pub l2: f64,
    /// Passes without loss improvement before training stops early with the
    /// best-seen weights (reported, not fatal).
    pub patience: usize,
    /// Cap on negative examples emitted per expansion context.
    pub negatives_per_context: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            passes: 100,
            learning_rate: 0.1,
            l2: 1e-4,
            patience: 10,
            negatives_per_context: 10,
        }
    }
}

/// Structured-perceptron (global ranker) training options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptronConfig {
    pub epochs: usize,
    /// Epochs without mismatch-count improvement before early stopping.
    pub patience: usize,
    /// Average weights over updates to reduce variance.
    pub averaging: bool,
    pub seed: u64,
    /// Bounded search used to obtain the predicted tree each update.
    pub search: AStarConfig,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            patience: 2,
            averaging: true,
            seed: 1206,
            search: AStarConfig::default(),
        }
    }
}

/// Read one config struct from a YAML file.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("cannot open {}: {e}", path.display())))?;
    serde_yaml::from_reader(file)
        .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))
}
