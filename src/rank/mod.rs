//! Tree scoring: feature extraction and the two learned rankers.
//!
//! [`LocalRanker`] scores one expansion step in isolation (logistic
//! regression over sparse features); [`GlobalRanker`] scores whole trees
//! (structured perceptron over expansion-history features) and doubles as
//! the A* search heuristic. Both implement [`Ranker`], as does the candidate
//! generator itself via its total log-probability, so planners depend only
//! on the trait.

pub mod features;
mod logistic;
mod perceptron;

pub use logistic::{LocalRanker, RankExample, RankTrainingData};
pub use perceptron::GlobalRanker;

use crate::candgen::CandidateGenerator;
use crate::da::DialogueAct;
use crate::tree::SyntaxTree;

/// Assigns a real-valued plausibility score to a (partial or complete) tree
/// for a dialogue act; higher is better. Implementations are deterministic
/// for fixed model state and take `&self`, so fitted models can be shared
/// across concurrent generation calls.
pub trait Ranker {
    fn score_tree(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64;
}

impl Ranker for CandidateGenerator {
    fn score_tree(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64 {
        self.tree_log_prob(tree, da)
    }
}

/// Outcome summary of a training run.
///
/// `converged == false` is the non-fatal convergence warning: training
/// stopped on its patience window and returned the best-seen parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainReport {
    pub converged: bool,
    /// Epochs (or gradient passes) actually run.
    pub epochs: usize,
    /// Best loss seen (logistic) or final mismatch count (perceptron).
    pub best_loss: f64,
    /// Per-epoch mismatched-DA counts; empty for the logistic ranker.
    pub epoch_mismatches: Vec<usize>,
}
