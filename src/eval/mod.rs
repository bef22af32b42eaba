//! Node-overlap evaluation of generated trees against gold trees.
//!
//! A tree is viewed as a multiset of (child label, parent label) pairs, so a
//! node counts as correct only when both its own label bundle and its
//! parent's match the gold tree (structural + lexical match).

use crate::tree::{NodeLabel, SyntaxTree};
use std::collections::HashMap;

/// Overlap counts between a gold and a generated tree (or corpus).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapCounts {
    /// Pairs present in both trees (multiset intersection size).
    pub correct: usize,
    /// Pairs in the gold tree.
    pub gold: usize,
    /// Pairs in the generated tree.
    pub predicted: usize,
}

fn pair_counts(tree: &SyntaxTree) -> HashMap<(NodeLabel, NodeLabel), usize> {
    let mut counts = HashMap::new();
    for id in tree.non_root_ids() {
        let key = (tree.node(id).label.clone(), tree.parent_label(id));
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// True-positive / false-positive / false-negative counts for one tree pair,
/// expressed as (correct, gold, predicted) totals.
#[must_use]
pub fn tp_fp_fn(gold_tree: &SyntaxTree, generated_tree: &SyntaxTree) -> OverlapCounts {
    let gold = pair_counts(gold_tree);
    let predicted = pair_counts(generated_tree);

    let correct: usize = predicted
        .iter()
        .map(|(key, &p)| gold.get(key).map_or(0, |&g| g.min(p)))
        .sum();

    OverlapCounts {
        correct,
        gold: gold.values().sum(),
        predicted: predicted.values().sum(),
    }
}

/// Precision, recall and F1 from (correct, gold, predicted) counts.
///
/// Conventions: both sets empty yields (1, 1, 1); zero precision and recall
/// yield an F1 of 0, never NaN.
#[must_use]
pub fn p_r_f1_from_counts(correct: usize, gold: usize, predicted: usize) -> (f64, f64, f64) {
    if gold == 0 && predicted == 0 {
        return (1.0, 1.0, 1.0);
    }
    let precision = if predicted > 0 {
        correct as f64 / predicted as f64
    } else {
        0.0
    };
    let recall = if gold > 0 {
        correct as f64 / gold as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}

/// F1 alone from (correct, gold, predicted) counts.
#[must_use]
pub fn f1_from_counts(correct: usize, gold: usize, predicted: usize) -> f64 {
    p_r_f1_from_counts(correct, gold, predicted).2
}

/// Corpus-level accumulator: sum overlap counts across tree pairs, then
/// report precision/recall/F1 over the totals.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorpusScore {
    counts: OverlapCounts,
}

impl CorpusScore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, counts: OverlapCounts) {
        self.counts.correct += counts.correct;
        self.counts.gold += counts.gold;
        self.counts.predicted += counts.predicted;
    }

    #[must_use]
    pub fn counts(&self) -> OverlapCounts {
        self.counts
    }

    #[must_use]
    pub fn p_r_f1(&self) -> (f64, f64, f64) {
        p_r_f1_from_counts(self.counts.correct, self.counts.gold, self.counts.predicted)
    }
}
