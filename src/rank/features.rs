//! Sparse feature extraction shared by both rankers.
//!
//! Features are named and stored in a `BTreeMap` so extraction order is
//! deterministic. The same expansion features describe a candidate before it
//! is attached and a node of a finished tree, which is what makes a tree's
//! score reconstructible from the tree alone: a tree's expansion history is
//! the union (with counts) of its non-root nodes' features.

use crate::da::DialogueAct;
use crate::tree::{AttachSide, NodeId, NodeLabel, SyntaxTree};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Sparse named feature vector.
pub type FeatureMap = BTreeMap<String, f64>;

fn bump(map: &mut FeatureMap, name: String, value: f64) {
    *map.entry(name).or_insert(0.0) += value;
}

/// Features of attaching `label` on `side` under a parent at `parent_depth`
/// with `sibling_count` existing children, given the dialogue act.
#[must_use]
pub fn expansion_features(
    parent: &NodeLabel,
    parent_depth: usize,
    sibling_count: usize,
    label: &NodeLabel,
    side: AttachSide,
    da: &DialogueAct,
) -> FeatureMap {
    let mut f = FeatureMap::new();
    let depth = parent_depth + 1;

    bump(&mut f, format!("lemma={}", label.lemma), 1.0);
    bump(&mut f, format!("formeme={}", label.formeme), 1.0);
    bump(
        &mut f,
        format!("bigram={}>{}", parent.lemma, label.lemma),
        1.0,
    );
    bump(
        &mut f,
        format!("bigram_form={}>{}", parent.formeme, label.formeme),
        1.0,
    );
    let side_tag = match side {
        AttachSide::Left => "L",
        AttachSide::Right => "R",
    };
    bump(&mut f, format!("side={side_tag}"), 1.0);
    bump(&mut f, format!("depth={depth}"), 1.0);
    bump(&mut f, "depth".to_string(), depth as f64);
    bump(&mut f, "siblings".to_string(), sibling_count as f64);

    for item in da.items() {
        bump(
            &mut f,
            format!("cooc={}|{}:{}", label.lemma, item.intent, item.slot),
            1.0,
        );
        if item.is_covered_by(&label.lemma) {
            bump(&mut f, "covers_da".to_string(), 1.0);
        }
    }
    f
}

fn node_side(tree: &SyntaxTree, id: NodeId) -> AttachSide {
    let Some(parent) = tree.node(id).parent else {
        return AttachSide::Right;
    };
    let siblings = &tree.node(parent).children;
    let pos = siblings
        .iter()
        .position(|&c| c == id)
        .expect("child listed under its parent");
    if pos < siblings.len() / 2 {
        AttachSide::Left
    } else {
        AttachSide::Right
    }
}

/// Expansion features of an already-attached node.
#[must_use]
pub fn node_features(tree: &SyntaxTree, id: NodeId, da: &DialogueAct) -> FeatureMap {
    let parent = tree.parent_label(id);
    let parent_depth = tree.depth(id).saturating_sub(1);
    expansion_features(
        &parent,
        parent_depth,
        tree.sibling_count(id),
        &tree.node(id).label,
        node_side(tree, id),
        da,
    )
}

/// Whole-tree expansion-history features: per-node features summed, plus
/// global size and residual-coverage counts.
#[must_use]
pub fn tree_features(tree: &SyntaxTree, da: &DialogueAct) -> FeatureMap {
    let mut f = FeatureMap::new();
    let mut residual = da.clone();
    for id in tree.non_root_ids() {
        for (name, value) in node_features(tree, id, da) {
            bump(&mut f, name, value);
        }
        residual = residual.remove_covered(&tree.node(id).label.lemma);
    }
    bump(&mut f, "tree_size".to_string(), (tree.len() - 1) as f64);
    bump(&mut f, "uncovered".to_string(), residual.len() as f64);
    f
}

/// Maps feature names to dense indices for the logistic ranker's weight
/// vector.
#[derive(Clone, Debug, Default)]
pub struct FeatureVocab {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureVocab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vocab from its saved name list.
    #[must_use]
    pub fn from_names(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, index }
    }

    pub fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), i);
        i
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(lemma: &str) -> NodeLabel {
        NodeLabel::new(lemma, "x")
    }

    fn da(text: &str) -> DialogueAct {
        DialogueAct::parse(text).unwrap()
    }

    #[test]
    fn test_expansion_features_deterministic() {
        let d = da("inform(food=chinese)");
        let f1 = expansion_features(&NodeLabel::root(), 0, 0, &label("be"), AttachSide::Right, &d);
        let f2 = expansion_features(&NodeLabel::root(), 0, 0, &label("be"), AttachSide::Right, &d);
        assert_eq!(f1, f2);
        assert!(f1.contains_key("lemma=be"));
        assert!(f1.contains_key("side=R"));
    }

    #[test]
    fn test_coverage_feature() {
        let d = da("inform(food=chinese)");
        let covering =
            expansion_features(&NodeLabel::root(), 0, 0, &label("chinese"), AttachSide::Right, &d);
        let other =
            expansion_features(&NodeLabel::root(), 0, 0, &label("be"), AttachSide::Right, &d);
        assert_eq!(covering.get("covers_da"), Some(&1.0));
        assert!(!other.contains_key("covers_da"));
    }

    #[test]
    fn test_tree_features_accumulate_counts() {
        let d = da("inform(food=chinese)");
        let mut tree = SyntaxTree::new();
        tree.add_child(tree.root(), AttachSide::Right, label("a"));
        tree.add_child(tree.root(), AttachSide::Right, label("a"));

        let f = tree_features(&tree, &d);
        assert_eq!(f.get("lemma=a"), Some(&2.0));
        assert_eq!(f.get("tree_size"), Some(&2.0));
        assert_eq!(f.get("uncovered"), Some(&1.0));
    }

    #[test]
    fn test_tree_features_match_node_features_for_candidates() {
        // Candidate features computed before attaching must equal the node
        // features recovered from the finished tree.
        let d = da("inform(food=chinese)");
        let tree = SyntaxTree::new();
        let cand = expansion_features(
            &NodeLabel::root(),
            0,
            0,
            &label("chinese"),
            AttachSide::Right,
            &d,
        );
        let (expanded, id) = tree.with_child(tree.root(), AttachSide::Right, label("chinese"));
        assert_eq!(cand, node_features(&expanded, id, &d));
    }

    #[test]
    fn test_vocab_round_trip() {
        let mut vocab = FeatureVocab::new();
        let a = vocab.get_or_insert("lemma=a");
        let b = vocab.get_or_insert("lemma=b");
        assert_ne!(a, b);
        assert_eq!(vocab.get_or_insert("lemma=a"), a);

        let rebuilt = FeatureVocab::from_names(vocab.names().to_vec());
        assert_eq!(rebuilt.get("lemma=b"), Some(b));
        assert_eq!(rebuilt.len(), 2);
    }
}
