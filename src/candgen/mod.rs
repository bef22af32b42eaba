//! Candidate generator: an empirical expansion model trained by counting.
//!
//! For every node of every training tree, the generator records the triple
//! (parent label, dialogue act, child label + attachment side) and counts
//! its frequency. After the counting pass, candidates below the prune
//! threshold are discarded; this bounds the branching factor seen by the
//! planners and drops singleton noise at the cost of recall.
//!
//! At generation time, [`CandidateGenerator::get_candidates`] returns the
//! retained candidates for a context with probabilities normalized over the
//! retained set. An unseen context yields the empty set: that is a terminal
//! state for the node, not an error.

use crate::config::CandGenConfig;
use crate::da::{DialogueAct, SlotValue};
use crate::io::{load_blob, save_blob};
use crate::tree::{AttachSide, NodeLabel, SyntaxTree};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Log-probability charged for an expansion the model never observed.
const UNSEEN_LOG_PROB: f64 = -20.0;

const MODEL_KIND: &str = "candgen";

/// One proposed child attachment under a given (parent, dialogue act)
/// context.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub label: NodeLabel,
    pub side: AttachSide,
    /// Empirical probability, normalized over the context's retained
    /// candidates.
    pub probability: f64,
    /// False when the lemma carries slot content that the dialogue act does
    /// not ask for.
    pub compatible: bool,
}

type ContextKey = (NodeLabel, String);
type ExpansionKey = (NodeLabel, AttachSide);

#[derive(Serialize, Deserialize)]
struct CandidateCount {
    label: NodeLabel,
    side: AttachSide,
    count: u32,
}

#[derive(Serialize, Deserialize)]
struct ContextEntry {
    parent: NodeLabel,
    da: String,
    candidates: Vec<CandidateCount>,
}

#[derive(Serialize, Deserialize)]
struct CandGenPayload {
    prune_threshold: u32,
    contexts: Vec<ContextEntry>,
    value_lexicon: Vec<String>,
}

/// Trained expansion model. Immutable after [`train`](Self::train) or
/// [`load`](Self::load); inference goes through `&self` only.
#[derive(Clone, Debug, Default)]
pub struct CandidateGenerator {
    config: CandGenConfig,
    contexts: HashMap<ContextKey, HashMap<ExpansionKey, u32>>,
    /// Lemmas that realized slot content anywhere in the training data.
    /// Used for the candidate compatibility flag.
    value_lexicon: HashSet<String>,
}

impl CandidateGenerator {
    #[must_use]
    pub fn new(config: CandGenConfig) -> Self {
        Self {
            config,
            contexts: HashMap::new(),
            value_lexicon: HashSet::new(),
        }
    }

    /// Count expansions over a parallel corpus, then prune.
    ///
    /// The corpora are aligned by position; a length mismatch is a fatal
    /// [`Error::DataMismatch`].
    pub fn train(&mut self, das: &[DialogueAct], trees: &[SyntaxTree]) -> Result<()> {
        if das.len() != trees.len() {
            return Err(Error::DataMismatch(format!(
                "{} dialogue acts vs {} trees",
                das.len(),
                trees.len()
            )));
        }

        for (da, tree) in das.iter().zip(trees) {
            let sig = da.signature();
            for item in da.items() {
                match &item.value {
                    SlotValue::Value(v) => {
                        self.value_lexicon.insert(v.clone());
                    }
                    SlotValue::Any => {
                        let covering = if item.slot.is_empty() {
                            &item.intent
                        } else {
                            &item.slot
                        };
                        self.value_lexicon.insert(covering.clone());
                    }
                }
            }
            for (parent, child, side) in tree.attachments() {
                let context = self
                    .contexts
                    .entry((parent, sig.clone()))
                    .or_default();
                *context.entry((child, side)).or_insert(0) += 1;
            }
        }

        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        let threshold = self.config.prune_threshold;
        for counts in self.contexts.values_mut() {
            counts.retain(|_, count| *count >= threshold);
        }
        self.contexts.retain(|_, counts| !counts.is_empty());
    }

    /// Retained candidates for a (parent, dialogue act) context, with
    /// probabilities summing to 1. Unseen contexts yield an empty vector.
    #[must_use]
    pub fn get_candidates(&self, parent: &NodeLabel, da: &DialogueAct) -> Vec<Candidate> {
        let key = (parent.clone(), da.signature());
        let Some(counts) = self.contexts.get(&key) else {
            return Vec::new();
        };
        let total: u32 = counts.values().sum();
        let mut candidates: Vec<Candidate> = counts
            .iter()
            .map(|((label, side), &count)| Candidate {
                compatible: self.lemma_compatible(&label.lemma, da),
                label: label.clone(),
                side: *side,
                probability: f64::from(count) / f64::from(total),
            })
            .collect();
        // Deterministic order regardless of hash-map iteration.
        candidates.sort_by(|a, b| (&a.label, a.side).cmp(&(&b.label, b.side)));
        candidates
    }

    /// True unless `lemma` is known to carry slot content that `da` does not
    /// mention. Lemmas never seen as slot content are always compatible.
    #[must_use]
    pub fn lemma_compatible(&self, lemma: &str, da: &DialogueAct) -> bool {
        !self.value_lexicon.contains(lemma) || da.mentions_lemma(lemma)
    }

    /// Number of retained candidates for one context.
    #[must_use]
    pub fn candidate_count(&self, parent: &NodeLabel, da: &DialogueAct) -> usize {
        self.contexts
            .get(&(parent.clone(), da.signature()))
            .map_or(0, HashMap::len)
    }

    /// Number of retained contexts.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Total retained candidates across all contexts.
    #[must_use]
    pub fn total_candidate_count(&self) -> usize {
        self.contexts.values().map(HashMap::len).sum()
    }

    /// Total model log-probability of a tree's expansion history under the
    /// dialogue act. Unseen expansions are charged a flat penalty so that a
    /// tree is never assigned zero probability outright.
    #[must_use]
    pub fn tree_log_prob(&self, tree: &SyntaxTree, da: &DialogueAct) -> f64 {
        let sig = da.signature();
        tree.attachments()
            .into_iter()
            .map(|(parent, child, side)| {
                let Some(counts) = self.contexts.get(&(parent, sig.clone())) else {
                    return UNSEEN_LOG_PROB;
                };
                let total: u32 = counts.values().sum();
                match counts.get(&(child, side)) {
                    Some(&count) => (f64::from(count) / f64::from(total)).ln(),
                    None => UNSEEN_LOG_PROB,
                }
            })
            .sum()
    }

    /// Persist the pruned frequency table as a versioned blob.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut contexts: Vec<ContextEntry> = self
            .contexts
            .iter()
            .map(|((parent, da), counts)| {
                let mut candidates: Vec<CandidateCount> = counts
                    .iter()
                    .map(|((label, side), &count)| CandidateCount {
                        label: label.clone(),
                        side: *side,
                        count,
                    })
                    .collect();
                candidates.sort_by(|a, b| (&a.label, a.side).cmp(&(&b.label, b.side)));
                ContextEntry {
                    parent: parent.clone(),
                    da: da.clone(),
                    candidates,
                }
            })
            .collect();
        contexts.sort_by(|a, b| (&a.parent, &a.da).cmp(&(&b.parent, &b.da)));

        let mut value_lexicon: Vec<String> = self.value_lexicon.iter().cloned().collect();
        value_lexicon.sort();

        save_blob(
            path,
            MODEL_KIND,
            &CandGenPayload {
                prune_threshold: self.config.prune_threshold,
                contexts,
                value_lexicon,
            },
        )
    }

    /// Load a previously saved model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload: CandGenPayload = load_blob(path, MODEL_KIND)?;
        let mut contexts: HashMap<ContextKey, HashMap<ExpansionKey, u32>> = HashMap::new();
        for entry in payload.contexts {
            let counts = contexts
                .entry((entry.parent, entry.da))
                .or_default();
            for cand in entry.candidates {
                counts.insert((cand.label, cand.side), cand.count);
            }
        }
        Ok(Self {
            config: CandGenConfig {
                prune_threshold: payload.prune_threshold,
            },
            contexts,
            value_lexicon: payload.value_lexicon.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn label(lemma: &str) -> NodeLabel {
        NodeLabel::new(lemma, "x")
    }

    /// Builds a root -> chain tree from lemmas.
    fn chain(lemmas: &[&str]) -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let mut parent = tree.root();
        for lemma in lemmas {
            parent = tree.add_child(parent, AttachSide::Right, label(lemma));
        }
        tree
    }

    fn da(text: &str) -> DialogueAct {
        DialogueAct::parse(text).unwrap()
    }

    #[test]
    fn test_corpus_length_mismatch() {
        let mut candgen = CandidateGenerator::new(CandGenConfig::default());
        let err = candgen
            .train(&[da("inform(a=b)")], &[])
            .unwrap_err();
        assert!(matches!(err, Error::DataMismatch(_)));
    }

    #[test]
    fn test_probabilities_are_normalized() {
        let mut candgen = CandidateGenerator::new(CandGenConfig::default());
        let d = da("inform(food=chinese)");
        // Root expands to "a" twice and "b" once across three trees.
        let trees = vec![chain(&["a"]), chain(&["a"]), chain(&["b"])];
        candgen.train(&[d.clone(), d.clone(), d.clone()], &trees).unwrap();

        let candidates = candgen.get_candidates(&NodeLabel::root(), &d);
        assert_eq!(candidates.len(), 2);
        let sum: f64 = candidates.iter().map(|c| c.probability).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        let a = candidates.iter().find(|c| c.label.lemma == "a").unwrap();
        assert!((a.probability - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_context_yields_empty_set() {
        let candgen = CandidateGenerator::new(CandGenConfig::default());
        assert!(candgen
            .get_candidates(&label("nothing"), &da("inform(a=b)"))
            .is_empty());
    }

    #[test]
    fn test_pruning_drops_singletons() {
        let mut candgen = CandidateGenerator::new(CandGenConfig { prune_threshold: 2 });
        let d = da("inform(food=chinese)");
        let trees = vec![chain(&["a"]), chain(&["a"]), chain(&["b"])];
        candgen.train(&[d.clone(), d.clone(), d.clone()], &trees).unwrap();

        let candidates = candgen.get_candidates(&NodeLabel::root(), &d);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label.lemma, "a");
        assert!((candidates[0].probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_total_candidate_count_sums_contexts() {
        let mut candgen = CandidateGenerator::new(CandGenConfig::default());
        let d = da("inform(food=chinese)");
        // Contexts: root -> a (seen twice), a -> b (seen once).
        let trees = vec![chain(&["a", "b"]), chain(&["a"])];
        candgen.train(&[d.clone(), d.clone()], &trees).unwrap();

        assert_eq!(candgen.context_count(), 2);
        assert_eq!(candgen.total_candidate_count(), 2);
        assert_eq!(
            candgen.total_candidate_count(),
            candgen.candidate_count(&NodeLabel::root(), &d)
                + candgen.candidate_count(&label("a"), &d)
        );

        // Pruning shrinks the total.
        let mut pruned = CandidateGenerator::new(CandGenConfig { prune_threshold: 2 });
        pruned.train(&[d.clone(), d.clone()], &trees).unwrap();
        assert_eq!(pruned.total_candidate_count(), 1);
    }

    #[test]
    fn test_compatibility_flag() {
        let mut candgen = CandidateGenerator::new(CandGenConfig::default());
        let d1 = da("inform(food=chinese)");
        let d2 = da("inform(food=italian)");
        candgen
            .train(
                &[d1.clone(), d2.clone()],
                &[chain(&["chinese"]), chain(&["italian"])],
            )
            .unwrap();

        let c1 = candgen.get_candidates(&NodeLabel::root(), &d1);
        let chinese = c1.iter().find(|c| c.label.lemma == "chinese").unwrap();
        assert!(chinese.compatible);
        // "italian" is known slot content but d1 does not ask for it.
        assert!(!candgen.lemma_compatible("italian", &d1));
        // A lemma never seen as slot content stays compatible everywhere.
        assert!(candgen.lemma_compatible("be", &d1));
    }

    #[test]
    fn test_tree_log_prob_prefers_frequent_expansions() {
        let mut candgen = CandidateGenerator::new(CandGenConfig::default());
        let d = da("inform(food=chinese)");
        let trees = vec![chain(&["a"]), chain(&["a"]), chain(&["b"])];
        candgen.train(&[d.clone(), d.clone(), d.clone()], &trees).unwrap();

        let lp_a = candgen.tree_log_prob(&chain(&["a"]), &d);
        let lp_b = candgen.tree_log_prob(&chain(&["b"]), &d);
        assert!(lp_a > lp_b);
        // Unseen expansions get the flat penalty, not -inf.
        let lp_unseen = candgen.tree_log_prob(&chain(&["zzz"]), &d);
        assert!(lp_unseen.is_finite());
        assert!(lp_unseen < lp_b);
    }

    proptest! {
        /// Raising the prune threshold never increases the number of
        /// retained candidates for any context.
        #[test]
        fn prop_pruning_is_monotonic(
            corpus in prop::collection::vec(prop::collection::vec(0u8..4, 1..4), 1..20)
        ) {
            let d = da("inform(food=chinese)");
            let lemmas = ["a", "b", "c", "d"];
            let trees: Vec<SyntaxTree> = corpus
                .iter()
                .map(|chain_ids| {
                    let picked: Vec<&str> =
                        chain_ids.iter().map(|&i| lemmas[i as usize]).collect();
                    chain(&picked)
                })
                .collect();
            let das = vec![d.clone(); trees.len()];

            let mut retained_at = Vec::new();
            for threshold in 1..=4u32 {
                let mut candgen =
                    CandidateGenerator::new(CandGenConfig { prune_threshold: threshold });
                candgen.train(&das, &trees).unwrap();
                retained_at.push(
                    lemmas
                        .iter()
                        .map(|l| candgen.candidate_count(&label(l), &d))
                        .chain(std::iter::once(
                            candgen.candidate_count(&NodeLabel::root(), &d),
                        ))
                        .collect::<Vec<usize>>(),
                );
            }
            for window in retained_at.windows(2) {
                for (lo, hi) in window[1].iter().zip(&window[0]) {
                    prop_assert!(lo <= hi);
                }
            }
        }

        /// Probabilities over retained candidates always sum to 1.
        #[test]
        fn prop_probabilities_sum_to_one(
            corpus in prop::collection::vec(prop::collection::vec(0u8..4, 1..4), 1..20),
            threshold in 1u32..3
        ) {
            let d = da("inform(food=chinese)");
            let lemmas = ["a", "b", "c", "d"];
            let trees: Vec<SyntaxTree> = corpus
                .iter()
                .map(|chain_ids| {
                    let picked: Vec<&str> =
                        chain_ids.iter().map(|&i| lemmas[i as usize]).collect();
                    chain(&picked)
                })
                .collect();
            let das = vec![d.clone(); trees.len()];

            let mut candgen =
                CandidateGenerator::new(CandGenConfig { prune_threshold: threshold });
            candgen.train(&das, &trees).unwrap();

            for parent in std::iter::once(NodeLabel::root())
                .chain(lemmas.iter().map(|l| label(l)))
            {
                let candidates = candgen.get_candidates(&parent, &d);
                if !candidates.is_empty() {
                    let sum: f64 = candidates.iter().map(|c| c.probability).sum();
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
            }
        }
    }
}
