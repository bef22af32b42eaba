//! Stochastic tree generation with optional reranking.
//!
//! A tree is sampled by repeatedly drawing from the candidate generator's
//! normalized distribution at each open node, with an explicit "stop
//! expanding this node" pseudo-candidate mixed in according to the
//! termination policy. Without a ranker the single sample is returned;
//! with one, `samples_per_da` trees are drawn and the ranker's argmax wins.

use super::Planner;
use crate::candgen::CandidateGenerator;
use crate::config::SamplingConfig;
use crate::da::DialogueAct;
use crate::io::Document;
use crate::rank::Ranker;
use crate::tree::SyntaxTree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Sampling planner over fitted, read-only models.
pub struct SamplingPlanner<'a> {
    candgen: &'a CandidateGenerator,
    ranker: Option<&'a dyn Ranker>,
    config: SamplingConfig,
    rng: StdRng,
}

impl<'a> SamplingPlanner<'a> {
    #[must_use]
    pub fn new(
        candgen: &'a CandidateGenerator,
        ranker: Option<&'a dyn Ranker>,
        config: SamplingConfig,
    ) -> Self {
        Self {
            candgen,
            ranker,
            config,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Draw one complete tree for the dialogue act.
    pub fn sample_tree(&mut self, da: &DialogueAct) -> SyntaxTree {
        let policy = self.config.policy;
        let mut tree = SyntaxTree::new();
        let mut residual = da.clone();
        let mut open: VecDeque<_> = VecDeque::new();
        open.push_back(tree.root());

        while let Some(node) = open.pop_front() {
            if tree.len() >= policy.max_nodes {
                break;
            }
            if tree.depth(node) >= policy.max_depth {
                continue;
            }
            let candidates: Vec<_> = self
                .candgen
                .get_candidates(&tree.node(node).label, da)
                .into_iter()
                .filter(|c| self.candgen.lemma_compatible(&c.label.lemma, &residual))
                .collect();
            if candidates.is_empty() {
                continue; // terminal context: the node stops expanding
            }

            // Candidate probabilities sum to 1; the stop pseudo-candidate
            // adds unnormalized mass on top.
            let draw: f64 = self.rng.random::<f64>() * (policy.stop_weight + 1.0);
            if draw < policy.stop_weight {
                continue; // explicit stop drawn for this node
            }
            let mut remaining = draw - policy.stop_weight;
            let mut chosen = candidates.last().expect("candidates nonempty");
            for cand in &candidates {
                if remaining < cand.probability {
                    chosen = cand;
                    break;
                }
                remaining -= cand.probability;
            }

            let child = tree.add_child(node, chosen.side, chosen.label.clone());
            residual = residual.remove_covered(&tree.node(child).label.lemma);
            // Both the parent and the new child stay available for further
            // expansion until a stop is drawn or the caps fire.
            open.push_back(node);
            open.push_back(child);
        }
        tree
    }

    /// Draw `n` complete trees (used for oracle-style evaluation where the
    /// caller picks the sample with the best F1 against a gold tree).
    pub fn sample_many(&mut self, da: &DialogueAct, n: usize) -> Vec<SyntaxTree> {
        (0..n).map(|_| self.sample_tree(da)).collect()
    }
}

impl Planner for SamplingPlanner<'_> {
    fn generate_tree(&mut self, da: &DialogueAct, doc: &mut Document) {
        let tree = match self.ranker {
            None => self.sample_tree(da),
            Some(ranker) => {
                let n = self.config.samples_per_da.max(1);
                self.sample_many(da, n)
                    .into_iter()
                    .map(|t| (ranker.score_tree(&t, da), t))
                    .max_by(|(a, _), (b, _)| a.total_cmp(b))
                    .map(|(_, t)| t)
                    .expect("at least one sample")
            }
        };
        doc.append(tree);
    }
}
