//! Best-first search over partial trees.
//!
//! Search states are scored partial trees: a tree under construction, the
//! cumulative log-probability of its expansion history under the candidate
//! generator, the ranker's score as a learned heuristic, and the residual
//! (not-yet-covered) part of the dialogue act. Priority is
//! `cost = -log_prob - heuristic`, popped lowest-cost first; ties break
//! first-in-first-out so runs are deterministic. The heuristic is learned
//! and unconstrained in sign, so no admissibility claim is made: the first
//! goal popped is best under the cost function among states explored, which
//! is the guarantee the evaluation relies on.
//!
//! Search never fails: when the frontier empties or the iteration budget
//! runs out before a goal is found, the lowest-cost state seen so far is
//! returned and flagged as a fallback.

use super::trace::{TraceEvent, TraceKind, TraceSink};
use super::Planner;
use crate::candgen::CandidateGenerator;
use crate::config::AStarConfig;
use crate::da::DialogueAct;
use crate::eval::{f1_from_counts, tp_fp_fn};
use crate::io::Document;
use crate::rank::Ranker;
use crate::tree::{NodeId, SyntaxTree};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// How generation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A goal state (full dialogue-act coverage) was popped.
    Goal,
    /// The frontier starved or the budget ran out; best-so-far returned.
    Fallback,
}

/// Result of one A* generation run.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub tree: SyntaxTree,
    /// Cost of the returned state.
    pub cost: f64,
    pub outcome: GenerationOutcome,
    /// Frontier pops performed.
    pub iterations: usize,
    /// Best node-F1 against the gold tree over all popped states; only
    /// tracked in oracle mode, never used for search decisions.
    pub oracle_best_f1: Option<f64>,
}

struct SearchState {
    tree: SyntaxTree,
    log_prob: f64,
    heuristic: f64,
    residual: DialogueAct,
}

impl SearchState {
    fn cost(&self) -> f64 {
        -self.log_prob - self.heuristic
    }

    fn is_goal(&self) -> bool {
        self.residual.is_empty()
    }

    fn signature(&self) -> String {
        format!("{}#{}", self.tree.signature(), self.residual.signature())
    }
}

struct FrontierEntry {
    cost: f64,
    seq: u64,
    state: SearchState,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // BinaryHeap pops the maximum; reverse both comparisons so the lowest
    // cost pops first and equal costs pop in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn emit(
    trace: &mut Option<&mut (dyn TraceSink + '_)>,
    kind: TraceKind,
    state: &SearchState,
    successors: usize,
) {
    if let Some(sink) = trace.as_deref_mut() {
        sink.event(&TraceEvent {
            kind,
            cost: state.cost(),
            log_prob: state.log_prob,
            heuristic: state.heuristic,
            tree_size: state.tree.len(),
            residual: state.residual.len(),
            successors,
        });
    }
}

/// Nodes that may still receive children under the size/depth policy.
fn open_nodes(tree: &SyntaxTree, config: &AStarConfig) -> Vec<NodeId> {
    if tree.len() >= config.max_tree_size {
        return Vec::new();
    }
    tree.nodes()
        .filter(|n| tree.depth(n.id) < config.max_depth)
        .map(|n| n.id)
        .collect()
}

/// Run one best-first generation for `da`.
///
/// With `gold` supplied, the best node-F1 over popped states is tracked for
/// reporting (oracle mode); it never affects search order.
pub fn astar_search(
    candgen: &CandidateGenerator,
    ranker: &dyn Ranker,
    config: &AStarConfig,
    da: &DialogueAct,
    gold: Option<&SyntaxTree>,
    mut trace: Option<&mut (dyn TraceSink + '_)>,
) -> SearchResult {
    let mut frontier = BinaryHeap::new();
    let mut closed: HashSet<String> = HashSet::new();
    let mut seq = 0u64;

    let root_tree = SyntaxTree::new();
    let root = SearchState {
        heuristic: ranker.score_tree(&root_tree, da),
        tree: root_tree,
        log_prob: 0.0,
        residual: da.clone(),
    };
    frontier.push(FrontierEntry {
        cost: root.cost(),
        seq,
        state: root,
    });

    let mut best: Option<(f64, SyntaxTree)> = None;
    let mut oracle_best: Option<f64> = None;
    let mut iterations = 0usize;

    while let Some(entry) = frontier.pop() {
        let state = entry.state;

        // Structurally identical states reached via different derivations
        // are expanded once.
        if !closed.insert(state.signature()) {
            continue;
        }

        emit(&mut trace, TraceKind::Pop, &state, 0);

        if let Some(gold_tree) = gold {
            let counts = tp_fp_fn(gold_tree, &state.tree);
            let f1 = f1_from_counts(counts.correct, counts.gold, counts.predicted);
            if oracle_best.is_none_or(|b| f1 > b) {
                oracle_best = Some(f1);
            }
        }

        let cost = state.cost();
        if best.as_ref().is_none_or(|(c, _)| cost < *c) {
            best = Some((cost, state.tree.clone()));
        }

        if state.is_goal() {
            emit(&mut trace, TraceKind::Goal, &state, 0);
            return SearchResult {
                tree: state.tree,
                cost,
                outcome: GenerationOutcome::Goal,
                iterations,
                oracle_best_f1: oracle_best,
            };
        }

        iterations += 1;
        if iterations >= config.max_iterations {
            emit(&mut trace, TraceKind::Fallback, &state, 0);
            break;
        }

        let mut pushed = 0usize;
        for node in open_nodes(&state.tree, config) {
            let parent_label = state.tree.node(node).label.clone();
            for cand in candgen.get_candidates(&parent_label, da) {
                // Only attach lemmas compatible with what is still
                // uncovered; slot content the residual no longer asks for
                // would be a spurious repetition.
                if !candgen.lemma_compatible(&cand.label.lemma, &state.residual) {
                    continue;
                }
                let (tree, _) = state.tree.with_child(node, cand.side, cand.label.clone());
                let successor = SearchState {
                    log_prob: state.log_prob + cand.probability.ln(),
                    heuristic: ranker.score_tree(&tree, da),
                    residual: state.residual.remove_covered(&cand.label.lemma),
                    tree,
                };
                if closed.contains(&successor.signature()) {
                    continue;
                }
                seq += 1;
                frontier.push(FrontierEntry {
                    cost: successor.cost(),
                    seq,
                    state: successor,
                });
                pushed += 1;
            }
        }
        emit(&mut trace, TraceKind::Expand, &state, pushed);
    }

    // Frontier exhausted or budget hit without a goal. The search always
    // produces some tree; at minimum the root-only state was popped.
    let (cost, tree) = best.unwrap_or_else(|| (0.0, SyntaxTree::new()));
    SearchResult {
        tree,
        cost,
        outcome: GenerationOutcome::Fallback,
        iterations,
        oracle_best_f1: oracle_best,
    }
}

/// Best-first planner over fitted, read-only models.
pub struct AStarPlanner<'a> {
    candgen: &'a CandidateGenerator,
    ranker: &'a dyn Ranker,
    config: AStarConfig,
    trace: Option<&'a mut dyn TraceSink>,
}

impl<'a> AStarPlanner<'a> {
    #[must_use]
    pub fn new(candgen: &'a CandidateGenerator, ranker: &'a dyn Ranker, config: AStarConfig) -> Self {
        Self {
            candgen,
            ranker,
            config,
            trace: None,
        }
    }

    /// Attach a debug sink receiving one event per pop/expand.
    #[must_use]
    pub fn with_trace(mut self, trace: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Generate one tree, optionally tracking oracle F1 against a gold tree.
    pub fn generate(&mut self, da: &DialogueAct, gold: Option<&SyntaxTree>) -> SearchResult {
        astar_search(
            self.candgen,
            self.ranker,
            &self.config,
            da,
            gold,
            self.trace.as_deref_mut(),
        )
    }
}

impl Planner for AStarPlanner<'_> {
    fn generate_tree(&mut self, da: &DialogueAct, doc: &mut Document) {
        let result = self.generate(da, None);
        doc.append(result.tree);
    }
}
