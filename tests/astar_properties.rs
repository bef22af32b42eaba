//! Search-order properties of the best-first planner.

use approx::assert_relative_eq;
use frasear::candgen::CandidateGenerator;
use frasear::config::{AStarConfig, CandGenConfig};
use frasear::da::DialogueAct;
use frasear::planner::{astar_search, GenerationOutcome};
use frasear::rank::Ranker;
use frasear::tree::{AttachSide, NodeLabel, SyntaxTree};

/// Zero heuristic: cost reduces to the negated expansion log-probability.
struct NullRanker;

impl Ranker for NullRanker {
    fn score_tree(&self, _tree: &SyntaxTree, _da: &DialogueAct) -> f64 {
        0.0
    }
}

fn label(lemma: &str) -> NodeLabel {
    NodeLabel::new(lemma, "x")
}

fn da(text: &str) -> DialogueAct {
    DialogueAct::parse(text).unwrap()
}

fn chain(lemmas: &[&str]) -> SyntaxTree {
    let mut tree = SyntaxTree::new();
    let mut parent = tree.root();
    for lemma in lemmas {
        parent = tree.add_child(parent, AttachSide::Right, label(lemma));
    }
    tree
}

fn trained_candgen(trees: &[SyntaxTree], d: &DialogueAct) -> CandidateGenerator {
    let das = vec![d.clone(); trees.len()];
    let mut candgen = CandidateGenerator::new(CandGenConfig::default());
    candgen.train(&das, trees).unwrap();
    candgen
}

#[test]
fn deeper_goal_wins_when_its_path_is_more_probable() {
    // Root expands to "chinese" (1/3) or "be" (2/3); "be" always continues
    // to "chinese". The one-node goal costs -ln(1/3) = 1.10 while the
    // two-node goal costs -ln(2/3) = 0.41, so best-first search must return
    // the deeper tree even though a goal is reachable in a single expansion.
    let d = da("inform(food=chinese)");
    let corpus = vec![
        chain(&["chinese"]),
        chain(&["be", "chinese"]),
        chain(&["be", "chinese"]),
    ];
    let candgen = trained_candgen(&corpus, &d);

    let result = astar_search(
        &candgen,
        &NullRanker,
        &AStarConfig::default(),
        &d,
        None,
        None,
    );
    assert_eq!(result.outcome, GenerationOutcome::Goal);
    assert_eq!(result.tree, chain(&["be", "chinese"]));
    assert_relative_eq!(result.cost, -(2.0f64 / 3.0).ln(), epsilon = 1e-9);
}

#[test]
fn goal_cost_is_minimal_over_enumerable_goal_trees() {
    // Every goal tree this grammar can produce is a chain prefix of
    // be* chinese; brute-force their costs and check the search found the
    // cheapest one.
    let d = da("inform(food=chinese)");
    let corpus = vec![
        chain(&["chinese"]),
        chain(&["be", "chinese"]),
        chain(&["be", "be", "chinese"]),
    ];
    let candgen = trained_candgen(&corpus, &d);

    let mut brute_best = f64::INFINITY;
    for be_count in 0..4usize {
        let lemmas: Vec<&str> = std::iter::repeat("be")
            .take(be_count)
            .chain(std::iter::once("chinese"))
            .collect();
        let tree = chain(&lemmas);
        let cost = -candgen.tree_log_prob(&tree, &d);
        if cost < brute_best {
            brute_best = cost;
        }
    }

    let result = astar_search(
        &candgen,
        &NullRanker,
        &AStarConfig::default(),
        &d,
        None,
        None,
    );
    assert_eq!(result.outcome, GenerationOutcome::Goal);
    assert_relative_eq!(result.cost, brute_best, epsilon = 1e-9);
}

#[test]
fn search_without_reachable_goal_returns_fallback_tree() {
    // The grammar only produces "be", which covers nothing of the act, so
    // no goal exists inside the size/depth bounds. The search must still
    // return a tree and flag the fallback.
    let d = da("inform(food=chinese)");
    let corpus = vec![chain(&["be"]), chain(&["be", "be"])];
    let candgen = trained_candgen(&corpus, &d);

    let config = AStarConfig {
        max_iterations: 50,
        max_tree_size: 4,
        max_depth: 3,
    };
    let result = astar_search(&candgen, &NullRanker, &config, &d, None, None);
    assert_eq!(result.outcome, GenerationOutcome::Fallback);
    assert!(result.tree.len() >= 1);
    assert!(result.iterations <= 50);
}

#[test]
fn oracle_mode_tracks_best_f1_without_changing_the_result() {
    let d = da("inform(food=chinese)");
    let corpus = vec![chain(&["chinese"]), chain(&["chinese"])];
    let candgen = trained_candgen(&corpus, &d);
    let gold = chain(&["chinese"]);

    let plain = astar_search(
        &candgen,
        &NullRanker,
        &AStarConfig::default(),
        &d,
        None,
        None,
    );
    let oracle = astar_search(
        &candgen,
        &NullRanker,
        &AStarConfig::default(),
        &d,
        Some(&gold),
        None,
    );
    assert_eq!(plain.tree, oracle.tree);
    assert_eq!(oracle.oracle_best_f1, Some(1.0));
    assert_eq!(plain.oracle_best_f1, None);
}
