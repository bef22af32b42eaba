//! End-to-end pipeline through the CLI: train every model, then generate
//! with both planners and evaluate.

use frasear::candgen::CandidateGenerator;
use frasear::cli::{parse_args, run_command};
use frasear::io::{read_trees, write_document, Document};
use frasear::tree::{AttachSide, NodeLabel, SyntaxTree};
use std::fs;
use std::path::Path;

fn label(lemma: &str) -> NodeLabel {
    NodeLabel::new(lemma, "x")
}

fn chain(lemmas: &[&str]) -> SyntaxTree {
    let mut tree = SyntaxTree::new();
    let mut parent = tree.root();
    for lemma in lemmas {
        parent = tree.add_child(parent, AttachSide::Right, label(lemma));
    }
    tree
}

fn run(args: &[&str]) {
    let mut full = vec!["frasear"];
    full.extend_from_slice(args);
    full.push("--quiet");
    let cli = parse_args(full).unwrap();
    run_command(cli).unwrap();
}

fn write_corpus(dir: &Path) -> (String, String) {
    let das_path = dir.join("train.das");
    fs::write(
        &das_path,
        "# toy corpus\ninform(food=chinese)\ninform(food=chinese)\ninform(food=chinese)\n",
    )
    .unwrap();

    let mut doc = Document::new();
    doc.append(chain(&["chinese"]));
    doc.append(chain(&["be", "chinese"]));
    doc.append(chain(&["chinese"]));
    let trees_path = dir.join("train_trees.yaml");
    write_document(&trees_path, &doc).unwrap();

    (
        das_path.to_str().unwrap().to_string(),
        trees_path.to_str().unwrap().to_string(),
    )
}

#[test]
fn full_pipeline_trains_and_generates() {
    let dir = tempfile::tempdir().unwrap();
    let (das, trees) = write_corpus(dir.path());

    let candgen_model = dir.path().join("candgen.json");
    let candgen_model = candgen_model.to_str().unwrap();
    run(&["candgen-train", &das, &trees, candgen_model]);
    let candgen = CandidateGenerator::load(candgen_model).unwrap();
    assert!(candgen.context_count() > 0);

    // Local ranker: extract data, then fit.
    let logistic_cfg = dir.path().join("logistic.yaml");
    fs::write(&logistic_cfg, "passes: 30\n").unwrap();
    let logistic_cfg = logistic_cfg.to_str().unwrap();
    let rank_data = dir.path().join("rank.data");
    let rank_data = rank_data.to_str().unwrap();
    let logistic_model = dir.path().join("logistic.json");
    let logistic_model = logistic_model.to_str().unwrap();
    run(&["rank-data", &das, &trees, candgen_model, logistic_cfg, rank_data]);
    run(&["rank-train", logistic_cfg, rank_data, logistic_model]);

    // Global ranker.
    let percrank_cfg = dir.path().join("percrank.yaml");
    fs::write(
        &percrank_cfg,
        "epochs: 5\nsearch:\n  max_tree_size: 4\n  max_depth: 3\n",
    )
    .unwrap();
    let percrank_cfg = percrank_cfg.to_str().unwrap();
    let percrank_model = dir.path().join("percrank.json");
    let percrank_model = percrank_model.to_str().unwrap();
    run(&[
        "percrank-train",
        "-c",
        candgen_model,
        percrank_cfg,
        &das,
        &trees,
        percrank_model,
    ]);

    // Sampling generation with reranking.
    let sampled = dir.path().join("sampled.yaml");
    let sampled = sampled.to_str().unwrap();
    run(&[
        "sample-gen",
        "-n",
        "3",
        "-r",
        logistic_model,
        "-w",
        sampled,
        candgen_model,
        &das,
    ]);
    let sampled_trees = read_trees(sampled).unwrap();
    assert_eq!(sampled_trees.len(), 3);

    // A* generation with evaluation against the training trees, bounded
    // the same way the ranker was trained.
    let astar_cfg = dir.path().join("astar.yaml");
    fs::write(&astar_cfg, "max_tree_size: 4\nmax_depth: 3\n").unwrap();
    let astar_cfg = astar_cfg.to_str().unwrap();
    let out = dir.path().join("out.yaml");
    let out = out.to_str().unwrap();
    run(&[
        "asearch-gen",
        "-e",
        &trees,
        "-w",
        out,
        "-c",
        astar_cfg,
        candgen_model,
        percrank_model,
        &das,
    ]);
    let generated = read_trees(out).unwrap();
    assert_eq!(generated.len(), 3);
    // Every generated tree covers the act: the slot value must be realized.
    for tree in &generated {
        assert!(tree
            .non_root_ids()
            .any(|id| tree.node(id).label.lemma == "chinese"));
    }
}

#[test]
fn percrank_train_without_candgen_model_fits_one_from_the_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let (das, trees) = write_corpus(dir.path());

    let percrank_cfg = dir.path().join("percrank.yaml");
    fs::write(&percrank_cfg, "epochs: 3\n").unwrap();
    let percrank_cfg = percrank_cfg.to_str().unwrap();
    let percrank_model = dir.path().join("percrank.json");
    let percrank_model = percrank_model.to_str().unwrap();
    run(&["percrank-train", percrank_cfg, &das, &trees, percrank_model]);
    assert!(Path::new(percrank_model).exists());
}

#[test]
fn oracle_sampling_emits_every_sample() {
    let dir = tempfile::tempdir().unwrap();
    let (das, trees) = write_corpus(dir.path());

    let candgen_model = dir.path().join("candgen.json");
    let candgen_model = candgen_model.to_str().unwrap();
    run(&["candgen-train", &das, &trees, candgen_model]);

    let sampled = dir.path().join("oracle.yaml");
    let sampled = sampled.to_str().unwrap();
    run(&[
        "sample-gen",
        "-n",
        "4",
        "-o",
        &trees,
        "-w",
        sampled,
        candgen_model,
        &das,
    ]);
    // Three acts, four samples each.
    assert_eq!(read_trees(sampled).unwrap().len(), 12);
}
