//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frasear: sentence planning for natural language generation
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "frasear")]
#[command(version)]
#[command(about = "Generates deep-syntax dependency trees from dialogue acts")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train the candidate generator (expansion probability model)
    CandgenTrain(CandgenTrainArgs),

    /// Extract training data for the logistic-regression local ranker
    RankData(RankDataArgs),

    /// Train the logistic-regression local ranker
    RankTrain(RankTrainArgs),

    /// Train the structured-perceptron global ranker
    PercrankTrain(PercrankTrainArgs),

    /// Generate by sampling (optionally reranked, optionally oracle-scored)
    SampleGen(SampleGenArgs),

    /// Generate with the A* sentence planner
    AsearchGen(AsearchGenArgs),
}

/// Arguments for candgen-train
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CandgenTrainArgs {
    /// Training dialogue acts (one per line)
    #[arg(value_name = "TRAIN_DAS")]
    pub train_das: PathBuf,

    /// Training trees (YAML)
    #[arg(value_name = "TRAIN_TREES")]
    pub train_trees: PathBuf,

    /// Output model path
    #[arg(value_name = "OUT_MODEL")]
    pub output_model: PathBuf,

    /// Discard candidates seen fewer times than this
    #[arg(short, long, default_value_t = 1)]
    pub prune_threshold: u32,
}

/// Arguments for rank-data
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RankDataArgs {
    /// Training dialogue acts
    #[arg(value_name = "TRAIN_DAS")]
    pub train_das: PathBuf,

    /// Training trees (YAML)
    #[arg(value_name = "TRAIN_TREES")]
    pub train_trees: PathBuf,

    /// Trained candidate-generator model
    #[arg(value_name = "CANDGEN_MODEL")]
    pub candgen_model: PathBuf,

    /// Ranker configuration (YAML)
    #[arg(value_name = "RANKER_CONFIG")]
    pub ranker_config: PathBuf,

    /// Output training-data path
    #[arg(value_name = "OUT_DATA")]
    pub output_data: PathBuf,
}

/// Arguments for rank-train
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RankTrainArgs {
    /// Ranker configuration (YAML)
    #[arg(value_name = "RANKER_CONFIG")]
    pub ranker_config: PathBuf,

    /// Extracted training data
    #[arg(value_name = "TRAIN_DATA")]
    pub train_data: PathBuf,

    /// Output model path
    #[arg(value_name = "OUT_MODEL")]
    pub output_model: PathBuf,
}

/// Arguments for percrank-train
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PercrankTrainArgs {
    /// Ranker configuration (YAML)
    #[arg(value_name = "RANKER_CONFIG")]
    pub ranker_config: PathBuf,

    /// Training dialogue acts
    #[arg(value_name = "TRAIN_DAS")]
    pub train_das: PathBuf,

    /// Training trees (YAML)
    #[arg(value_name = "TRAIN_TREES")]
    pub train_trees: PathBuf,

    /// Output model path
    #[arg(value_name = "OUT_MODEL")]
    pub output_model: PathBuf,

    /// Pretrained candidate-generator model; trained from the corpus when
    /// omitted
    #[arg(short, long)]
    pub candgen: Option<PathBuf>,

    /// Write a search debug trace to this file
    #[arg(short, long)]
    pub debug: Option<PathBuf>,
}

/// Arguments for sample-gen
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SampleGenArgs {
    /// Trained candidate-generator model
    #[arg(value_name = "CANDGEN_MODEL")]
    pub candgen_model: PathBuf,

    /// Test dialogue acts
    #[arg(value_name = "TEST_DAS")]
    pub test_das: PathBuf,

    /// Trees sampled per dialogue act
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num_samples: usize,

    /// Local-ranker model used to rerank samples
    #[arg(short, long)]
    pub ranker: Option<PathBuf>,

    /// Gold trees (YAML) for oracle best-of-n F1 evaluation
    #[arg(short, long)]
    pub oracle_eval: Option<PathBuf>,

    /// Write generated trees here (YAML)
    #[arg(short = 'w', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for asearch-gen
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct AsearchGenArgs {
    /// Trained candidate-generator model
    #[arg(value_name = "CANDGEN_MODEL")]
    pub candgen_model: PathBuf,

    /// Trained perceptron-ranker model
    #[arg(value_name = "PERCRANK_MODEL")]
    pub percrank_model: PathBuf,

    /// Test dialogue acts
    #[arg(value_name = "TEST_DAS")]
    pub test_das: PathBuf,

    /// Gold trees (YAML) for node P/R/F1 evaluation
    #[arg(short, long)]
    pub eval: Option<PathBuf>,

    /// Write a search debug trace to this file
    #[arg(short, long)]
    pub debug: Option<PathBuf>,

    /// Write generated trees here (YAML)
    #[arg(short = 'w', long)]
    pub output: Option<PathBuf>,

    /// Planner configuration (YAML); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
