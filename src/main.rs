//! Frasear CLI
//!
//! Sentence-planning entry point for the frasear library.
//!
//! # Usage
//!
//! ```bash
//! # Train the candidate generator
//! frasear candgen-train train.das train.yaml candgen.json
//!
//! # Extract local-ranker training data, then train the ranker
//! frasear rank-data train.das train.yaml candgen.json ranker.yaml rank.data
//! frasear rank-train ranker.yaml rank.data logistic.json
//!
//! # Train the global (perceptron) ranker
//! frasear percrank-train percrank.yaml train.das train.yaml percrank.json
//!
//! # Generate by sampling
//! frasear sample-gen -n 5 -r logistic.json -w out.yaml candgen.json test.das
//!
//! # Generate with A* search and evaluate against gold trees
//! frasear asearch-gen -e gold.yaml -w out.yaml candgen.json percrank.json test.das
//! ```

use clap::Parser;
use frasear::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
