//! Frasear: sentence planning for natural language generation.
//!
//! Generates deep-syntax dependency trees realizing dialogue acts (sets of
//! intent/slot/value triples). The pipeline has three learned pieces and two
//! planners on top of them:
//!
//! - [`candgen::CandidateGenerator`] — an empirical expansion model trained
//!   by counting, answering "what child can attach under this parent, given
//!   this dialogue act".
//! - [`rank::LocalRanker`] — a logistic-regression scorer for a single
//!   expansion step in isolation.
//! - [`rank::GlobalRanker`] — a structured perceptron that ranks whole
//!   candidate trees against gold trees.
//! - [`planner::SamplingPlanner`] — stochastic rollout generation with
//!   optional reranking.
//! - [`planner::AStarPlanner`] — best-first search over partial trees,
//!   guided by the candidate model's log-probability and the global
//!   ranker's score.
//!
//! Trained models are immutable after fitting; all inference entry points
//! take `&self`, so independent dialogue acts may be generated concurrently
//! from shared models.

pub mod candgen;
pub mod cli;
pub mod config;
pub mod da;
pub mod error;
pub mod eval;
pub mod io;
pub mod planner;
pub mod rank;
pub mod tree;

pub use error::{Error, Result};
