//! Crate-wide error taxonomy.
//!
//! Only the variants here are fatal and abort the current action. Non-fatal
//! conditions (a training run that plateaued, a search that fell back to its
//! best-so-far state) are reported in-band on the relevant result structs,
//! never as errors: every dialogue act yields a tree unless a fatal error
//! occurs.

use thiserror::Error;

/// Errors produced by training, model I/O and corpus handling.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing required configuration option.
    #[error("configuration error: {0}")]
    Config(String),

    /// Misaligned corpora or a malformed dialogue-act/tree record.
    #[error("data mismatch: {0}")]
    DataMismatch(String),

    /// A model file failed schema or version validation at load time.
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    /// Loss or weights became non-finite during training.
    #[error("training diverged: {0}")]
    DivergentTraining(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for frasear operations.
pub type Result<T> = std::result::Result<T, Error>;
