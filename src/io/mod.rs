//! Corpus and model persistence.

mod corpus;
mod model;

pub use corpus::{read_das, read_trees, write_document, Document};
pub use model::{load_blob, save_blob, ModelMetadata, FORMAT_VERSION};
