//! Corpus reading and generated-document writing.
//!
//! Dialogue-act corpora are plain text, one act per line (`#` comments and
//! blank lines skipped). Tree corpora and generated documents are YAML
//! sequences of trees. Alignment between a DA corpus and a tree corpus is by
//! position; it is the callers' contract, validated by the training code.

use crate::da::DialogueAct;
use crate::tree::SyntaxTree;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// An ordered, append-only collection of generated trees.
///
/// Planners append exactly one tree per `generate_tree` call, so repeated
/// calls build an output corpus aligned with the input dialogue acts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    trees: Vec<SyntaxTree>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, tree: SyntaxTree) {
        self.trees.push(tree);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    #[must_use]
    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }
}

/// Read a dialogue-act corpus: one act per line.
pub fn read_das(path: impl AsRef<Path>) -> Result<Vec<DialogueAct>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut das = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let da = DialogueAct::parse(trimmed).map_err(|e| {
            Error::DataMismatch(format!("{}:{}: {e}", path.display(), lineno + 1))
        })?;
        das.push(da);
    }
    Ok(das)
}

/// Read a YAML tree corpus.
pub fn read_trees(path: impl AsRef<Path>) -> Result<Vec<SyntaxTree>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    serde_yaml::from_reader(file)
        .map_err(|e| Error::Serialization(format!("{}: {e}", path.display())))
}

/// Write a generated document as a YAML tree sequence.
pub fn write_document(path: impl AsRef<Path>, doc: &Document) -> Result<()> {
    let data = serde_yaml::to_string(doc.trees())
        .map_err(|e| Error::Serialization(format!("document serialization failed: {e}")))?;
    let mut file = File::create(path.as_ref())?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{AttachSide, NodeLabel};

    #[test]
    fn test_read_das_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "inform(food=chinese)").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "bye()").unwrap();

        let das = read_das(file.path()).unwrap();
        assert_eq!(das.len(), 2);
        assert_eq!(das[0].items()[0].slot, "food");
    }

    #[test]
    fn test_read_das_reports_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "inform(food=chinese)").unwrap();
        writeln!(file, "broken-line-without-parens").unwrap();

        let err = read_das(file.path()).unwrap_err();
        assert!(matches!(err, Error::DataMismatch(_)));
        assert!(format!("{err}").contains(":2:"));
    }

    #[test]
    fn test_tree_corpus_round_trip() {
        let mut tree = SyntaxTree::new();
        let v = tree.add_child(tree.root(), AttachSide::Right, NodeLabel::new("be", "v:fin"));
        tree.add_child(v, AttachSide::Left, NodeLabel::new("restaurant", "n:subj"));

        let mut doc = Document::new();
        doc.append(tree.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        write_document(&path, &doc).unwrap();

        let trees = read_trees(&path).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0], tree);
    }

    #[test]
    fn test_document_preserves_append_order() {
        let mut doc = Document::new();
        let t1 = SyntaxTree::new();
        let (t2, _) =
            t1.with_child(t1.root(), AttachSide::Right, NodeLabel::new("a", "x"));
        doc.append(t1.clone());
        doc.append(t2.clone());
        assert_eq!(doc.trees(), &[t1, t2]);
    }
}
