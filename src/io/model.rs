//! Versioned model blobs.
//!
//! Every trained model (candidate generator, local ranker, global ranker) is
//! persisted as one JSON blob: a metadata header plus a model-specific
//! payload. Loading validates the header and fails with
//! [`Error::CorruptModel`] on any schema, kind or version mismatch instead
//! of failing obscurely inside payload deserialization.
//!
//! Writes go to a temporary file in the target directory which is renamed
//! into place, so an interrupted save never leaves a truncated model file.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Header identifying a persisted model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model kind tag, e.g. `"candgen"`, `"logistic-ranker"`,
    /// `"perceptron-ranker"`.
    pub kind: String,
    pub format_version: u32,
    pub created: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct ModelBlob<T> {
    meta: ModelMetadata,
    payload: T,
}

/// Serialize `payload` as a versioned blob of the given kind.
pub fn save_blob<T: Serialize>(path: impl AsRef<Path>, kind: &str, payload: &T) -> Result<()> {
    let path = path.as_ref();
    let blob = ModelBlob {
        meta: ModelMetadata {
            kind: kind.to_string(),
            format_version: FORMAT_VERSION,
            created: Utc::now(),
        },
        payload,
    };
    let data = serde_json::to_string_pretty(&blob)
        .map_err(|e| Error::Serialization(format!("model serialization failed: {e}")))?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    tmp.write_all(data.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Load a blob of the expected kind, validating the header first.
pub fn load_blob<T: DeserializeOwned>(path: impl AsRef<Path>, kind: &str) -> Result<T> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;

    // Validate the header before touching the payload so a wrong-kind or
    // wrong-version file is reported as such, not as a payload schema error.
    #[derive(Deserialize)]
    struct HeaderOnly {
        meta: ModelMetadata,
    }
    let header: HeaderOnly = serde_json::from_str(&data).map_err(|e| {
        Error::CorruptModel(format!("{}: unreadable model header: {e}", path.display()))
    })?;
    if header.meta.kind != kind {
        return Err(Error::CorruptModel(format!(
            "{}: model kind is '{}', expected '{}'",
            path.display(),
            header.meta.kind,
            kind
        )));
    }
    if header.meta.format_version != FORMAT_VERSION {
        return Err(Error::CorruptModel(format!(
            "{}: format version {} unsupported (expected {})",
            path.display(),
            header.meta.format_version,
            FORMAT_VERSION
        )));
    }

    let blob: ModelBlob<T> = serde_json::from_str(&data).map_err(|e| {
        Error::CorruptModel(format!("{}: malformed model payload: {e}", path.display()))
    })?;
    Ok(blob.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let payload: HashMap<String, u32> = [("a".to_string(), 1)].into_iter().collect();

        save_blob(&path, "candgen", &payload).unwrap();
        let loaded: HashMap<String, u32> = load_blob(&path, "candgen").unwrap();
        assert_eq!(loaded, payload);
    }

    #[test]
    fn test_kind_mismatch_is_corrupt_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_blob(&path, "candgen", &vec![1u32]).unwrap();

        let err = load_blob::<Vec<u32>>(&path, "perceptron-ranker").unwrap_err();
        assert!(matches!(err, Error::CorruptModel(_)));
    }

    #[test]
    fn test_garbage_file_is_corrupt_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = load_blob::<Vec<u32>>(&path, "candgen").unwrap_err();
        assert!(matches!(err, Error::CorruptModel(_)));
    }

    #[test]
    fn test_version_mismatch_is_corrupt_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let data = serde_json::json!({
            "meta": {"kind": "candgen", "format_version": 99,
                     "created": "2020-01-01T00:00:00Z"},
            "payload": [1],
        });
        std::fs::write(&path, data.to_string()).unwrap();

        let err = load_blob::<Vec<u32>>(&path, "candgen").unwrap_err();
        assert!(matches!(err, Error::CorruptModel(_)));
        assert!(format!("{err}").contains("99"));
    }
}
