use std::path::PathBuf;

use stylematch_core::CoreError;
use thiserror::Error;

/// Errors raised while building, persisting, loading or querying a catalog
/// index.
#[derive(Debug, Error)]
pub enum VecDbError {
    /// No catalog image could be embedded; nothing was written.
    #[error("no usable catalog images under {}", root.display())]
    EmptyCatalog {
        /// Catalog root that was scanned.
        root: PathBuf,
    },

    /// The persisted index or id_map is missing or unreadable.
    #[error("catalog index not found at {}: {reason}", path.display())]
    IndexNotFound {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Index and id_map disagree on the number of entries.
    #[error("index holds {vectors} vectors but id_map holds {entries} entries")]
    SchemaMismatch {
        /// Number of vectors in the index.
        vectors: usize,
        /// Number of id_map entries.
        entries: usize,
    },

    /// The catalog or crops directory does not have the expected shape.
    #[error("malformed directory layout at {}: {reason}", path.display())]
    Layout {
        /// Offending path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The index could not be serialized.
    #[error("index serialization error: {0}")]
    Serialize(String),

    /// Embedding or scoring error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for stylematch vecdb operations.
pub type Result<T> = std::result::Result<T, VecDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = VecDbError::SchemaMismatch {
            vectors: 10,
            entries: 9,
        };
        assert_eq!(
            err.to_string(),
            "index holds 10 vectors but id_map holds 9 entries"
        );

        let err = VecDbError::IndexNotFound {
            path: PathBuf::from("store/catalog.safetensors"),
            reason: "No such file or directory".into(),
        };
        assert!(err.to_string().contains("store/catalog.safetensors"));
    }

    #[test]
    fn core_errors_pass_through() {
        let err: VecDbError = CoreError::DimensionMismatch {
            expected: 512,
            actual: 4,
        }
        .into();
        assert!(err.to_string().contains("expected 512"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VecDbError>();
    }
}
