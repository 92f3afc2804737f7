use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting or scoring embeddings.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The image could not be opened or decoded. Recoverable per item.
    #[error("failed to decode image {}: {reason}", path.display())]
    ImageDecode {
        /// Path of the offending image.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The model weights could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The model inference failed.
    #[error("inference error: {0}")]
    Inference(String),

    /// Candle ML framework error.
    #[error("ML inference error: {0}")]
    Candle(String),

    /// A vector did not have the dimension the model or index expects.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the model or index.
        expected: usize,
        /// Dimension actually observed.
        actual: usize,
    },

    /// The raw embedding has zero norm or non-finite components.
    #[error("embedding cannot be normalized: {0}")]
    DegenerateEmbedding(String),

    /// The match thresholds are out of range or out of order.
    #[error("invalid match thresholds: {0}")]
    InvalidThresholds(String),
}

impl From<candle_core::Error> for CoreError {
    fn from(err: candle_core::Error) -> Self {
        CoreError::Candle(err.to_string())
    }
}

/// Result type alias for stylematch core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = CoreError::ImageDecode {
            path: PathBuf::from("catalog/P1/broken.jpg"),
            reason: "unexpected EOF".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("catalog/P1/broken.jpg"));
        assert!(msg.contains("unexpected EOF"));

        let err = CoreError::DimensionMismatch {
            expected: 512,
            actual: 768,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 512, got 768"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
