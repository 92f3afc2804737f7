//! # Embedding Extraction
//!
//! Maps images to fixed-length dense vectors. The extractor is a capability
//! object: callers construct it once (model loading is the expensive part)
//! and hand a reference to both the index builder and the match engine.

pub mod clip;

use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::error::{CoreError, Result};

pub use clip::{ClipEmbedder, EmbedderConfig};

/// An image-to-vector model.
///
/// Implementations return the raw model output. Normalization is applied by
/// the caller through [`crate::EmbeddingVector::normalized`] so index build
/// and query use the same routine.
pub trait ImageEmbedder: Send + Sync {
    /// Model identifier, recorded in persisted indexes.
    fn model_name(&self) -> &str;

    /// Length of every vector this model produces.
    fn dimension(&self) -> usize;

    /// Embeds an already decoded RGB image.
    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>>;

    /// Decodes the image at `path` and embeds it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ImageDecode` naming `path` if the file cannot be
    /// read or decoded.
    fn embed_path(&self, path: &Path) -> Result<Vec<f32>> {
        let image = load_rgb_image(path)?;
        tracing::debug!(path = %path.display(), "embedding image");
        self.embed_image(&image)
    }
}

/// Opens and fully decodes an image, converted to 8-bit RGB.
///
/// The format is sniffed from the file contents, falling back to the
/// extension. A full decode doubles as the integrity check for truncated or
/// corrupt downloads.
pub fn load_rgb_image(path: &Path) -> Result<DynamicImage> {
    let decode_err = |reason: String| CoreError::ImageDecode {
        path: path.to_path_buf(),
        reason,
    };

    let image = ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))?;

    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}
