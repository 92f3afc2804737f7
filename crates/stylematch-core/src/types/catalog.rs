use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Catalog metadata for one indexed image.
///
/// `id_map[i]` describes the vector at position `i` of the index. A product
/// usually owns several images, so `product_id` repeats across entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Product identifier (the catalog subdirectory name).
    pub product_id: String,

    /// Image file name inside the product directory.
    pub image_file: String,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(product_id: impl Into<String>, image_file: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            image_file: image_file.into(),
        }
    }
}

/// An image that was skipped during a batch run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}
