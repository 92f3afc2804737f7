pub mod catalog;
pub mod crop;
pub mod embedding;
pub mod result;

pub use catalog::{CatalogEntry, SkippedImage};
pub use crop::{CropName, DetectionCrop};
pub use embedding::EmbeddingVector;
pub use result::{MatchResult, MatchTier};
