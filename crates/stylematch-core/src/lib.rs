//! # Stylematch Core
//!
//! The leaf layer of the stylematch catalog matcher. Provides the image
//! embedding extractor, the normalized vector types shared by index building
//! and querying, and the similarity-to-tier scoring model.
//!
//! ## Quick Start
//!
//! ```rust
//! use stylematch_core::{EmbeddingVector, MatchThresholds, MatchTier};
//!
//! let a = EmbeddingVector::normalized(vec![3.0, 4.0]).unwrap();
//! let b = EmbeddingVector::normalized(vec![6.0, 8.0]).unwrap();
//!
//! let score = a.dot(&b);
//! assert!((score - 1.0).abs() < 1e-6);
//! assert_eq!(MatchThresholds::default().classify(score), MatchTier::Exact);
//! ```
pub mod embed;
pub mod error;
pub mod scoring;
pub mod types;

// Re-export primary API
pub use embed::{ClipEmbedder, EmbedderConfig, ImageEmbedder, load_rgb_image};
pub use error::{CoreError, Result};
pub use scoring::MatchThresholds;
pub use types::{
    CatalogEntry, CropName, DetectionCrop, EmbeddingVector, MatchResult, MatchTier, SkippedImage,
};
