//! # Stylematch
//!
//! Matches detection crops taken from video frames against a catalog of
//! product images with CLIP embeddings.
//!
//! This crate re-exports the public API of [`stylematch_core`] (embedding,
//! vector and scoring types) and [`stylematch_vecdb`] (index building,
//! persistence and matching).

pub use stylematch_core::{
    CatalogEntry, ClipEmbedder, CoreError, DetectionCrop, EmbedderConfig, EmbeddingVector,
    ImageEmbedder, MatchResult, MatchThresholds, MatchTier, SkippedImage,
};
pub use stylematch_vecdb::{
    BuildConfig, BuildSummary, IndexedCatalog, MatchConfig, MatchEngine, MatchRun, MatchSummary,
    VecDbError, build_index, load_catalog, match_all, run_match_job, write_results,
};
