//! Per-image embedding with per-item results.

use std::path::Path;

use rayon::prelude::*;
use stylematch_core::{CoreError, EmbeddingVector, ImageEmbedder};

/// Embeds and normalizes one image.
///
/// This is the only path from an image to an [`EmbeddingVector`], shared by
/// index builds and queries so both sides use the same normalization.
pub fn embed_one<E>(embedder: &E, path: &Path) -> stylematch_core::Result<EmbeddingVector>
where
    E: ImageEmbedder + ?Sized,
{
    let raw = embedder.embed_path(path)?;
    if raw.len() != embedder.dimension() {
        return Err(CoreError::DimensionMismatch {
            expected: embedder.dimension(),
            actual: raw.len(),
        });
    }
    EmbeddingVector::normalized(raw)
}

/// Embeds every path, returning one result per input in input order.
///
/// With `parallel` the work runs on the rayon pool; results are still
/// collected by input position.
pub fn embed_batch<E, P>(
    embedder: &E,
    paths: &[P],
    parallel: bool,
) -> Vec<stylematch_core::Result<EmbeddingVector>>
where
    E: ImageEmbedder + ?Sized,
    P: AsRef<Path> + Sync,
{
    if parallel {
        paths
            .par_iter()
            .map(|p| embed_one(embedder, p.as_ref()))
            .collect()
    } else {
        paths.iter().map(|p| embed_one(embedder, p.as_ref())).collect()
    }
}
