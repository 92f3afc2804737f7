//! # Match Engine
//!
//! Loads a persisted catalog once and resolves every detection crop to its
//! nearest catalog image, tiered by [`MatchThresholds`].
//!
//! [`MatchThresholds`]: stylematch_core::MatchThresholds

use std::fs;
use std::path::Path;

use serde::Serialize;
use stylematch_core::{
    CoreError, DetectionCrop, EmbeddingVector, ImageEmbedder, MatchResult, MatchTier, SkippedImage,
};
use tracing::{debug, info, warn};

use crate::batch::embed_one;
use crate::config::MatchConfig;
use crate::error::{Result, VecDbError};
use crate::index::{IndexedCatalog, Neighbor};
use crate::layout::{Scan, scan_crops};
use crate::store::{load_catalog, write_atomic};

/// Results of matching a crops tree.
#[derive(Debug, Clone, Default)]
pub struct MatchRun {
    /// One result per successfully embedded crop, in enumeration order.
    pub results: Vec<MatchResult>,
    /// Crops that could not be embedded.
    pub skipped: Vec<SkippedImage>,
}

impl MatchRun {
    /// Number of results in `tier`.
    #[must_use]
    pub fn count(&self, tier: MatchTier) -> usize {
        self.results.iter().filter(|r| r.match_type == tier).count()
    }
}

/// Counts reported by [`run_match_job`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub matched: usize,
    pub exact: usize,
    pub similar: usize,
    pub no_match: usize,
    pub skipped: usize,
}

impl From<&MatchRun> for MatchSummary {
    fn from(run: &MatchRun) -> Self {
        Self {
            matched: run.results.len(),
            exact: run.count(MatchTier::Exact),
            similar: run.count(MatchTier::Similar),
            no_match: run.count(MatchTier::NoMatch),
            skipped: run.skipped.len(),
        }
    }
}

/// Nearest-neighbor matcher over a loaded catalog.
pub struct MatchEngine<'a, E: ImageEmbedder + ?Sized> {
    embedder: &'a E,
    catalog: IndexedCatalog,
    config: MatchConfig,
}

impl<'a, E: ImageEmbedder + ?Sized> MatchEngine<'a, E> {
    /// Loads the catalog in `index_dir` and checks it against `embedder`.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::IndexNotFound` or `VecDbError::SchemaMismatch`
    /// from loading, and `CoreError::DimensionMismatch` if the embedder and
    /// index disagree on dimension.
    pub fn open(embedder: &'a E, index_dir: &Path, config: MatchConfig) -> Result<Self> {
        let catalog = load_catalog(index_dir)?;
        if catalog.is_empty() {
            return Err(VecDbError::IndexNotFound {
                path: index_dir.to_path_buf(),
                reason: "index holds no vectors".into(),
            });
        }

        let dimension = catalog.index().dimension();
        if embedder.dimension() != dimension {
            return Err(CoreError::DimensionMismatch {
                expected: dimension,
                actual: embedder.dimension(),
            }
            .into());
        }
        if catalog.model() != embedder.model_name() {
            warn!(
                index_model = catalog.model(),
                embedder_model = embedder.model_name(),
                "index was built with a different model"
            );
        }
        if !config.thresholds.is_valid() {
            return Err(CoreError::InvalidThresholds(format!(
                "similar {} must be below exact {}",
                config.thresholds.similar, config.thresholds.exact
            ))
            .into());
        }

        info!(
            vectors = catalog.len(),
            products = catalog.product_count(),
            dimension,
            "match engine ready"
        );
        Ok(Self {
            embedder,
            catalog,
            config,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &IndexedCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Matches one normalized query vector.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` for a wrongly sized query.
    pub fn match_vector(&self, crop_file: &str, query: &EmbeddingVector) -> Result<MatchResult> {
        let best = self
            .catalog
            .index()
            .nearest(query)?
            .and_then(|best| Some((best, self.catalog.entry(best.position)?)));
        let Some((best, entry)) = best else {
            return Err(VecDbError::SchemaMismatch {
                vectors: self.catalog.index().len(),
                entries: self.catalog.len(),
            });
        };

        Ok(MatchResult {
            crop_file: crop_file.to_string(),
            matched_product_id: entry.product_id.clone(),
            catalog_image: entry.image_file.clone(),
            similarity: MatchResult::round_score(best.score, self.config.precision),
            match_type: self.config.thresholds.classify(best.score),
        })
    }

    /// Embeds and matches one crop.
    ///
    /// # Errors
    ///
    /// Returns the embedding error for an unreadable crop.
    pub fn match_crop(&self, crop: &DetectionCrop) -> Result<MatchResult> {
        let query = embed_one(self.embedder, &crop.path)?;
        self.match_vector(&crop.file_name, &query)
    }

    /// Matches every crop under `crops_root` in enumeration order.
    ///
    /// Crops that fail to embed or have non UTF-8 names are logged and
    /// reported in [`MatchRun::skipped`].
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::Layout` for a malformed crops tree.
    pub fn match_all(&self, crops_root: &Path) -> Result<MatchRun> {
        let Scan { entries: crops, skipped } = scan_crops(crops_root, &self.config.extensions)?;
        info!(root = %crops_root.display(), crops = crops.len(), "matching crops");

        let mut run = MatchRun {
            results: Vec::with_capacity(crops.len()),
            skipped,
        };
        for crop in crops {
            match self.match_crop(&crop) {
                Ok(result) => {
                    match crop.name() {
                        Some(name) => debug!(
                            video = %name.video_id,
                            frame = name.frame_number,
                            detection = name.detection_index,
                            label = %name.label,
                            result = %result,
                            "crop matched"
                        ),
                        None => debug!(video = %crop.video_id, result = %result, "crop matched"),
                    }
                    run.results.push(result);
                }
                Err(VecDbError::Core(e)) => {
                    warn!(path = %crop.path.display(), error = %e, "skipping crop");
                    run.skipped.push(SkippedImage {
                        path: crop.path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(run)
    }

    /// Top `k` catalog neighbors for a query vector.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` for a wrongly sized query.
    pub fn search(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<Neighbor>> {
        self.catalog.index().search(query, k)
    }
}

/// Opens the index in `index_dir` and matches every crop under `crops_root`.
///
/// # Errors
///
/// See [`MatchEngine::open`] and [`MatchEngine::match_all`].
pub fn match_all<E: ImageEmbedder + ?Sized>(
    embedder: &E,
    crops_root: &Path,
    index_dir: &Path,
    config: &MatchConfig,
) -> Result<MatchRun> {
    MatchEngine::open(embedder, index_dir, config.clone())?.match_all(crops_root)
}

/// Writes `results` as a pretty-printed JSON array, replacing `path`
/// atomically.
///
/// # Errors
///
/// Returns `VecDbError::Json` or `VecDbError::Io`.
pub fn write_results(path: &Path, results: &[MatchResult]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(results)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_atomic(path, &bytes)
}

/// Matches a crops tree and writes the results to `output`.
///
/// The index is loaded before any crop is read, and `output` is only written
/// once every crop has been processed.
///
/// # Errors
///
/// Any fatal error from [`match_all`] or [`write_results`]; `output` is left
/// untouched in that case.
pub fn run_match_job<E: ImageEmbedder + ?Sized>(
    embedder: &E,
    crops_root: &Path,
    index_dir: &Path,
    output: &Path,
    config: &MatchConfig,
) -> Result<MatchSummary> {
    let run = match_all(embedder, crops_root, index_dir, config)?;
    write_results(output, &run.results)?;

    let summary = MatchSummary::from(&run);
    info!(
        output = %output.display(),
        matched = summary.matched,
        exact = summary.exact,
        similar = summary.similar,
        no_match = summary.no_match,
        skipped = summary.skipped,
        "match results written"
    );
    Ok(summary)
}
