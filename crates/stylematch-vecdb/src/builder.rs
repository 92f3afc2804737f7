//! # Catalog Index Builder
//!
//! Embeds every catalog image, stacks the normalized vectors into a
//! [`CatalogIndex`] and persists it with the aligned id_map. Images that fail
//! to decode or embed are reported and skipped; the build only fails when
//! nothing could be indexed or the catalog layout itself is broken.

use std::path::Path;

use serde::Serialize;
use stylematch_core::{CatalogEntry, ImageEmbedder, SkippedImage};
use tracing::{info, warn};

use crate::batch::embed_batch;
use crate::config::BuildConfig;
use crate::error::{Result, VecDbError};
use crate::index::{CatalogIndex, IndexedCatalog};
use crate::layout::{Scan, scan_catalog};
use crate::store::save_catalog;

/// Outcome of an index build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildSummary {
    /// Number of vectors written to the index.
    pub indexed: usize,
    /// Number of images that could not be embedded.
    pub skipped: usize,
    /// Number of distinct products with at least one indexed image.
    pub products: usize,
    /// Skipped images with their errors.
    pub skipped_images: Vec<SkippedImage>,
}

/// Builds catalog indexes with a borrowed embedder.
pub struct IndexBuilder<'a, E: ImageEmbedder + ?Sized> {
    embedder: &'a E,
    config: BuildConfig,
}

impl<'a, E: ImageEmbedder + ?Sized> IndexBuilder<'a, E> {
    pub fn new(embedder: &'a E, config: BuildConfig) -> Self {
        Self { embedder, config }
    }

    /// Embeds the catalog under `catalog_root` into an in-memory catalog.
    ///
    /// Returns the catalog and the images that were skipped.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::Layout` for a malformed catalog tree and
    /// `VecDbError::EmptyCatalog` if no image could be embedded.
    pub fn build(&self, catalog_root: &Path) -> Result<(IndexedCatalog, Vec<SkippedImage>)> {
        let Scan {
            entries: images,
            skipped: mut skipped,
        } = scan_catalog(catalog_root, &self.config.extensions)?;
        info!(
            root = %catalog_root.display(),
            images = images.len(),
            parallel = self.config.parallel,
            "embedding catalog images"
        );

        let paths: Vec<&Path> = images.iter().map(|i| i.path.as_path()).collect();
        let embeddings = embed_batch(self.embedder, &paths, self.config.parallel);

        let mut index = CatalogIndex::new(self.embedder.dimension());
        let mut id_map = Vec::with_capacity(images.len());

        for (image, embedding) in images.into_iter().zip(embeddings) {
            match embedding {
                Ok(vector) => {
                    index.add(&vector)?;
                    id_map.push(CatalogEntry::new(image.product_id, image.file_name));
                }
                Err(e) => {
                    warn!(path = %image.path.display(), error = %e, "skipping catalog image");
                    skipped.push(SkippedImage {
                        path: image.path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if index.is_empty() {
            return Err(VecDbError::EmptyCatalog {
                root: catalog_root.to_path_buf(),
            });
        }

        let catalog = IndexedCatalog::new(index, id_map, self.embedder.model_name())?;
        Ok((catalog, skipped))
    }

    /// Builds the catalog under `catalog_root` and writes it to `output_dir`.
    ///
    /// Nothing is written when the build fails.
    pub fn build_index(&self, catalog_root: &Path, output_dir: &Path) -> Result<BuildSummary> {
        let (catalog, skipped_images) = self.build(catalog_root)?;
        save_catalog(output_dir, &catalog)?;

        let summary = BuildSummary {
            indexed: catalog.len(),
            skipped: skipped_images.len(),
            products: catalog.product_count(),
            skipped_images,
        };
        info!(
            output = %output_dir.display(),
            indexed = summary.indexed,
            skipped = summary.skipped,
            products = summary.products,
            "catalog index built"
        );
        Ok(summary)
    }
}

/// Builds the index for `catalog_root` and persists it to `output_dir`.
///
/// The returned summary carries `(indexed, skipped)` counts.
///
/// # Errors
///
/// See [`IndexBuilder::build`]; persistence failures surface as
/// `VecDbError::Io` or `VecDbError::Serialize`.
pub fn build_index<E: ImageEmbedder + ?Sized>(
    embedder: &E,
    catalog_root: &Path,
    output_dir: &Path,
    config: &BuildConfig,
) -> Result<BuildSummary> {
    IndexBuilder::new(embedder, config.clone()).build_index(catalog_root, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ID_MAP_FILE, INDEX_FILE, load_catalog};
    use crate::test_support::{PixelEmbedder, write_checkerboard, write_corrupt, write_gradient};

    #[test]
    fn skips_corrupt_image_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog");
        let out = dir.path().join("store");
        write_corrupt(&catalog.join("P1/broken.jpg"));
        write_gradient(&catalog.join("P1/good.png"), false);

        let summary =
            build_index(&PixelEmbedder::new(), &catalog, &out, &BuildConfig::default()).unwrap();
        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.skipped_images[0].path, catalog.join("P1/broken.jpg"));

        let loaded = load_catalog(&out).unwrap();
        assert_eq!(loaded.id_map(), &[CatalogEntry::new("P1", "good.png")]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_do_not_abort_the_build() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog");
        let out = dir.path().join("store");
        write_gradient(&catalog.join("P1/good.png"), false);
        write_corrupt(&catalog.join("P1").join(OsStr::from_bytes(b"notes\xff.txt")));
        write_gradient(&catalog.join("P1").join(OsStr::from_bytes(b"alt\xff.png")), true);

        let summary =
            build_index(&PixelEmbedder::new(), &catalog, &out, &BuildConfig::default()).unwrap();
        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.skipped_images[0].reason.contains("UTF-8"));
    }

    #[test]
    fn empty_catalog_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog");
        let out = dir.path().join("store");
        write_corrupt(&catalog.join("P1/broken.jpg"));

        let err = build_index(&PixelEmbedder::new(), &catalog, &out, &BuildConfig::default())
            .unwrap_err();
        assert!(matches!(err, VecDbError::EmptyCatalog { .. }));
        assert!(!out.join(INDEX_FILE).exists());
        assert!(!out.join(ID_MAP_FILE).exists());
    }

    #[test]
    fn id_map_follows_sorted_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog");
        write_checkerboard(&catalog.join("P2/a.png"));
        write_gradient(&catalog.join("P1/b.png"), true);
        write_gradient(&catalog.join("P1/a.png"), false);

        let embedder = PixelEmbedder::new();
        let builder = IndexBuilder::new(&embedder, BuildConfig::default());
        let (built, skipped) = builder.build(&catalog).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(
            built.id_map(),
            &[
                CatalogEntry::new("P1", "a.png"),
                CatalogEntry::new("P1", "b.png"),
                CatalogEntry::new("P2", "a.png"),
            ]
        );
        assert_eq!(built.index().len(), built.id_map().len());
        assert_eq!(built.product_count(), 2);
        assert_eq!(built.model(), "pixel-thumbnail");
    }

    #[test]
    fn missing_catalog_root_is_layout_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_index(
            &PixelEmbedder::new(),
            &dir.path().join("missing"),
            &dir.path().join("store"),
            &BuildConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VecDbError::Layout { .. }));
    }
}
