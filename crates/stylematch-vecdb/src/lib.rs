//! # Stylematch VecDB
//!
//! Catalog indexing and visual match resolution.
//! Embeds every product image under `<catalog>/<product_id>/`, persists the
//! normalized vectors with an aligned id_map, and resolves detection crops
//! under `<crops>/<video_id>/` to their nearest catalog image with an
//! exact / similar / no match tier.
//!
//! ## Pipeline
//!
//! ```text
//! catalog tree --scan_catalog--> embed_batch --> CatalogIndex + id_map --> save_catalog
//! crops tree   --scan_crops----> embed_one   --> nearest(k=1) --> classify --> MatchResult
//! ```

pub mod batch;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod layout;
pub mod store;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
pub(crate) mod test_support;

pub use batch::{embed_batch, embed_one};
pub use builder::{BuildSummary, IndexBuilder, build_index};
pub use config::{BuildConfig, DEFAULT_EXTENSIONS, MatchConfig};
pub use engine::{MatchEngine, MatchRun, MatchSummary, match_all, run_match_job, write_results};
pub use error::{Result, VecDbError};
pub use index::{CatalogIndex, IndexedCatalog, Neighbor};
pub use layout::{CatalogImage, Scan, scan_catalog, scan_crops};
pub use store::{ID_MAP_FILE, INDEX_FILE, load_catalog, save_catalog};
