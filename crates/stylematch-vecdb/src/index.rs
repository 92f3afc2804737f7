//! # Catalog Index
//!
//! Exhaustive inner-product index over unit vectors. Every stored row and
//! every query is an [`EmbeddingVector`], so the inner product is the cosine
//! similarity. Rows are kept row-major in one contiguous buffer.

use std::cmp::Ordering;

use stylematch_core::types::embedding::dot;
use stylematch_core::{CatalogEntry, CoreError, EmbeddingVector};

use crate::error::{Result, VecDbError};

/// A search hit: row position and inner-product score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub score: f32,
}

/// Flat inner-product vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl CatalogIndex {
    /// Creates an empty index for vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuilds an index from a row-major buffer of normalized rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` if `data` is not a whole number
    /// of rows.
    pub fn from_raw_parts(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(CoreError::DimensionMismatch {
                expected: dimension,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self { dimension, data })
    }

    /// Appends a vector; its position is the previous `len()`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` if the vector has the wrong
    /// dimension.
    pub fn add(&mut self, vector: &EmbeddingVector) -> Result<usize> {
        self.check_dimension(vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector.as_slice());
        Ok(position)
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row at `position`.
    #[must_use]
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Row-major buffer of all vectors.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the `k` rows with the highest inner product, best first.
    /// Equal scores keep the lower position first.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` if the query has the wrong
    /// dimension.
    pub fn search(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                score: dot(row, query.as_slice()),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Single best row, or `None` for an empty index.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DimensionMismatch` if the query has the wrong
    /// dimension.
    pub fn nearest(&self, query: &EmbeddingVector) -> Result<Option<Neighbor>> {
        self.check_dimension(query)?;

        let mut best: Option<Neighbor> = None;
        for (position, row) in self.data.chunks_exact(self.dimension).enumerate() {
            let score = dot(row, query.as_slice());
            if best.is_none_or(|b| score > b.score) {
                best = Some(Neighbor { position, score });
            }
        }
        Ok(best)
    }

    fn check_dimension(&self, vector: &EmbeddingVector) -> Result<()> {
        if self.dimension == 0 || vector.dimension() != self.dimension {
            return Err(CoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.dimension(),
            }
            .into());
        }
        Ok(())
    }
}

/// An index together with its id_map.
///
/// Constructing one is the only way to pair the two, and construction checks
/// that position `i` of the index has an `id_map[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCatalog {
    index: CatalogIndex,
    id_map: Vec<CatalogEntry>,
    model: String,
}

impl IndexedCatalog {
    /// Pairs an index with its id_map.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::SchemaMismatch` if the lengths differ.
    pub fn new(
        index: CatalogIndex,
        id_map: Vec<CatalogEntry>,
        model: impl Into<String>,
    ) -> Result<Self> {
        if index.len() != id_map.len() {
            return Err(VecDbError::SchemaMismatch {
                vectors: index.len(),
                entries: id_map.len(),
            });
        }
        Ok(Self {
            index,
            id_map,
            model: model.into(),
        })
    }

    #[must_use]
    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    #[must_use]
    pub fn id_map(&self) -> &[CatalogEntry] {
        &self.id_map
    }

    /// Name of the model that produced the vectors.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.id_map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_map.is_empty()
    }

    /// Catalog entry for an index position.
    #[must_use]
    pub fn entry(&self, position: usize) -> Option<&CatalogEntry> {
        self.id_map.get(position)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        let mut products: Vec<&str> = self.id_map.iter().map(|e| e.product_id.as_str()).collect();
        products.sort_unstable();
        products.dedup();
        products.len()
    }
}
