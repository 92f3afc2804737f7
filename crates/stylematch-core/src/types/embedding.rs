use crate::error::{CoreError, Result};

/// An L2-normalized embedding.
///
/// Every vector stored in an index or used as a query goes through
/// [`EmbeddingVector::normalized`], so the inner product of two
/// `EmbeddingVector`s is their cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector {
    values: Vec<f32>,
}

impl EmbeddingVector {
    /// Normalizes a raw extractor output to unit length.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DegenerateEmbedding` if the vector is empty,
    /// contains non-finite values, or has zero norm.
    pub fn normalized(mut raw: Vec<f32>) -> Result<Self> {
        if raw.is_empty() {
            return Err(CoreError::DegenerateEmbedding("empty vector".into()));
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::DegenerateEmbedding(
                "vector contains non-finite values".into(),
            ));
        }

        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(CoreError::DegenerateEmbedding(format!("norm is {norm}")));
        }

        for v in &mut raw {
            *v /= norm;
        }
        Ok(Self { values: raw })
    }

    /// Number of components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Inner product with another vector (cosine similarity for unit vectors).
    #[must_use]
    pub fn dot(&self, other: &EmbeddingVector) -> f32 {
        dot(&self.values, &other.values)
    }
}

/// Inner product of two equally sized slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
