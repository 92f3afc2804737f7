use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence bucket for a nearest-neighbor match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchTier {
    /// Score at or below the similar threshold.
    #[serde(rename = "no match")]
    NoMatch,
    /// Score above the similar threshold, at or below the exact threshold.
    #[serde(rename = "similar")]
    Similar,
    /// Score above the exact threshold.
    #[serde(rename = "exact")]
    Exact,
}

impl MatchTier {
    /// Returns `true` for `Exact` and `Similar`.
    #[must_use]
    pub fn is_match(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no match"),
            Self::Similar => write!(f, "similar"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// The catalog match for one detection crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Crop image file name.
    pub crop_file: String,

    /// Product owning the nearest catalog image.
    pub matched_product_id: String,

    /// File name of the nearest catalog image.
    pub catalog_image: String,

    /// Cosine similarity, rounded for reproducible output.
    pub similarity: f64,

    /// Tier derived from the unrounded similarity.
    pub match_type: MatchTier,
}

impl MatchResult {
    /// Rounds `score` to `precision` decimal places.
    #[must_use]
    pub fn round_score(score: f32, precision: u32) -> f64 {
        let factor = 10f64.powi(precision as i32);
        (f64::from(score) * factor).round() / factor
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}/{} ({:.4}, {})",
            self.crop_file,
            self.matched_product_id,
            self.catalog_image,
            self.similarity,
            self.match_type
        )
    }
}
