use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::MatchTier;

/// Default similarity above which a match is reported as exact.
pub const DEFAULT_EXACT_THRESHOLD: f32 = 0.90;
/// Default similarity above which a match is reported as similar.
pub const DEFAULT_SIMILAR_THRESHOLD: f32 = 0.75;

/// Score cut-offs turning a cosine similarity into a [`MatchTier`].
///
/// Both bounds are exclusive on the upper tier: a score equal to `exact`
/// is `Similar`, a score equal to `similar` is `NoMatch`. The defaults were
/// tuned for CLIP ViT-B/32 on one fashion catalog and need recalibration for
/// other models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub exact: f32,
    pub similar: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            exact: DEFAULT_EXACT_THRESHOLD,
            similar: DEFAULT_SIMILAR_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    /// Creates validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidThresholds` unless
    /// `0.0 <= similar < exact <= 1.0`.
    pub fn new(exact: f32, similar: f32) -> Result<Self> {
        let thresholds = Self { exact, similar };
        if thresholds.is_valid() {
            Ok(thresholds)
        } else {
            Err(CoreError::InvalidThresholds(format!(
                "expected 0.0 <= similar < exact <= 1.0, got similar={similar}, exact={exact}"
            )))
        }
    }

    /// Validates ordering and range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.exact.is_finite()
            && self.similar.is_finite()
            && (0.0..=1.0).contains(&self.similar)
            && (0.0..=1.0).contains(&self.exact)
            && self.similar < self.exact
    }

    /// Maps a similarity score to its tier.
    #[must_use]
    pub fn classify(&self, score: f32) -> MatchTier {
        if score > self.exact {
            MatchTier::Exact
        } else if score > self.similar {
            MatchTier::Similar
        } else {
            MatchTier::NoMatch
        }
    }
}
