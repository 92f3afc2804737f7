//! # Run Configuration
//!
//! Settings for index builds and match runs.

use std::ffi::OsStr;
use std::path::Path;

use stylematch_core::MatchThresholds;

/// Image extensions picked up from catalog and crop directories.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Decimal places kept in reported similarity scores.
pub const DEFAULT_PRECISION: u32 = 4;

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect()
}

/// Returns `true` if `file_name` ends in one of `extensions` (case-insensitive).
///
/// Only the extension has to be UTF-8; the stem may be any OS string.
pub fn has_extension(file_name: impl AsRef<OsStr>, extensions: &[String]) -> bool {
    Path::new(file_name.as_ref())
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Configuration for [`crate::build_index`].
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Accepted image extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Embed images on the rayon pool.
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            parallel: false,
        }
    }
}

impl BuildConfig {
    /// Create a new build configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepted image extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable parallel embedding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration for [`crate::MatchEngine`].
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Tier cut-offs.
    pub thresholds: MatchThresholds,
    /// Decimal places kept in reported scores.
    pub precision: u32,
    /// Accepted crop extensions, without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            precision: DEFAULT_PRECISION,
            extensions: default_extensions(),
        }
    }
}

impl MatchConfig {
    /// Create a new match configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tier thresholds.
    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the number of decimal places kept in scores (at most 9).
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision.min(9);
        self
    }

    /// Set the accepted crop extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_is_case_insensitive() {
        let exts = default_extensions();
        assert!(has_extension("a.jpg", &exts));
        assert!(has_extension("a.JPG", &exts));
        assert!(has_extension("a.Jpeg", &exts));
        assert!(has_extension("a.b.png", &exts));
        assert!(!has_extension("a.gif", &exts));
        assert!(!has_extension("jpg", &exts));
        assert!(!has_extension(".png", &exts));
        assert!(!has_extension("a.", &exts));
    }

    #[cfg(unix)]
    #[test]
    fn extension_matching_accepts_non_utf8_stems() {
        use std::os::unix::ffi::OsStrExt;

        let exts = default_extensions();
        assert!(has_extension(OsStr::from_bytes(b"shirt\xff.jpg"), &exts));
        assert!(!has_extension(OsStr::from_bytes(b"notes\xff.txt"), &exts));
    }

    #[test]
    fn build_config_builder() {
        let config = BuildConfig::new().with_parallel(true).with_extensions(["webp"]);
        assert!(config.parallel);
        assert_eq!(config.extensions, vec!["webp".to_string()]);
    }

    #[test]
    fn match_config_defaults_and_clamping() {
        let config = MatchConfig::new();
        assert_eq!(config.precision, 4);
        assert_eq!(config.thresholds, MatchThresholds::default());

        let config = MatchConfig::new().with_precision(30);
        assert_eq!(config.precision, 9);
    }
}
