use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detector output naming: `<video_id>_frame<N>_det<I>_<label>.<ext>`.
static CROP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<video>.+)_frame(?P<frame>\d+)_det(?P<det>\d+)_(?P<label>[^.]+)\.[A-Za-z0-9]+$",
    )
        .expect("static crop name pattern")
});

/// A detection crop on disk, as produced by the object detector.
///
/// The matcher only needs the image and its file name; `video_id` is the
/// directory the crop was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionCrop {
    /// Group directory name (one per source video).
    pub video_id: String,
    /// Crop file name, reported back as `crop_file`.
    pub file_name: String,
    /// Full path to the crop image.
    pub path: PathBuf,
}

impl DetectionCrop {
    #[must_use]
    pub fn new(video_id: impl Into<String>, file_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            video_id: video_id.into(),
            file_name: file_name.into(),
            path,
        }
    }

    /// Detector metadata encoded in the file name, when it follows the
    /// detector's naming scheme.
    #[must_use]
    pub fn name(&self) -> Option<CropName> {
        CropName::parse(&self.file_name)
    }
}

/// Metadata recovered from a detector crop file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropName {
    pub video_id: String,
    pub frame_number: u32,
    pub detection_index: u32,
    pub label: String,
}

impl CropName {
    /// Parses `<video_id>_frame<N>_det<I>_<label>.<ext>`.
    ///
    /// Returns `None` for names that do not follow the scheme. The video id
    /// may itself contain underscores.
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = CROP_NAME.captures(file_name)?;
        Some(Self {
            video_id: caps["video"].to_string(),
            frame_number: caps["frame"].parse().ok()?,
            detection_index: caps["det"].parse().ok()?,
            label: caps["label"].to_string(),
        })
    }
}
