//! # Directory Layout
//!
//! Enumerates `<root>/<group>/<image files>` trees: the catalog (one group per
//! product) and the crops directory (one group per video). Enumeration is
//! sorted by group name, then file name, so repeated runs see the same order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stylematch_core::{DetectionCrop, SkippedImage};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::has_extension;
use crate::error::{Result, VecDbError};

/// One image file inside the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogImage {
    /// Product directory name.
    pub product_id: String,
    /// Image file name.
    pub file_name: String,
    /// Full path.
    pub path: PathBuf,
}

/// Result of scanning one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan<T> {
    /// Usable entries, sorted by group then file name.
    pub entries: Vec<T>,
    /// Image files that cannot be represented, such as non-UTF-8 names.
    pub skipped: Vec<SkippedImage>,
}

impl Scan<GroupedFile> {
    fn map<U>(self, f: impl FnMut(GroupedFile) -> U) -> Scan<U> {
        Scan {
            entries: self.entries.into_iter().map(f).collect(),
            skipped: self.skipped,
        }
    }
}

/// Lists every catalog image under `root`, sorted by product then file name.
///
/// Image files whose names are not valid UTF-8 are logged and returned in
/// [`Scan::skipped`].
///
/// # Errors
///
/// Returns `VecDbError::Layout` if `root` is not a directory, an entry cannot
/// be read, or a product directory name is not valid UTF-8.
pub fn scan_catalog(root: &Path, extensions: &[String]) -> Result<Scan<CatalogImage>> {
    Ok(scan_groups(root, extensions)?.map(|f| CatalogImage {
        product_id: f.group,
        file_name: f.file_name,
        path: f.path,
    }))
}

/// Lists every detection crop under `root`, sorted by video then file name.
///
/// # Errors
///
/// Same conditions as [`scan_catalog`].
pub fn scan_crops(root: &Path, extensions: &[String]) -> Result<Scan<DetectionCrop>> {
    Ok(scan_groups(root, extensions)?.map(|f| DetectionCrop::new(f.group, f.file_name, f.path)))
}

struct GroupedFile {
    group: String,
    file_name: String,
    path: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn utf8_name(entry: &DirEntry) -> Result<String> {
    entry
        .file_name()
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| VecDbError::Layout {
            path: entry.path().to_path_buf(),
            reason: "name is not valid UTF-8".into(),
        })
}

fn scan_groups(root: &Path, extensions: &[String]) -> Result<Scan<GroupedFile>> {
    if !root.is_dir() {
        let reason = if root.exists() {
            "not a directory"
        } else {
            "directory does not exist"
        };
        return Err(VecDbError::Layout {
            path: root.to_path_buf(),
            reason: reason.into(),
        });
    }

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut group_sizes: BTreeMap<String, usize> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| VecDbError::Layout {
            path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            reason: e.to_string(),
        })?;
        let is_dir = entry.file_type().is_dir();

        match (entry.depth(), is_dir) {
            (1, true) => {
                group_sizes.insert(utf8_name(&entry)?, 0);
            }
            (1, false) => {
                warn!(path = %entry.path().display(), "ignoring file outside of a group directory");
            }
            (_, true) => {
                warn!(path = %entry.path().display(), "ignoring nested directory");
            }
            (_, false) => {
                if !has_extension(entry.file_name(), extensions) {
                    debug!(path = %entry.path().display(), "skipping unsupported file type");
                    continue;
                }
                let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                    warn!(path = %entry.path().display(), "skipping image with non UTF-8 name");
                    skipped.push(SkippedImage {
                        path: entry.into_path(),
                        reason: "file name is not valid UTF-8".into(),
                    });
                    continue;
                };

                let group = entry
                    .path()
                    .parent()
                    .and_then(Path::file_name)
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| VecDbError::Layout {
                        path: entry.path().to_path_buf(),
                        reason: "cannot determine group directory".into(),
                    })?;

                *group_sizes.entry(group.clone()).or_default() += 1;
                files.push(GroupedFile {
                    group,
                    file_name,
                    path: entry.into_path(),
                });
            }
        }
    }

    for (group, size) in &group_sizes {
        if *size == 0 {
            warn!(group = %group, root = %root.display(), "group directory has no images");
        }
    }

    debug!(
        root = %root.display(),
        groups = group_sizes.len(),
        files = files.len(),
        skipped = skipped.len(),
        "directory scan complete"
    );

    Ok(Scan {
        entries: files,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn scan_catalog_sorted_by_product_then_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("P2/b.jpg"));
        touch(&root.join("P2/a.png"));
        touch(&root.join("P1/z.JPEG"));
        touch(&root.join("P10/c.jpg"));

        let exts = BuildConfig::default().extensions;
        let images = scan_catalog(root, &exts).unwrap().entries;
        let order: Vec<(&str, &str)> = images
            .iter()
            .map(|i| (i.product_id.as_str(), i.file_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("P1", "z.JPEG"), ("P10", "c.jpg"), ("P2", "a.png"), ("P2", "b.jpg")]
        );
        assert_eq!(images[0].path, root.join("P1/z.JPEG"));
    }

    #[test]
    fn scan_ignores_stray_hidden_and_unsupported_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("match_results.json"));
        touch(&root.join("stray.jpg"));
        touch(&root.join(".cache/hidden.jpg"));
        touch(&root.join("vid1/.DS_Store"));
        touch(&root.join("vid1/notes.txt"));
        touch(&root.join("vid1/nested/deep.jpg"));
        touch(&root.join("vid1/crop.jpg"));
        fs::create_dir_all(root.join("vid2")).unwrap();

        let exts = BuildConfig::default().extensions;
        let crops = scan_crops(root, &exts).unwrap().entries;
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].video_id, "vid1");
        assert_eq!(crops[0].file_name, "crop.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_are_skipped_not_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let group = root.join("P1");
        touch(&group.join("good.png"));
        touch(&group.join(OsStr::from_bytes(b"notes\xff.txt")));
        let bad_image = group.join(OsStr::from_bytes(b"shirt\xff.jpg"));
        touch(&bad_image);

        let exts = BuildConfig::default().extensions;
        let scan = scan_catalog(root, &exts).unwrap();
        assert_eq!(scan.entries.len(), 1);
        assert_eq!(scan.entries[0].file_name, "good.png");
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].path, bad_image);
    }

    #[test]
    fn scan_missing_root_is_layout_error() {
        let exts = BuildConfig::default().extensions;
        let err = scan_catalog(Path::new("/nonexistent/catalog"), &exts).unwrap_err();
        assert!(matches!(err, VecDbError::Layout { .. }));
    }

    #[test]
    fn scan_file_root_is_layout_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("catalog.jpg");
        touch(&file);

        let exts = BuildConfig::default().extensions;
        let err = scan_catalog(&file, &exts).unwrap_err();
        match err {
            VecDbError::Layout { reason, .. } => assert_eq!(reason, "not a directory"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scan_empty_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exts = BuildConfig::default().extensions;
        let scan = scan_catalog(dir.path(), &exts).unwrap();
        assert!(scan.entries.is_empty());
        assert!(scan.skipped.is_empty());
    }
}
