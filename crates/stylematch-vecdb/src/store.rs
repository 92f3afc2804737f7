//! # Index Persistence
//!
//! A catalog is stored as two files in one directory:
//!
//! - `catalog.safetensors`: a single `F32` tensor `embeddings` of shape
//!   `[n, dimension]`, plus metadata naming the model and metric.
//! - `id_map.json`: the JSON array of [`CatalogEntry`] aligned with the rows.
//!
//! Both files are serialized in memory, written to `.tmp` siblings and then
//! renamed into place. Loading refuses a pair whose lengths disagree.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use safetensors::tensor::{Dtype, SafeTensors, TensorView};
use stylematch_core::CatalogEntry;

use crate::error::{Result, VecDbError};
use crate::index::{CatalogIndex, IndexedCatalog};

/// Index file name inside a store directory.
pub const INDEX_FILE: &str = "catalog.safetensors";
/// id_map file name inside a store directory.
pub const ID_MAP_FILE: &str = "id_map.json";

const TENSOR_NAME: &str = "embeddings";
const FORMAT_VERSION: &str = "1";
const UNKNOWN_MODEL: &str = "unknown";

/// Writes `catalog` into `dir`, replacing any previous catalog there.
///
/// # Errors
///
/// Returns `VecDbError::Serialize` if the tensor cannot be encoded, or
/// `VecDbError::Io` if the directory or files cannot be written.
pub fn save_catalog(dir: &Path, catalog: &IndexedCatalog) -> Result<()> {
    let index = catalog.index();
    let bytes: Vec<u8> = index
        .as_slice()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();

    let view = TensorView::new(Dtype::F32, vec![index.len(), index.dimension()], &bytes)
        .map_err(|e| VecDbError::Serialize(e.to_string()))?;

    let metadata: HashMap<String, String> = [
        ("format_version", FORMAT_VERSION.to_string()),
        ("metric", "inner_product".to_string()),
        ("normalization", "l2".to_string()),
        ("model", catalog.model().to_string()),
        ("count", catalog.len().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let index_bytes = safetensors::serialize([(TENSOR_NAME, view)], &Some(metadata))
        .map_err(|e| VecDbError::Serialize(e.to_string()))?;
    let id_map_bytes = serde_json::to_vec_pretty(catalog.id_map())?;

    fs::create_dir_all(dir)?;
    write_atomic(&dir.join(INDEX_FILE), &index_bytes)?;
    write_atomic(&dir.join(ID_MAP_FILE), &id_map_bytes)?;

    tracing::debug!(
        dir = %dir.display(),
        vectors = catalog.len(),
        dimension = index.dimension(),
        "catalog index written"
    );
    Ok(())
}

/// Loads the catalog stored in `dir`.
///
/// # Errors
///
/// Returns `VecDbError::IndexNotFound` if either file is missing, unreadable
/// or malformed, and `VecDbError::SchemaMismatch` if the number of vectors
/// differs from the number of id_map entries.
pub fn load_catalog(dir: &Path) -> Result<IndexedCatalog> {
    if !dir.is_dir() {
        return Err(VecDbError::IndexNotFound {
            path: dir.to_path_buf(),
            reason: "index directory does not exist".into(),
        });
    }

    let index_path = dir.join(INDEX_FILE);
    let id_map_path = dir.join(ID_MAP_FILE);
    let index_bytes = read_artifact(&index_path)?;
    let id_map_bytes = read_artifact(&id_map_path)?;

    let id_map: Vec<CatalogEntry> =
        serde_json::from_slice(&id_map_bytes).map_err(|e| VecDbError::IndexNotFound {
            path: id_map_path.clone(),
            reason: format!("invalid id_map: {e}"),
        })?;

    let corrupt = |reason: String| VecDbError::IndexNotFound {
        path: index_path.clone(),
        reason,
    };

    let (_, header) = SafeTensors::read_metadata(&index_bytes).map_err(|e| corrupt(e.to_string()))?;
    let metadata = header.metadata().as_ref();
    let model = metadata
        .and_then(|m| m.get("model"))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
    let recorded_count = metadata
        .and_then(|m| m.get("count"))
        .and_then(|c| c.parse::<usize>().ok());

    let tensors = SafeTensors::deserialize(&index_bytes).map_err(|e| corrupt(e.to_string()))?;
    let view = tensors
        .tensor(TENSOR_NAME)
        .map_err(|e| corrupt(e.to_string()))?;

    if view.dtype() != Dtype::F32 {
        return Err(corrupt(format!("expected F32 embeddings, found {:?}", view.dtype())));
    }
    let &[rows, dimension] = view.shape() else {
        return Err(corrupt(format!("expected a 2-D tensor, found shape {:?}", view.shape())));
    };

    let data: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let index = CatalogIndex::from_raw_parts(dimension, data)
        .map_err(|e| corrupt(e.to_string()))?;
    if index.len() != rows {
        return Err(corrupt(format!("tensor holds {} rows, header says {rows}", index.len())));
    }
    if let Some(count) = recorded_count.filter(|&c| c != rows) {
        return Err(VecDbError::SchemaMismatch {
            vectors: rows,
            entries: count,
        });
    }

    let catalog = IndexedCatalog::new(index, id_map, model)?;
    tracing::debug!(
        dir = %dir.display(),
        vectors = catalog.len(),
        dimension,
        model = catalog.model(),
        "catalog index loaded"
    );
    Ok(catalog)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| VecDbError::IndexNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes `bytes` to a `.tmp` sibling, syncs it and renames it over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
