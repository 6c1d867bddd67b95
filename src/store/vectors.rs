use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};

const VECTOR_EXTENSION: &str = "vec";

const TEMP_EXTENSION: &str = "vec.tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which of a profile's two vectors is meant.
pub enum VectorKind {
    /// How the person describes themselves (searched against).
    #[serde(rename = "self")]
    SelfDescription,
    /// What the person looks for in a roommate (used as the query).
    Criteria,
}

impl VectorKind {
    /// Short name used in file names and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorKind::SelfDescription => "self",
            VectorKind::Criteria => "criteria",
        }
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyed storage for profile vectors. A missing vector is `Ok(None)`, not an error.
pub trait VectorStore: Send + Sync {
    /// Loads the `(id, kind)` vector if one was saved.
    fn load(&self, id: i64, kind: VectorKind) -> StoreResult<Option<Vec<f32>>>;

    /// Saves (or replaces) the `(id, kind)` vector.
    fn save(&self, id: i64, kind: VectorKind, vector: &[f32]) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
/// Stores each vector as raw little-endian `f32`s in `{root}/{id}_{kind}.vec`.
pub struct FileVectorStore {
    root: PathBuf,
}

impl FileVectorStore {
    /// Creates a store rooted at `root`. The directory is created on first save.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the root directory exists.
    pub fn ensure_root(&self) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|_| StoreError::StorageUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }

    fn vector_path(&self, id: i64, kind: VectorKind) -> PathBuf {
        self.root
            .join(format!("{}_{}.{}", id, kind.as_str(), VECTOR_EXTENSION))
    }

    fn temp_vector_path(&self, id: i64, kind: VectorKind) -> PathBuf {
        self.root
            .join(format!("{}_{}.{}", id, kind.as_str(), TEMP_EXTENSION))
    }
}

impl VectorStore for FileVectorStore {
    fn load(&self, id: i64, kind: VectorKind) -> StoreResult<Option<Vec<f32>>> {
        let path = self.vector_path(id, kind);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let vector = bytes_to_f32_vec(&bytes).ok_or(StoreError::CorruptVector {
            path,
            len: bytes.len(),
        })?;
        Ok(Some(vector))
    }

    fn save(&self, id: i64, kind: VectorKind, vector: &[f32]) -> StoreResult<()> {
        self.ensure_root()?;

        let temp_path = self.temp_vector_path(id, kind);
        let final_path = self.vector_path(id, kind);

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&f32_to_bytes(vector))?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }
}

/// Encodes `values` as little-endian bytes.
pub fn f32_to_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decodes little-endian bytes; `None` if the length is not a multiple of 4.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Option<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default, Clone)]
/// In-memory vector store for tests.
pub struct MockVectorStore {
    vectors: std::sync::Arc<
        parking_lot::RwLock<std::collections::HashMap<(i64, VectorKind), Vec<f32>>>,
    >,
}

#[cfg(any(test, feature = "mock"))]
impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: i64, kind: VectorKind, vector: Vec<f32>) {
        self.vectors.write().insert((id, kind), vector);
    }

    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.read().is_empty()
    }
}

#[cfg(any(test, feature = "mock"))]
impl VectorStore for MockVectorStore {
    fn load(&self, id: i64, kind: VectorKind) -> StoreResult<Option<Vec<f32>>> {
        Ok(self.vectors.read().get(&(id, kind)).cloned())
    }

    fn save(&self, id: i64, kind: VectorKind, vector: &[f32]) -> StoreResult<()> {
        self.insert(id, kind, vector.to_vec());
        Ok(())
    }
}
