//! Byte-oriented storage over a file-path namespace.
//!
//! The transformer only ever needs two operations: read the bytes at a path
//! and overwrite the bytes at a path. Keeping that behind a trait lets tests
//! capture writes in memory while production runs write through to disk.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path has no contents in this backend.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("storage I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Byte store over a file-path namespace.
///
/// Implementations must be interchangeable: the engine never assumes the
/// bytes it writes are visible to anything but subsequent reads of the same
/// path through the same store.
pub trait Storage: Send + Sync {
    /// Read the full contents at `path`.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Overwrite the contents at `path`. `mode` is the unix permission set
    /// for newly created files; backends without a permission concept may
    /// ignore it.
    fn write_file(&self, path: &Path, bytes: &[u8], mode: u32) -> Result<(), StoreError>;
}

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Default)]
struct MemStorageInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    writes: usize,
}

/// In-memory storage keyed by path. Counts writes so tests can assert that
/// an unchanged file produced no write at all.
#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<MemStorageInner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write_file` calls since creation.
    pub fn write_count(&self) -> usize {
        self.inner.read().writes
    }

    /// Snapshot of every stored path, in path order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner.read().files.keys().cloned().collect()
    }
}

impl Storage for MemStorage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        self.inner
            .read()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn write_file(&self, path: &Path, bytes: &[u8], _mode: u32) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.files.insert(path.to_path_buf(), bytes.to_vec());
        inner.writes += 1;
        Ok(())
    }
}

// =============================================================================
// On-disk backend
// =============================================================================

/// Filesystem-backed storage. Writes go to a temporary sibling first and are
/// renamed into place, so a crashed run never leaves a half-written file.
#[derive(Default)]
pub struct OsStorage;

impl OsStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for OsStorage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn write_file(&self, path: &Path, bytes: &[u8], mode: u32) -> Result<(), StoreError> {
        atomic_write(path, bytes, mode).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Write `bytes` to `path` via a temporary file in the same directory.
/// The temporary file is removed whenever the write does not complete, so
/// a failed run leaves nothing next to the generated sources.
fn atomic_write(path: &Path, bytes: &[u8], mode: u32) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
