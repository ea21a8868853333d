//! Writing rewrite results back through a [`Storage`].

use std::path::Path;

use tracing::debug;

use refpatch_store::Storage;

use crate::error::TransformError;

/// Mode bits for emitted files. Generated resolver files never need to be
/// executable or world-readable.
pub const GENERATED_FILE_MODE: u32 = 0o600;

/// Persist one rewrite outcome. Unchanged files are never written, so a
/// repeated run leaves no trace in the storage layer, not even a same-bytes
/// overwrite that would bump mtimes. Returns whether a write happened.
pub fn emit(
    storage: &dyn Storage,
    path: &Path,
    bytes: &[u8],
    changed: bool,
) -> Result<bool, TransformError> {
    if !changed {
        debug!(file = %path.display(), "no change, skipping write");
        return Ok(false);
    }
    storage
        .write_file(path, bytes, GENERATED_FILE_MODE)
        .map_err(|source| TransformError::Emit {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(file = %path.display(), bytes = bytes.len(), "wrote transformed file");
    Ok(true)
}
