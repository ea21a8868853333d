//! Error taxonomy of a transform run.
//!
//! Every failure bubbles unwrapped to the orchestrator's single return
//! value. The only tolerated condition is a load diagnostic under the
//! error-tolerance toggle, and that is handled inside the loader, not here.

use std::path::PathBuf;

use refpatch_loader::LoadError;
use refpatch_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A compilation unit failed to load or resolve.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A selected resolver file is not valid UTF-8. Selected files are
    /// expected to be generator output; this is a contract violation.
    #[error("selected resolver file {} is not valid UTF-8", path.display())]
    Utf8 { path: PathBuf },

    /// A selected resolver file failed to parse. Also a contract violation
    /// (wrong pattern match or incompatible generator version), never a
    /// recoverable condition.
    #[error("failed to parse selected resolver file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// A resolution target's provenance could not be determined and the
    /// run was configured to treat that as fatal.
    #[error("cannot resolve provenance of `{type_path}` referenced in {}", path.display())]
    UnresolvedType { type_path: String, path: PathBuf },

    /// The storage backend failed to persist a changed file.
    #[error("failed to persist transformed file {}: {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}
