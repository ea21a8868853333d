//! Reference-resolver transformer.
//!
//! Rewrites generated `resolve_references` methods so that resolution
//! targets pointing at types under a configured API group suffix use the
//! dynamic `ResolutionTarget::managed(..)` form instead of the static
//! `ResolutionTarget::of::<T, L>()` form. Decisions are driven by the
//! loaded workspace's provenance graph, never by matching source text, and
//! the rewrite is idempotent byte-for-byte.
//!
//! The pieces live in three crates, re-exported here:
//!
//! - [`refpatch_loader`]: discovers compilation units and harvests the
//!   type declarations the provenance graph is built from.
//! - [`refpatch_engine`]: locates resolver files, rewrites them, and emits
//!   only the ones that changed.
//! - [`refpatch_store`]: the storage seam the emitter writes through.

pub mod args;

pub use refpatch_engine::{
    emit, locate, rewrite, Candidate, FileMatcher, RequestShape, Resolver, RewriteConfig,
    RewriteOutcome, ShapeTable, TransformError, TransformSummary, UnresolvedTypePolicy,
    DEFAULT_RESOLVER_FILE, RESOLVER_METHOD,
};
pub use refpatch_loader::{
    load, CompilationUnit, FileArtifact, LoadDiagnostic, LoadError, LoaderConfig, UnitManifest,
    Workspace,
};
pub use refpatch_store::{MemStorage, OsStorage, Storage, StoreError};
