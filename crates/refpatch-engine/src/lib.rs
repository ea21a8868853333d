//! Transformation engine for generated reference-resolution code.
//!
//! The pipeline has four stages, each usable on its own:
//!
//! 1. [`locate`]: select the generated resolver files out of a loaded
//!    workspace.
//! 2. [`rewrite`]: splice static resolution targets into their dynamic
//!    form, driven by type provenance rather than text matching.
//! 3. [`emit`]: persist the result through a [`refpatch_store::Storage`],
//!    writing only when bytes actually changed.
//! 4. [`Resolver`]: the orchestrator that runs the whole thing.

pub mod emit;
pub mod error;
pub mod locate;
pub mod resolver;
pub mod rewrite;
pub mod shapes;

pub use emit::{emit, GENERATED_FILE_MODE};
pub use error::TransformError;
pub use locate::{locate, Candidate, FileMatcher};
pub use resolver::{Resolver, TransformSummary, DEFAULT_RESOLVER_FILE};
pub use rewrite::{rewrite, RewriteConfig, RewriteOutcome, UnresolvedTypePolicy};
pub use shapes::{RequestShape, ShapeTable, RESOLVER_METHOD};
