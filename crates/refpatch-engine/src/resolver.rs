//! The end-to-end reference resolver transformer.
//!
//! Ties the pipeline together: load the workspace, select generated
//! resolver files, rewrite their resolution targets, and emit whatever
//! actually changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use refpatch_loader::{self as loader, LoaderConfig, Workspace};
use refpatch_store::Storage;

use crate::emit::emit;
use crate::error::TransformError;
use crate::locate::{locate, FileMatcher};
use crate::rewrite::{rewrite, RewriteConfig, UnresolvedTypePolicy};
use crate::shapes::ShapeTable;

/// Name the generator gives resolver files. The `zz_` prefix sorts them
/// after hand-written sources.
pub const DEFAULT_RESOLVER_FILE: &str = "zz_generated_resolvers.rs";

/// Rewrites generated resolution targets from their static form to the
/// dynamic form for every type declared under a configured group suffix.
pub struct Resolver {
    storage: Arc<dyn Storage>,
    group_suffix: String,
    tolerate_load_errors: bool,
    group_overrides: BTreeMap<String, String>,
    loader_config: LoaderConfig,
    unresolved_types: UnresolvedTypePolicy,
    shapes: ShapeTable,
}

/// Counters for one [`Resolver::transform_packages`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    pub files_examined: usize,
    pub files_rewritten: usize,
}

impl Resolver {
    pub fn new(
        storage: Arc<dyn Storage>,
        group_suffix: impl Into<String>,
        tolerate_load_errors: bool,
        group_overrides: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            storage,
            group_suffix: group_suffix.into(),
            tolerate_load_errors,
            group_overrides: group_overrides.unwrap_or_default(),
            loader_config: LoaderConfig::default(),
            unresolved_types: UnresolvedTypePolicy::default(),
            shapes: ShapeTable::default(),
        }
    }

    /// Override how compilation units are discovered and parsed.
    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader_config = config;
        self
    }

    pub fn with_unresolved_type_policy(mut self, policy: UnresolvedTypePolicy) -> Self {
        self.unresolved_types = policy;
        self
    }

    /// Swap in a different rewrite shape table, e.g. for a generator that
    /// names its request structs differently.
    pub fn with_shape_table(mut self, shapes: ShapeTable) -> Self {
        self.shapes = shapes;
        self
    }

    /// Load the units matched by `patterns`, then rewrite every file named
    /// `file_name` they own. Unchanged files are left alone on disk.
    pub fn transform_packages<I, S>(
        &self,
        file_name: &str,
        patterns: I,
    ) -> Result<TransformSummary, TransformError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut loader_config = self.loader_config.clone();
        loader_config.tolerate_load_errors =
            loader_config.tolerate_load_errors || self.tolerate_load_errors;

        debug!(patterns = ?patterns, "loading workspace");
        let workspace = loader::load(&loader_config, &patterns)?;
        self.transform_workspace(&workspace, file_name)
    }

    /// Rewrite an already-loaded workspace. Split out so callers that load
    /// once can run several passes over it.
    pub fn transform_workspace(
        &self,
        workspace: &Workspace,
        file_name: &str,
    ) -> Result<TransformSummary, TransformError> {
        let matcher = FileMatcher::exact(file_name);
        let config = RewriteConfig {
            group_suffix: &self.group_suffix,
            group_overrides: &self.group_overrides,
            unresolved_types: self.unresolved_types,
            shapes: &self.shapes,
        };

        let mut summary = TransformSummary::default();
        for candidate in locate(workspace, &matcher) {
            summary.files_examined += 1;
            let outcome = rewrite(workspace, candidate.unit, candidate.file, &config)?;
            let wrote = emit(
                self.storage.as_ref(),
                &candidate.file.path,
                &outcome.bytes,
                outcome.changed,
            )?;
            if wrote {
                summary.files_rewritten += 1;
            }
        }
        info!(
            examined = summary.files_examined,
            rewritten = summary.files_rewritten,
            group_suffix = %self.group_suffix,
            "transform complete"
        );
        Ok(summary)
    }
}
