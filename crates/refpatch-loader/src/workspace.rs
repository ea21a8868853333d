//! Loaded workspace model and the cross-unit type provenance graph.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A non-fatal problem recorded against a compilation unit during loading.
///
/// A unit carrying diagnostics is still returned when error tolerance is
/// enabled, but its types are treated as unresolvable: incomplete load
/// information must never classify a type as in-suffix.
#[derive(Debug, Clone)]
pub struct LoadDiagnostic {
    pub message: String,
    /// Source file the diagnostic originated from, when there is one.
    pub path: Option<PathBuf>,
}

/// A source file owned by a compilation unit: its path plus raw bytes.
/// Parsing happens downstream, on demand.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl FileArtifact {
    /// Bare file name, for pattern matching.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// One loaded compilation unit. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Identifier the group-suffix rule matches against
    /// (e.g. `fake/apis/ec2.aws.upbound.io`).
    pub import_path: String,

    /// API version of the declared types (e.g. `v1beta1`).
    pub version: String,

    /// Source files, in file-name order.
    pub files: Vec<FileArtifact>,

    /// Names of the top-level types this unit declares.
    pub declared_types: BTreeSet<String>,

    /// Alias -> import path of referenced units, from the manifest.
    pub imports: BTreeMap<String, String>,

    /// Problems recorded during loading; non-empty only when tolerated.
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl CompilationUnit {
    /// Whether this unit declares a type named `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.declared_types.contains(name)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// The unit's API group: the final segment of its import path.
    pub fn api_group(&self) -> &str {
        self.import_path
            .rsplit('/')
            .next()
            .unwrap_or(self.import_path.as_str())
    }
}

/// All loaded units, keyed by import path, plus the provenance lookup the
/// rewriter runs against. Built once per load and queried per declaration.
#[derive(Debug, Default)]
pub struct Workspace {
    units: BTreeMap<String, CompilationUnit>,
}

impl Workspace {
    pub fn from_units(units: BTreeMap<String, CompilationUnit>) -> Self {
        Self { units }
    }

    /// Units in import-path order.
    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.values()
    }

    pub fn get(&self, import_path: &str) -> Option<&CompilationUnit> {
        self.units.get(import_path)
    }

    /// Resolve the declaring unit of a type as written inside `from`:
    /// `alias::Name` goes through the unit's import table, a bare `Name`
    /// must be declared by `from` itself.
    ///
    /// Returns `None` when the alias is unknown, the target unit was not
    /// loaded, the name is not declared there, or the declaring unit
    /// carries load diagnostics (its information is incomplete, so its
    /// types are deliberately unresolvable).
    pub fn resolve_type(
        &self,
        from: &CompilationUnit,
        alias: Option<&str>,
        name: &str,
    ) -> Option<&CompilationUnit> {
        let target = match alias {
            Some(alias) => self.units.get(from.imports.get(alias)?)?,
            None => self.units.get(&from.import_path)?,
        };
        if target.has_diagnostics() {
            return None;
        }
        if !target.declares(name) {
            return None;
        }
        Some(target)
    }
}
