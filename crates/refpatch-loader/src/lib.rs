//! Workspace loading for generated API packages.
//!
//! A compilation unit is a directory carrying a unit manifest
//! (`package.toml` by default) that names its import path, its API version
//! and an alias table pointing at the units it references. The loader scans
//! directory patterns for such units, harvests the type names each unit
//! declares and assembles the cross-unit provenance graph the rewriter
//! queries: given `alias::Name` as seen from one unit, which unit declared
//! `Name`.
//!
//! Loading is best-effort when error tolerance is enabled: a unit that fails
//! to resolve keeps its diagnostics attached and its types simply never
//! resolve, so downstream rewriting skips them instead of guessing.

mod manifest;
mod workspace;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use manifest::{UnitManifest, DEFAULT_MANIFEST_NAME};
pub use workspace::{CompilationUnit, FileArtifact, LoadDiagnostic, Workspace};

/// Loader configuration, threaded explicitly through every load.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base directory the load patterns are resolved against. Defaults to
    /// the current working directory.
    pub workspace_root: Option<PathBuf>,

    /// File name that marks a directory as a compilation unit.
    pub manifest_name: String,

    /// When true, units with load diagnostics are returned with the
    /// diagnostics attached instead of aborting the load.
    pub tolerate_load_errors: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            tolerate_load_errors: false,
        }
    }
}

/// Errors raised while loading a workspace.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid load pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to expand load pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid unit manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("import path {import_path:?} declared by more than one unit (second at {})", dir.display())]
    DuplicateImportPath { import_path: String, dir: PathBuf },

    #[error("unit {import_path:?} failed to load: {message}")]
    Diagnostic {
        import_path: String,
        message: String,
    },
}

/// Load every compilation unit matched by `patterns`.
///
/// Patterns are directory globs resolved against the configured workspace
/// root; a matched directory is a unit iff it contains the manifest file.
/// Units are returned in import-path order, their files in file-name order,
/// so repeated loads of the same tree are deterministic.
pub fn load(config: &LoaderConfig, patterns: &[String]) -> Result<Workspace, LoadError> {
    let root = config
        .workspace_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut dirs: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let full = root.join(pattern);
        let full = full.to_string_lossy().into_owned();
        let entries = glob::glob(&full).map_err(|source| LoadError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry.map_err(|source| LoadError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
            if path.is_dir() && path.join(&config.manifest_name).is_file() && !dirs.contains(&path)
            {
                dirs.push(path);
            }
        }
    }
    dirs.sort();

    let mut units: BTreeMap<String, CompilationUnit> = BTreeMap::new();
    for dir in &dirs {
        let unit = load_unit(dir, &config.manifest_name)?;
        debug!(
            import_path = %unit.import_path,
            files = unit.files.len(),
            types = unit.declared_types.len(),
            diagnostics = unit.diagnostics.len(),
            "loaded compilation unit"
        );
        if units.contains_key(&unit.import_path) {
            return Err(LoadError::DuplicateImportPath {
                import_path: unit.import_path,
                dir: dir.clone(),
            });
        }
        units.insert(unit.import_path.clone(), unit);
    }

    // Cross-unit pass: an import alias pointing at a unit that was not
    // loaded leaves the referencing unit with an unresolved-import
    // diagnostic.
    let known: BTreeSet<String> = units.keys().cloned().collect();
    for unit in units.values_mut() {
        for (alias, target) in &unit.imports {
            if !known.contains(target) {
                unit.diagnostics.push(LoadDiagnostic {
                    message: format!("unresolved import {alias:?} -> {target:?}"),
                    path: None,
                });
            }
        }
    }

    if !config.tolerate_load_errors {
        for unit in units.values() {
            if let Some(diag) = unit.diagnostics.first() {
                return Err(LoadError::Diagnostic {
                    import_path: unit.import_path.clone(),
                    message: diag.message.clone(),
                });
            }
        }
    }

    Ok(Workspace::from_units(units))
}

/// Load a single unit directory: manifest, raw file artifacts and the
/// declared-type harvest.
fn load_unit(dir: &Path, manifest_name: &str) -> Result<CompilationUnit, LoadError> {
    let manifest_path = dir.join(manifest_name);
    let manifest_text =
        std::fs::read_to_string(&manifest_path).map_err(|source| LoadError::Io {
            path: manifest_path.clone(),
            source,
        })?;
    let manifest: UnitManifest =
        toml::from_str(&manifest_text).map_err(|source| LoadError::Manifest {
            path: manifest_path,
            source,
        })?;

    let mut file_paths: Vec<PathBuf> = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
            file_paths.push(path);
        }
    }
    file_paths.sort();

    let mut files = Vec::with_capacity(file_paths.len());
    let mut declared_types = BTreeSet::new();
    let mut diagnostics = Vec::new();
    for path in file_paths {
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        match harvest_types(&bytes) {
            Ok(names) => declared_types.extend(names),
            Err(message) => diagnostics.push(LoadDiagnostic {
                message,
                path: Some(path.clone()),
            }),
        }
        files.push(FileArtifact { path, bytes });
    }

    Ok(CompilationUnit {
        import_path: manifest.import_path,
        version: manifest.version,
        files,
        declared_types,
        imports: manifest.imports,
        diagnostics,
    })
}

/// Collect the names of top-level type declarations in one source file.
fn harvest_types(bytes: &[u8]) -> Result<Vec<String>, String> {
    let source = std::str::from_utf8(bytes).map_err(|e| format!("source is not UTF-8: {e}"))?;
    let ast = syn::parse_file(source).map_err(|e| format!("source failed to parse: {e}"))?;

    let mut names = Vec::new();
    for item in &ast.items {
        match item {
            syn::Item::Struct(i) => names.push(i.ident.to_string()),
            syn::Item::Enum(i) => names.push(i.ident.to_string()),
            syn::Item::Type(i) => names.push(i.ident.to_string()),
            _ => {}
        }
    }
    Ok(names)
}
