//! Selection of candidate files from a loaded workspace.

use std::fmt;

use refpatch_loader::{CompilationUnit, FileArtifact, Workspace};

/// Predicate over bare file names deciding which artifacts are selected.
///
/// The generated-file convention is exact-name matching, but any predicate
/// (glob, regex) slots in via [`FileMatcher::predicate`].
pub enum FileMatcher {
    Exact(String),
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl FileMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Exact(name) => name == file_name,
            Self::Predicate(f) => f(file_name),
        }
    }
}

impl fmt::Debug for FileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A selected file together with the unit that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub unit: &'a CompilationUnit,
    pub file: &'a FileArtifact,
}

/// Select every matching file across the workspace.
///
/// Order is deterministic: units in import-path order, files in file-name
/// order, exactly as the loader yields them.
pub fn locate<'a>(workspace: &'a Workspace, matcher: &FileMatcher) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();
    for unit in workspace.units() {
        for file in &unit.files {
            if matcher.matches(file.file_name()) {
                candidates.push(Candidate { unit, file });
            }
        }
    }
    candidates
}
