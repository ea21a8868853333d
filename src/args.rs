use clap::Parser;
use std::path::PathBuf;

use refpatch_engine::DEFAULT_RESOLVER_FILE;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// API group suffix that selects which resolution targets get
    /// rewritten (e.g. `aws.upbound.io`).
    #[arg(long, value_name = "SUFFIX")]
    pub group_suffix: String,

    /// File name of the generated resolver files to rewrite.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_RESOLVER_FILE)]
    pub file_pattern: String,

    /// Carry on past compilation units that fail to load; their types are
    /// treated as unresolvable instead of aborting the run.
    #[arg(long, default_value_t = false)]
    pub tolerate_load_errors: bool,

    /// Treat an unresolvable resolution target as a fatal error instead of
    /// leaving it untouched.
    #[arg(long, default_value_t = false)]
    pub strict_unresolved: bool,

    /// Base directory the load patterns are resolved against. Defaults to
    /// the current working directory.
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Override the API group derived for a unit, as IMPORT_PATH=GROUP.
    /// Can be provided multiple times.
    #[arg(long, value_name = "IMPORT_PATH=GROUP")]
    pub group_override: Vec<String>,

    /// Glob patterns selecting the compilation unit directories to load
    /// (e.g. `apis/*`).
    #[arg(required = true, value_name = "PATTERN")]
    pub patterns: Vec<String>,
}
