//! Command-line front end for the reference-resolver transformer.
//!
//! Loads the compilation units matched by the given patterns, rewrites
//! every generated resolver file they own, and writes back only the files
//! whose bytes actually changed.
//!
//! Example:
//!
//! ```text
//! refpatch --group-suffix aws.upbound.io --workspace-root ./provider 'apis/*'
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;

use refpatch::args::Args;
use refpatch::{LoaderConfig, OsStorage, Resolver, UnresolvedTypePolicy};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("refpatch=info")),
        )
        .init();

    let args = Args::parse();
    let overrides = parse_group_overrides(&args.group_override)?;

    let loader_config = LoaderConfig {
        workspace_root: args.workspace_root.clone(),
        ..LoaderConfig::default()
    };
    let policy = if args.strict_unresolved {
        UnresolvedTypePolicy::Error
    } else {
        UnresolvedTypePolicy::Skip
    };

    let resolver = Resolver::new(
        Arc::new(OsStorage::new()),
        &args.group_suffix,
        args.tolerate_load_errors,
        Some(overrides),
    )
    .with_loader_config(loader_config)
    .with_unresolved_type_policy(policy);

    let summary = resolver.transform_packages(&args.file_pattern, args.patterns.clone())?;
    println!(
        "examined {} resolver file(s), rewrote {}",
        summary.files_examined, summary.files_rewritten
    );
    Ok(())
}

fn parse_group_overrides(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut overrides = BTreeMap::new();
    for entry in raw {
        let (import_path, group) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --group-override {entry:?}, expected IMPORT_PATH=GROUP"))?;
        overrides.insert(import_path.to_string(), group.to_string());
    }
    Ok(overrides)
}
