//! End-to-end transformer runs over on-disk workspaces.
//!
//! Each test lays out a real workspace of compilation units in a temp
//! directory, loads it through the real loader, and captures writes in an
//! in-memory storage so the emitted bytes (and the absence of emission)
//! can be asserted exactly.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use refpatch::{
    LoaderConfig, MemStorage, Resolver, Storage, TransformError, UnresolvedTypePolicy,
    DEFAULT_RESOLVER_FILE,
};

const GENERATED: &str = include_str!("testdata/SuccessfulTransformation.rs.txt");
const TRANSFORMED: &str = include_str!("testdata/SuccessfulTransformation.transformed.rs.txt");

fn write_unit(
    root: &Path,
    rel_dir: &str,
    import_path: &str,
    version: &str,
    imports: &[(&str, &str)],
    sources: &[(&str, &str)],
) {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    let mut manifest = format!("import-path = \"{import_path}\"\nversion = \"{version}\"\n");
    if !imports.is_empty() {
        manifest.push_str("\n[imports]\n");
        for (alias, target) in imports {
            manifest.push_str(&format!("{alias} = \"{target}\"\n"));
        }
    }
    fs::write(dir.join("package.toml"), manifest).unwrap();
    for (name, contents) in sources {
        fs::write(dir.join(name), contents).unwrap();
    }
}

/// The standard fixture workspace: an rds unit whose resolver file
/// references its own types plus types from ec2, kms (both in-suffix) and
/// net (a different group suffix).
fn write_workspace(root: &Path, resolver_source: &str) {
    write_unit(
        root,
        "apis/rds",
        "fake/apis/rds.aws.upbound.io",
        "v1beta1",
        &[
            ("ec2", "fake/apis/ec2.aws.upbound.io"),
            ("kms", "fake/apis/kms.aws.upbound.io"),
            ("net", "fake/apis/net.k8s.example.org"),
        ],
        &[
            (
                "zz_generated_types.rs",
                "pub struct SubnetGroup;\npub struct SubnetGroupList;\npub struct SubnetGroupPolicy;\npub struct SubnetGroupPolicyList;\n",
            ),
            (DEFAULT_RESOLVER_FILE, resolver_source),
        ],
    );
    write_unit(
        root,
        "apis/ec2",
        "fake/apis/ec2.aws.upbound.io",
        "v1beta1",
        &[],
        &[(
            "zz_generated_types.rs",
            "pub struct Vpc;\npub struct VpcList;\npub struct SecurityGroup;\npub struct SecurityGroupList;\n",
        )],
    );
    write_unit(
        root,
        "apis/kms",
        "fake/apis/kms.aws.upbound.io",
        "v1beta1",
        &[],
        &[(
            "zz_generated_types.rs",
            "pub struct Key;\npub struct KeyList;\n",
        )],
    );
    write_unit(
        root,
        "apis/net",
        "fake/apis/net.k8s.example.org",
        "v1alpha1",
        &[],
        &[(
            "zz_generated_types.rs",
            "pub struct Peer;\npub struct PeerList;\n",
        )],
    );
}

fn resolver_for(root: &Path, storage: Arc<MemStorage>, tolerate: bool) -> Resolver {
    Resolver::new(storage, "aws.upbound.io", tolerate, None).with_loader_config(LoaderConfig {
        workspace_root: Some(root.to_path_buf()),
        ..LoaderConfig::default()
    })
}

fn resolver_path(root: &Path) -> PathBuf {
    root.join("apis/rds").join(DEFAULT_RESOLVER_FILE)
}

#[test]
fn test_successful_transformation() {
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), GENERATED);

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), false);
    let summary = resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap();

    assert_eq!(summary.files_examined, 1);
    assert_eq!(summary.files_rewritten, 1);

    let written = storage.read_file(&resolver_path(tmp.path())).unwrap();
    assert_eq!(String::from_utf8(written).unwrap(), TRANSFORMED);
}

#[test]
fn test_transformation_is_idempotent() {
    // A workspace whose resolver file is already in the transformed form
    // produces no writes at all.
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), TRANSFORMED);

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), false);
    let summary = resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap();

    assert_eq!(summary.files_examined, 1);
    assert_eq!(summary.files_rewritten, 0);
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_unrelated_files_are_never_written() {
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), GENERATED);

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), false);
    resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap();

    // Only the rds resolver file lands in storage; type files and the
    // other units' contents are untouched.
    assert_eq!(storage.paths(), vec![resolver_path(tmp.path())]);
}

#[test]
fn test_broken_unit_aborts_without_tolerance() {
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), GENERATED);
    write_unit(
        tmp.path(),
        "apis/bad",
        "fake/apis/bad.aws.upbound.io",
        "v1beta1",
        &[],
        &[("broken.rs", "pub struct {")],
    );

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), false);
    let err = resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap_err();
    assert!(matches!(err, TransformError::Load(_)));
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_broken_unit_tolerated_and_its_types_left_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), GENERATED);
    // The ec2 unit now fails to parse; with tolerance on, the run still
    // completes but targets resolving into ec2 keep their static form.
    fs::write(
        tmp.path().join("apis/ec2/zz_generated_types.rs"),
        "pub struct {",
    )
    .unwrap();

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), true);
    let summary = resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap();
    assert_eq!(summary.files_rewritten, 1);

    let written = storage.read_file(&resolver_path(tmp.path())).unwrap();
    let text = String::from_utf8(written).unwrap();
    assert!(text.contains("ResolutionTarget::of::<ec2::Vpc, ec2::VpcList>()"));
    assert!(text.contains(
        "reference::ResolutionTarget::managed(\"kms.aws.upbound.io\", \"v1beta1\", \"Key\", \"KeyList\")"
    ));
}

#[test]
fn test_strict_unresolved_policy_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    // The kms unit loads fine but no longer declares Key, so the kms::Key
    // target has no provenance.
    write_workspace(tmp.path(), GENERATED);
    fs::write(
        tmp.path().join("apis/kms/zz_generated_types.rs"),
        "pub struct Grant;\npub struct GrantList;\n",
    )
    .unwrap();

    let storage = Arc::new(MemStorage::default());
    let resolver = resolver_for(tmp.path(), storage.clone(), false)
        .with_unresolved_type_policy(UnresolvedTypePolicy::Error);
    let err = resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap_err();
    assert!(matches!(err, TransformError::UnresolvedType { .. }));
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_group_override_applies_to_emitted_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    write_workspace(tmp.path(), GENERATED);

    let mut overrides = BTreeMap::new();
    overrides.insert(
        "fake/apis/ec2.aws.upbound.io".to_string(),
        "compute.aws.upbound.io".to_string(),
    );
    let storage = Arc::new(MemStorage::default());
    let resolver = Resolver::new(storage.clone(), "aws.upbound.io", false, Some(overrides))
        .with_loader_config(LoaderConfig {
            workspace_root: Some(tmp.path().to_path_buf()),
            ..LoaderConfig::default()
        });
    resolver
        .transform_packages(DEFAULT_RESOLVER_FILE, ["apis/*"])
        .unwrap();

    let written = storage.read_file(&resolver_path(tmp.path())).unwrap();
    let text = String::from_utf8(written).unwrap();
    assert!(text.contains(
        "ResolutionTarget::managed(\"compute.aws.upbound.io\", \"v1beta1\", \"Vpc\", \"VpcList\")"
    ));
}
