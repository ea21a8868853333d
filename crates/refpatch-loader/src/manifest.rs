//! Unit manifest format.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Default manifest file name marking a directory as a compilation unit.
pub const DEFAULT_MANIFEST_NAME: &str = "package.toml";

/// The manifest carried by every generated API package.
///
/// ```toml
/// import-path = "fake/apis/rds.aws.upbound.io"
/// version = "v1beta1"
///
/// [imports]
/// ec2 = "fake/apis/ec2.aws.upbound.io"
/// kms = "fake/apis/kms.aws.upbound.io"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UnitManifest {
    /// The unit's import path; the group-suffix rule matches against its
    /// trailing characters.
    pub import_path: String,

    /// API version of the types this unit declares (e.g. `v1beta1`).
    pub version: String,

    /// Alias -> import path of every unit this one references.
    #[serde(default)]
    pub imports: BTreeMap<String, String>,
}
