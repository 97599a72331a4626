//! Export configuration of a branch.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where and how a branch is exported.
///
/// Stored one per branch in `catalog_branches_export` and passed on the
/// wire as-is. All fields are opaque strings: nothing here validates path
/// shape or pattern syntax.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ExportConfiguration {
    /// Destination URI or prefix the export job writes to.
    #[serde(rename = "exportPath")]
    #[sqlx(rename = "export_path")]
    pub path: String,

    /// URI or prefix the export job reports status to.
    #[serde(rename = "exportStatusPath")]
    #[sqlx(rename = "export_status_path")]
    pub status_path: String,

    /// Pattern of key prefixes already exported; lets the export job skip
    /// repeated scans.
    #[serde(
        rename = "lastKeysInPrefixRegexp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_keys_in_prefix_regexp: Option<String>,
}

/// An export configuration together with the branch it belongs to.
///
/// Read-side projection only, produced by listing.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct ExportConfigurationForBranch {
    pub repository: String,
    pub branch: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub configuration: ExportConfiguration,
}
