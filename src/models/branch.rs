//! Branch identity as seen by the export store.

/// Internal, stable key of a branch (`catalog_branches.branch_id`).
///
/// Distinct from the human-readable branch name; export configuration rows
/// are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct BranchId(pub i64);

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
