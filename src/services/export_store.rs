//! ExportStore: per-branch export configuration backed by SQLite. Branch
//! names are resolved through a [`BranchResolver`] on the same transaction
//! that reads or writes `catalog_branches_export`.

use crate::{
    models::{
        branch::BranchId,
        export_configuration::{ExportConfiguration, ExportConfigurationForBranch},
    },
    services::branch_resolver::BranchResolver,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("branch `{branch}` not found in repository `{repository}`")]
    BranchNotFound { repository: String, branch: String },
    #[error("no export configuration for branch `{branch}` in repository `{repository}`")]
    ConfigurationNotFound { repository: String, branch: String },
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// ExportStore provides the three export configuration operations:
/// - `get` one branch's configuration
/// - `put` (upsert) one branch's configuration
/// - `list_all` configured branches
///
/// Cheap to clone; clones share the pool and the resolver.
#[derive(Clone)]
pub struct ExportStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    resolver: Arc<dyn BranchResolver>,
}

impl ExportStore {
    pub fn new(db: Arc<SqlitePool>, resolver: Arc<dyn BranchResolver>) -> Self {
        Self { db, resolver }
    }

    /// Fetch the export configuration of `branch` in `repository`.
    ///
    /// Returns BranchNotFound if the branch does not resolve, and
    /// ConfigurationNotFound if it resolves but was never configured.
    pub async fn get(&self, repository: &str, branch: &str) -> StoreResult<ExportConfiguration> {
        let mut tx = self.db.begin().await?;
        let branch_id = self.resolve_current(&mut *tx, repository, branch).await?;
        debug!(repository, branch, %branch_id, "get export configuration");

        let cfg = sqlx::query_as::<_, ExportConfiguration>(
            "SELECT export_path, export_status_path, last_keys_in_prefix_regexp
             FROM catalog_branches_export
             WHERE branch_id = ?",
        )
        .bind(branch_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        cfg.ok_or_else(|| StoreError::ConfigurationNotFound {
            repository: repository.to_string(),
            branch: branch.to_string(),
        })
    }

    /// Set the export configuration of `branch` in `repository`, replacing
    /// all fields of any existing one.
    ///
    /// Resolution and the upsert share one `BEGIN IMMEDIATE` transaction.
    /// The upsert only writes if the resolved id still names
    /// `repository`/`branch`; otherwise the resolver entry is dropped and the
    /// branch resolved once more. BranchNotFound means nothing was written.
    pub async fn put(
        &self,
        repository: &str,
        branch: &str,
        cfg: &ExportConfiguration,
    ) -> StoreResult<()> {
        let mut tx = self.db.begin_with("BEGIN IMMEDIATE").await?;
        let branch_id = self.resolver.resolve(&mut *tx, repository, branch).await?;
        debug!(repository, branch, %branch_id, ?cfg, "put export configuration");

        if upsert(&mut *tx, branch_id, repository, branch, cfg).await? == 0 {
            self.resolver.invalidate(repository, branch);
            let fresh_id = self.resolver.resolve(&mut *tx, repository, branch).await?;
            debug!(repository, branch, stale = %branch_id, %fresh_id, "re-resolved branch");

            if upsert(&mut *tx, fresh_id, repository, branch, cfg).await? == 0 {
                // Dropping `tx` rolls back.
                return Err(StoreError::BranchNotFound {
                    repository: repository.to_string(),
                    branch: branch.to_string(),
                });
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// List every configured branch with its repository and branch names.
    ///
    /// Row order is unspecified. An empty store yields an empty vector; any
    /// row that fails to decode fails the whole call.
    pub async fn list_all(&self) -> StoreResult<Vec<ExportConfigurationForBranch>> {
        let rows = sqlx::query_as::<_, ExportConfigurationForBranch>(
            "SELECT r.name AS repository, b.name AS branch,
                    e.export_path, e.export_status_path, e.last_keys_in_prefix_regexp
             FROM catalog_branches_export e
             JOIN catalog_branches b ON e.branch_id = b.branch_id
             JOIN catalog_repositories r ON b.repository_id = r.id",
        )
        .fetch_all(&*self.db)
        .await?;
        debug!(count = rows.len(), "listed export configurations");
        Ok(rows)
    }

    /// Resolve `branch`, resolving again from scratch if the id the resolver
    /// returned no longer names `repository`/`branch`.
    async fn resolve_current(
        &self,
        conn: &mut SqliteConnection,
        repository: &str,
        branch: &str,
    ) -> StoreResult<BranchId> {
        let branch_id = self.resolver.resolve(&mut *conn, repository, branch).await?;
        if names_branch(&mut *conn, branch_id, repository, branch).await? {
            return Ok(branch_id);
        }

        debug!(repository, branch, stale = %branch_id, "resolved id names another branch");
        self.resolver.invalidate(repository, branch);
        self.resolver.resolve(conn, repository, branch).await
    }
}

/// True if `branch_id` is currently the id of `branch` in `repository`.
async fn names_branch(
    conn: &mut SqliteConnection,
    branch_id: BranchId,
    repository: &str,
    branch: &str,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(
            SELECT 1
            FROM catalog_branches b
            JOIN catalog_repositories r ON b.repository_id = r.id
            WHERE b.branch_id = ? AND b.name = ? AND r.name = ?
        )",
    )
    .bind(branch_id)
    .bind(branch)
    .bind(repository)
    .fetch_one(conn)
    .await?;
    Ok(exists == 1)
}

/// Insert or replace the configuration row of `branch_id`, provided the id
/// still belongs to `repository`/`branch`. Returns the rows written (0 or 1).
async fn upsert(
    conn: &mut SqliteConnection,
    branch_id: BranchId,
    repository: &str,
    branch: &str,
    cfg: &ExportConfiguration,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO catalog_branches_export (
            branch_id, export_path, export_status_path, last_keys_in_prefix_regexp
        )
        SELECT b.branch_id, ?, ?, ?
        FROM catalog_branches b
        JOIN catalog_repositories r ON b.repository_id = r.id
        WHERE b.branch_id = ? AND b.name = ? AND r.name = ?
        ON CONFLICT (branch_id) DO UPDATE SET
            export_path = excluded.export_path,
            export_status_path = excluded.export_status_path,
            last_keys_in_prefix_regexp = excluded.last_keys_in_prefix_regexp
        "#,
    )
    .bind(&cfg.path)
    .bind(&cfg.status_path)
    .bind(cfg.last_keys_in_prefix_regexp.as_deref())
    .bind(branch_id)
    .bind(branch)
    .bind(repository)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
