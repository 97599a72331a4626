//! Branch resolution: (repository, branch) names to a stable `BranchId`.
//!
//! The store only depends on the [`BranchResolver`] trait. Resolution runs on
//! the connection of the caller's transaction so that the id it returns and
//! the mutation that follows observe the same snapshot.

use crate::{
    models::branch::BranchId,
    services::export_store::{StoreError, StoreResult},
};
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::SqliteConnection;
use std::time::{Duration, Instant};
use tracing::debug;

#[async_trait]
pub trait BranchResolver: Send + Sync {
    /// Look up the id of `branch` in `repository`.
    ///
    /// Fails with [`StoreError::BranchNotFound`] when no such branch exists.
    async fn resolve(
        &self,
        conn: &mut SqliteConnection,
        repository: &str,
        branch: &str,
    ) -> StoreResult<BranchId>;

    /// Forget anything remembered about `branch`. Called when the store finds
    /// the resolved id no longer naming that branch.
    fn invalidate(&self, _repository: &str, _branch: &str) {}
}

/// Resolves branches against `catalog_branches`, remembering hits for `ttl`.
///
/// A zero `ttl` disables caching. Misses are never cached.
pub struct CachedBranchResolver {
    ttl: Duration,
    entries: DashMap<(String, String), (BranchId, Instant)>,
}

impl CachedBranchResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<BranchId> {
        let (id, at) = *self.entries.get(key)?.value();
        if at.elapsed() < self.ttl {
            Some(id)
        } else {
            None
        }
    }
}

#[async_trait]
impl BranchResolver for CachedBranchResolver {
    async fn resolve(
        &self,
        conn: &mut SqliteConnection,
        repository: &str,
        branch: &str,
    ) -> StoreResult<BranchId> {
        let key = (repository.to_string(), branch.to_string());
        if let Some(id) = self.cached(&key) {
            debug!(repository, branch, %id, "branch id served from cache");
            return Ok(id);
        }

        let id = sqlx::query_scalar::<_, BranchId>(
            "SELECT b.branch_id
             FROM catalog_branches b
             JOIN catalog_repositories r ON b.repository_id = r.id
             WHERE r.name = ? AND b.name = ?",
        )
        .bind(repository)
        .bind(branch)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::BranchNotFound {
            repository: repository.to_string(),
            branch: branch.to_string(),
        })?;

        if !self.ttl.is_zero() {
            self.entries.insert(key, (id, Instant::now()));
        }
        Ok(id)
    }

    fn invalidate(&self, repository: &str, branch: &str) {
        self.entries
            .remove(&(repository.to_string(), branch.to_string()));
    }
}
