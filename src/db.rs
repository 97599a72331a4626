//! SQLite pool construction and schema bootstrap.

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};

/// Schema for the catalog tables read and written by the export store.
const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open a pool against `database_url`, creating the database file (and its
/// parent directory) when it does not exist yet.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let db_path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if !db_path.starts_with(":memory:") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Run the embedded schema statements one by one.
pub async fn run_migrations(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = split_statements(INIT_SQL);

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(&stmt).execute(db).await?;
    }

    Ok(())
}

/// Split a schema script on `;`, dropping `--` comment lines first so their
/// text never ends up inside a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let code = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fixtures shared by the store and handler tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::run_migrations;
    use crate::models::branch::BranchId;
    use sqlx::{SqliteExecutor, SqlitePool, sqlite::SqlitePoolOptions};

    /// A migrated in-memory database.
    ///
    /// Pinned to a single connection that never idles out: every connection
    /// to `sqlite::memory:` is a separate database.
    pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        run_migrations(&pool).await?;
        Ok(pool)
    }

    pub async fn create_repository<'e>(
        db: impl SqliteExecutor<'e>,
        name: &str,
    ) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO catalog_repositories (name) VALUES (?) RETURNING id",
        )
        .bind(name)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    pub async fn create_branch<'e>(
        db: impl SqliteExecutor<'e>,
        repository_id: i64,
        name: &str,
    ) -> anyhow::Result<BranchId> {
        let id = sqlx::query_scalar::<_, BranchId>(
            "INSERT INTO catalog_branches (repository_id, name) VALUES (?, ?) RETURNING branch_id",
        )
        .bind(repository_id)
        .bind(name)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    /// Insert a branch under a chosen id, as if an earlier id had been
    /// handed out again.
    pub async fn create_branch_with_id<'e>(
        db: impl SqliteExecutor<'e>,
        id: BranchId,
        repository_id: i64,
        name: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO catalog_branches (branch_id, repository_id, name) VALUES (?, ?, ?)")
            .bind(id)
            .bind(repository_id)
            .bind(name)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete_branch<'e>(
        db: impl SqliteExecutor<'e>,
        id: BranchId,
    ) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM catalog_branches WHERE branch_id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
