//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use rates_types::{Pair, RateObservation, RateStore, RepoError};

use crate::types::SqliteRateRow;

const MIGRATIONS: &[(&str, &str)] = &[(
    "0001",
    include_str!("../migrations/sqlite/0001_create_currency_rates.sql"),
)];

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as its connection.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        let repo = Self { pool };
        repo.run_migrations().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> anyhow::Result<()> {
        for (name, sql) in MIGRATIONS {
            execute_migration(&self.pool, sql, name).await?;
        }
        Ok(())
    }

    /// Returns the newest observations of a pair, newest first.
    pub async fn history(&self, pair: Pair, limit: i64) -> Result<Vec<RateObservation>, RepoError> {
        let rows: Vec<SqliteRateRow> = sqlx::query_as(
            r#"SELECT base_currency, quote_currency, rate, fetched_at FROM currency_rates
               WHERE base_currency = ? AND quote_currency = ?
               ORDER BY fetched_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(pair.base.as_str())
        .bind(pair.quote.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }

    /// Total number of stored observations.
    pub async fn count(&self) -> Result<i64, RepoError> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM currency_rates"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(count)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    async fn insert(&self, rows: &[RateObservation]) -> Result<(), RepoError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        for row in rows {
            sqlx::query(
                r#"INSERT INTO currency_rates (base_currency, quote_currency, rate, fetched_at)
                   VALUES (?, ?, ?, ?)"#,
            )
            .bind(row.base.as_str())
            .bind(row.quote.as_str())
            .bind(row.rate)
            .bind(row.fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!("Rate observations committed");
        Ok(())
    }
}
