//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;

use rates_types::{Pair, RateObservation, RateStore, RepoError};

use crate::types::PgRateRow;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/postgres/0001_create_currency_rates.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the newest observations of a pair, newest first.
    pub async fn history(&self, pair: Pair, limit: i64) -> Result<Vec<RateObservation>, RepoError> {
        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT base_currency, quote_currency, rate, fetched_at FROM currency_rates
               WHERE base_currency = $1 AND quote_currency = $2
               ORDER BY fetched_at DESC, id DESC
               LIMIT $3"#,
        )
        .bind(pair.base.as_str())
        .bind(pair.quote.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }
}

#[async_trait]
impl RateStore for PostgresRepo {
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
                   VALUES ($1, $2, $3, $4)"#,
            )
            .bind(row.base.as_str())
            .bind(row.quote.as_str())
            .bind(row.rate)
            .bind(row.fetched_at)
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
