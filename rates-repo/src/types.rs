//! Database row types for SQLite and PostgreSQL.

use sqlx::FromRow;

use rates_types::{CurrencyCode, RateObservation, RepoError};

fn parse_code(raw: &str) -> Result<CurrencyCode, RepoError> {
    Ok(raw.trim().parse::<CurrencyCode>()?)
}

/// Rate observation row from SQLite (timestamps stored as RFC 3339 text).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateRow {
    pub base_currency: String,
    pub quote_currency: String,
    pub rate: f64,
    pub fetched_at: String,
}

#[cfg(feature = "sqlite")]
impl SqliteRateRow {
    pub fn into_domain(self) -> Result<RateObservation, RepoError> {
        let fetched_at = chrono::DateTime::parse_from_rfc3339(&self.fetched_at)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(RateObservation {
            base: parse_code(&self.base_currency)?,
            quote: parse_code(&self.quote_currency)?,
            rate: self.rate,
            fetched_at,
        })
    }
}

/// Rate observation row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateRow {
    pub base_currency: String,
    pub quote_currency: String,
    pub rate: f64,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl PgRateRow {
    pub fn into_domain(self) -> Result<RateObservation, RepoError> {
        Ok(RateObservation {
            base: parse_code(&self.base_currency)?,
            quote: parse_code(&self.quote_currency)?,
            rate: self.rate,
            fetched_at: self.fetched_at,
        })
    }
}
