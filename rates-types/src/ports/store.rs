//! Persistent store port.
//!
//! Adapters (Postgres, SQLite) implement this trait. The store is an
//! append-only log of rate observations.

use crate::domain::RateObservation;
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Appends observations.
    ///
    /// All rows of one call MUST be written atomically: implementations wrap
    /// the insert in a single database transaction.
    async fn insert(&self, rows: &[RateObservation]) -> Result<(), RepoError>;
}
