//! Error types for the currency rates service.

use std::time::Duration;

/// Domain-level errors (invalid input values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Invalid currency pair: {0:?} (expected BASE:QUOTE)")]
    InvalidPair(String),
}

/// Upstream rate provider failures.
///
/// Any of these fails the whole group it occurred in, and only that group.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),
}

impl UpstreamError {
    /// Network failure, timeout, or non-success status.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, UpstreamError::MalformedPayload(_))
    }
}

/// Cache store failures. Never fatal: reads degrade to a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_classification() {
        assert!(UpstreamError::HttpStatus(503).is_unavailable());
        assert!(UpstreamError::Timeout(Duration::from_secs(15)).is_unavailable());
        assert!(UpstreamError::Unavailable("connection refused".into()).is_unavailable());
        assert!(!UpstreamError::MalformedPayload("not json".into()).is_unavailable());
    }

    #[test]
    fn test_upstream_error_display() {
        assert_eq!(
            UpstreamError::Timeout(Duration::from_secs(15)).to_string(),
            "Upstream timed out after 15s"
        );
        assert_eq!(
            UpstreamError::HttpStatus(429).to_string(),
            "Upstream returned HTTP 429"
        );
    }

    #[test]
    fn test_repo_error_maps_to_app_error() {
        let err: AppError = RepoError::Database("disk full".into()).into();
        assert!(matches!(err, AppError::Internal(msg) if msg == "disk full"));

        let err: AppError = RepoError::Domain(DomainError::InvalidCurrency("X".into())).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
