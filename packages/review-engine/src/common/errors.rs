use thiserror::Error;

/// Errors surfaced by the vote ledger, aggregation engine and claim resolver.
///
/// `NotFound`, `InvalidInput` and `InvalidState` are client errors and must not
/// be retried. `ConcurrencyConflict` is safe to retry by re-issuing the same
/// call. `StoreUnavailable` may be retried by the caller with backoff.
#[derive(Error, Debug)]
pub enum ReviewEngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type EngineResult<T> = std::result::Result<T, ReviewEngineError>;

impl ReviewEngineError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", what, id))
    }

    /// Whether re-issuing the same logical call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict(_) | Self::StoreUnavailable(_)
        )
    }
}

// Postgres SQLSTATE codes that mean "another transaction got there first".
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for ReviewEngineError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) | Some(UNIQUE_VIOLATION) => {
                    Self::ConcurrencyConflict(db_err.message().to_string())
                }
                _ => Self::StoreUnavailable(err.to_string()),
            },
            _ => Self::StoreUnavailable(err.to_string()),
        }
    }
}
