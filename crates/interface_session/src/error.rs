//! Session-level errors
//!
//! Aggregates the domain error types at the surface the UI talks to.

use thiserror::Error;

use core_kernel::StoreError;
use domain_closing::ClosingError;
use domain_ledger::LedgerError;
use domain_reports::ReportError;

/// Errors surfaced by the business session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Closing(#[from] ClosingError),

    /// The store rejected a write; the in-memory mutation was rolled back
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// A record could not be encoded for storage
    #[error("Encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SessionError {
    /// Returns true if retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Persistence(err) if err.is_transient())
    }
}
