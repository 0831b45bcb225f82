//! Closing domain errors

use thiserror::Error;

use domain_ledger::LedgerError;

/// Errors that can occur while closing a period
#[derive(Debug, Error)]
pub enum ClosingError {
    /// The retained-earnings role is unmapped or points at a missing account
    #[error("No retained earnings account is configured")]
    MissingRetainedEarningsAccount,

    /// The ledger has no entries, so there is no period to close
    #[error("Nothing to close: the ledger is empty")]
    NothingToClose,

    /// The synthesized closing entry failed ledger validation
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
