//! Ledger domain errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;

use crate::settings::AccountRole;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account number already used within the business
    #[error("Duplicate account number: {0}")]
    DuplicateAccountNumber(String),

    /// System accounts keep their type for the lifetime of the business
    #[error("System account {0} cannot change type")]
    SystemAccountTypeLocked(String),

    /// System accounts cannot be deleted
    #[error("System account {0} cannot be deleted")]
    SystemAccountProtected(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Fewer than two effective lines remained after filtering
    #[error("Journal entry needs at least two effective lines, found {valid}")]
    InsufficientLines { valid: usize },

    /// Entry dated at or before the closing watermark
    #[error("Period closed: {date} is on or before the watermark {closed_through}")]
    PeriodClosed {
        date: NaiveDate,
        closed_through: NaiveDate,
    },

    /// Debits and credits differ beyond tolerance
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },

    /// Balanced, but worth nothing
    #[error("Journal entry has zero value")]
    ZeroValueEntry,

    /// No account is mapped (or the mapped number does not exist) for a role
    #[error("No account resolved for role {0}")]
    AccountNotResolved(AccountRole),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Money arithmetic error
    #[error(transparent)]
    Money(#[from] MoneyError),
}
