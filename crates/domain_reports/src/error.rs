//! Reporting domain errors

use std::fmt;
use thiserror::Error;

/// The entity kinds a ledger projection can be computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Account,
    Customer,
    Supplier,
    Item,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubjectKind::Account => "account",
            SubjectKind::Customer => "customer",
            SubjectKind::Supplier => "supplier",
            SubjectKind::Item => "item",
        };
        write!(f, "{label}")
    }
}

/// Errors that can occur in the reporting domain
#[derive(Debug, Error)]
pub enum ReportError {
    /// Ledger query for an unknown account/customer/supplier/item
    #[error("Unknown {kind}: {key}")]
    SubjectNotFound { kind: SubjectKind, key: String },
}

impl ReportError {
    pub fn subject_not_found(kind: SubjectKind, key: impl fmt::Display) -> Self {
        ReportError::SubjectNotFound {
            kind,
            key: key.to_string(),
        }
    }
}
