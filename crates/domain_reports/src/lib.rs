//! Reporting Domain - Ledger Projections and Financial Statements
//!
//! This crate only *reads* the journal and the document archive. One
//! generic replay engine ([`projector::LedgerProjector`]) serves the
//! account, customer, supplier, and item ledgers through interchangeable
//! [`projector::TransactionSource`] strategies; the statement builder
//! derives balance sheet, profit & loss, cash flow, and trial balance from
//! the same journal lines.

pub mod error;
pub mod projector;
pub mod sources;
pub mod statements;

pub use error::{ReportError, SubjectKind};
pub use projector::{compute_ledger, LedgerProjector, LedgerRow, LedgerView, Movement, TransactionSource};
pub use sources::{
    AccountLedgerSource, CustomerLedgerSource, CustomerRef, ItemLedgerSource, SupplierLedgerSource,
};
pub use statements::{
    BalanceSheet, CashFlow, FinancialStatementBuilder, ProfitAndLoss, StatementLine, TrialBalance,
    TrialBalanceEntry,
};
