//! The generic ledger projector
//!
//! One replay algorithm serves all four sub-ledgers (account, customer,
//! supplier, item). A [`TransactionSource`] strategy supplies signed
//! movements for a subject; the projector folds everything before the
//! window into the opening balance and assigns a running balance to every
//! row inside it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::DateRange;
use domain_ledger::DocumentType;

/// A signed transaction against one subject, before windowing
#[derive(Debug, Clone)]
pub struct Movement {
    pub date: NaiveDate,
    pub doc_type: DocumentType,
    pub doc_number: String,
    pub description: String,
    /// Signed amount; positive follows the ledger's sign convention
    /// (debt/stock increases positive)
    pub amount: Decimal,
}

/// One row of a computed ledger, with its running balance
///
/// Transient: produced fresh on every query, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub doc_type: DocumentType,
    pub doc_number: String,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

/// A computed ledger: opening balance plus movement rows
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub range: DateRange,
    pub opening_balance: Decimal,
    pub rows: Vec<LedgerRow>,
}

impl LedgerView {
    /// The balance after the last movement (the opening balance when the
    /// window is empty)
    pub fn closing_balance(&self) -> Decimal {
        self.rows
            .last()
            .map(|row| row.balance)
            .unwrap_or(self.opening_balance)
    }
}

/// Supplies the signed movements of one subject, in discovery order
///
/// Implementations return every movement regardless of date; windowing is
/// the projector's job. Discovery order is the tie-break for rows sharing a
/// date, so implementations must be deterministic.
pub trait TransactionSource {
    type Subject;

    fn movements_for(&self, subject: &Self::Subject) -> Vec<Movement>;
}

/// The generic replay engine
pub struct LedgerProjector;

impl LedgerProjector {
    /// Projects a subject's ledger over a date range
    ///
    /// `opening_balance` is the balance carried from before the transaction
    /// source begins (e.g. a product's opening stock); movements dated
    /// before the window are folded on top of it.
    pub fn project<S: TransactionSource>(
        source: &S,
        subject: &S::Subject,
        range: DateRange,
        opening_balance: Decimal,
    ) -> LedgerView {
        compute_ledger(source.movements_for(subject), range, opening_balance)
    }
}

/// Replays movements into an opening balance and running-balance rows
pub fn compute_ledger(
    movements: Vec<Movement>,
    range: DateRange,
    opening_balance: Decimal,
) -> LedgerView {
    let before: Decimal = movements
        .iter()
        .filter(|m| m.date < range.start)
        .map(|m| m.amount)
        .sum();
    let opening = opening_balance + before;

    let mut window: Vec<Movement> = movements
        .into_iter()
        .filter(|m| range.contains(m.date))
        .collect();
    // Stable sort: movements sharing a date keep discovery order. The
    // tie-break only affects the printed intermediate balances, never the
    // closing balance.
    window.sort_by_key(|m| m.date);

    let mut running = opening;
    let rows = window
        .into_iter()
        .map(|m| {
            running += m.amount;
            let (debit, credit) = if m.amount >= Decimal::ZERO {
                (m.amount, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -m.amount)
            };
            LedgerRow {
                date: m.date,
                doc_type: m.doc_type,
                doc_number: m.doc_number,
                description: m.description,
                debit,
                credit,
                balance: running,
            }
        })
        .collect();

    LedgerView {
        range,
        opening_balance: opening,
        rows,
    }
}
