//! Journal entries and their lines
//!
//! A journal entry is a balanced set of debit/credit lines recorded against
//! accounts on a calendar date. Entries are immutable once posted; the only
//! correction mechanism is an offsetting reversal entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, BusinessId, JournalEntryId, Money};

use crate::documents::{DocumentRef, DocumentType};

/// Description prefix marking period-closing entries
///
/// Kept verbatim from the original system ("period closing") because the
/// stored data identifies closing entries by this tag.
pub const CLOSING_TAG: &str = "Mbyllje Periudhe";

/// A single debit or credit against one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account the line posts to
    pub account_id: AccountId,
    /// Optional line-level description
    pub description: Option<String>,
    /// Debit amount (non-negative)
    pub debit: Money,
    /// Credit amount (non-negative)
    pub credit: Money,
}

impl JournalLine {
    /// Creates a debit line
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            description: None,
            debit: amount,
            credit: Money::zero(amount.currency()),
        }
    }

    /// Creates a credit line
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            description: None,
            debit: Money::zero(amount.currency()),
            credit: amount,
        }
    }

    /// Adds a description to the line
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Signed amount of the line: debit minus credit
    pub fn signed_amount(&self) -> Decimal {
        self.debit.amount() - self.credit.amount()
    }

    /// A line counts toward the entry only if it moves a non-negative,
    /// nonzero amount on at least one side
    pub fn is_effective(&self) -> bool {
        if self.debit.is_negative() || self.credit.is_negative() {
            return false;
        }
        !(self.debit.is_zero() && self.credit.is_zero())
    }
}

/// An entry waiting to be posted
///
/// Built either by hand (manual journal entries) or by the automatic
/// posting helpers; validation happens at post time, in the ledger.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub recorded_by: String,
    pub source: Option<DocumentRef>,
}

impl EntryDraft {
    /// Creates a new draft dated on the given day
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            description: description.into(),
            lines: Vec::new(),
            recorded_by: "system".to_string(),
            source: None,
        }
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(JournalLine::debit(account_id, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(JournalLine::credit(account_id, amount));
        self
    }

    /// Adds a prepared line
    pub fn line(mut self, line: JournalLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Sets who recorded the entry
    pub fn recorded_by(mut self, user: impl Into<String>) -> Self {
        self.recorded_by = user.into();
        self
    }

    /// Links the entry to the business document that produced it
    pub fn with_source(mut self, source: DocumentRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the lines that survive the effectiveness filter
    pub fn effective_lines(&self) -> Vec<JournalLine> {
        self.lines
            .iter()
            .filter(|l| l.is_effective())
            .cloned()
            .collect()
    }
}

/// A posted, immutable journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: JournalEntryId,
    /// Human-facing number, e.g. `VEP-2024-00087`
    pub number: String,
    /// Owning business
    pub business_id: BusinessId,
    /// Business date of the entry
    pub date: NaiveDate,
    /// Description
    pub description: String,
    /// Balanced lines
    pub lines: Vec<JournalLine>,
    /// Source document, when posted automatically
    pub source: Option<DocumentRef>,
    /// Who recorded the entry
    pub recorded_by: String,
    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Sum of all debit amounts
    pub fn total_debits(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit.amount()).sum()
    }

    /// Sum of all credit amounts
    pub fn total_credits(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit.amount()).sum()
    }

    /// Returns true if debits equal credits within the given tolerance
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        (self.total_debits() - self.total_credits()).abs() <= tolerance
    }

    /// Returns true if this entry was produced by a period closing
    pub fn is_closing_entry(&self) -> bool {
        self.description.starts_with(CLOSING_TAG)
    }

    /// The document reference ledger projections display for this entry
    pub fn document_ref(&self) -> DocumentRef {
        self.source
            .clone()
            .unwrap_or_else(|| DocumentRef::new(DocumentType::Journal, &self.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::new(amount, Currency::ALL)
    }

    #[test]
    fn test_line_effectiveness_filter() {
        let account = AccountId::new();

        assert!(JournalLine::debit(account, money(dec!(10))).is_effective());
        assert!(!JournalLine::debit(account, money(dec!(0))).is_effective());
        assert!(!JournalLine::credit(account, money(dec!(-5))).is_effective());
    }

    #[test]
    fn test_signed_amount() {
        let account = AccountId::new();

        assert_eq!(
            JournalLine::debit(account, money(dec!(10))).signed_amount(),
            dec!(10)
        );
        assert_eq!(
            JournalLine::credit(account, money(dec!(10))).signed_amount(),
            dec!(-10)
        );
    }

    #[test]
    fn test_draft_collects_lines() {
        let a = AccountId::new();
        let b = AccountId::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let draft = EntryDraft::new(date, "Test")
            .debit(a, money(dec!(100)))
            .credit(b, money(dec!(100)))
            .line(JournalLine::debit(a, money(dec!(0))));

        assert_eq!(draft.lines.len(), 3);
        assert_eq!(draft.effective_lines().len(), 2);
    }

    #[test]
    fn test_closing_tag_detection() {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            number: "VEP-2024-00001".into(),
            business_id: BusinessId::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            description: format!("{CLOSING_TAG} 2024-01-31"),
            lines: vec![],
            source: None,
            recorded_by: "system".into(),
            recorded_at: Utc::now(),
        };

        assert!(entry.is_closing_entry());
    }
}
