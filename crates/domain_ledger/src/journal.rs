//! The journal ledger
//!
//! Append-only store of balanced journal entries for one business. The
//! ledger enforces the double-entry invariant at write time and the
//! period-closing watermark at every mutation site.
//!
//! # Invariants
//!
//! - Every posted entry balances within [`BALANCE_TOLERANCE`]
//! - No entry is dated at or before the watermark, except closing entries
//! - Entries are never edited; corrections are appended reversals

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::numbering::{self, prefix};
use core_kernel::{AccountId, BusinessId, Currency, JournalEntryId, SequenceRegistry};

use crate::entry::{EntryDraft, JournalEntry, JournalLine};
use crate::error::LedgerError;

/// Tolerance for the debit/credit balance comparison
///
/// Matches the epsilon used by the original system's stored data.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.001);

/// The append-only journal of one business
#[derive(Debug, Clone)]
pub struct JournalLedger {
    business_id: BusinessId,
    currency: Currency,
    entries: Vec<JournalEntry>,
    sequences: SequenceRegistry,
    closed_through: Option<NaiveDate>,
}

impl JournalLedger {
    /// Creates an empty ledger
    pub fn new(business_id: BusinessId, currency: Currency) -> Self {
        Self {
            business_id,
            currency,
            entries: Vec::new(),
            sequences: SequenceRegistry::new(),
            closed_through: None,
        }
    }

    /// Rebuilds a ledger from loaded entries
    ///
    /// Sequence counters are recovered from the stored entry numbers so new
    /// entries continue the existing numbering.
    pub fn from_entries(
        business_id: BusinessId,
        currency: Currency,
        entries: Vec<JournalEntry>,
        closed_through: Option<NaiveDate>,
    ) -> Self {
        let mut sequences = SequenceRegistry::new();
        for entry in &entries {
            if let Some((pfx, year, seq)) = numbering::parse_journal_number(&entry.number) {
                sequences.observe(pfx, year, seq);
            }
        }
        Self {
            business_id,
            currency,
            entries,
            sequences,
            closed_through,
        }
    }

    pub fn business_id(&self) -> BusinessId {
        self.business_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// End date of the last closed period, if any period was closed
    pub fn closed_through(&self) -> Option<NaiveDate> {
        self.closed_through
    }

    /// Moves the watermark. Used by period closing (forward) and by the
    /// session rolling back a failed closing persistence (backward).
    pub fn set_closed_through(&mut self, watermark: Option<NaiveDate>) {
        self.closed_through = watermark;
    }

    /// All posted entries, in posting order
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by its number
    pub fn find(&self, number: &str) -> Option<&JournalEntry> {
        self.entries.iter().find(|e| e.number == number)
    }

    /// Iterates every line posted against an account, in posting order
    pub fn lines_for_account(
        &self,
        account_id: AccountId,
    ) -> impl Iterator<Item = (&JournalEntry, &JournalLine)> {
        self.entries.iter().flat_map(move |entry| {
            entry
                .lines
                .iter()
                .filter(move |line| line.account_id == account_id)
                .map(move |line| (entry, line))
        })
    }

    /// Posts a draft through the full validation sequence
    ///
    /// Validation order:
    /// 1. drop non-effective lines (zero both sides, or negative)
    /// 2. `InsufficientLines` if fewer than 2 remain
    /// 3. `PeriodClosed` if dated at or before the watermark
    /// 4. `Unbalanced` if debits and credits differ beyond tolerance
    /// 5. `ZeroValueEntry` if the balanced total is worth nothing
    /// 6. assign a number, stamp the entry, append
    ///
    /// Nothing is mutated on any failure.
    pub fn post(&mut self, draft: EntryDraft) -> Result<&JournalEntry, LedgerError> {
        self.post_inner(draft, false)
    }

    /// Posts a period-closing entry
    ///
    /// Identical to [`post`](Self::post) except the watermark check is
    /// skipped: the closing entry is dated inside the period it closes,
    /// which is the one sanctioned exception to the watermark rule.
    pub fn post_closing(&mut self, draft: EntryDraft) -> Result<&JournalEntry, LedgerError> {
        self.post_inner(draft, true)
    }

    fn post_inner(
        &mut self,
        draft: EntryDraft,
        allow_closed_period: bool,
    ) -> Result<&JournalEntry, LedgerError> {
        let lines = draft.effective_lines();

        if lines.len() < 2 {
            return Err(LedgerError::InsufficientLines { valid: lines.len() });
        }

        if !allow_closed_period {
            if let Some(closed_through) = self.closed_through {
                if draft.date <= closed_through {
                    return Err(LedgerError::PeriodClosed {
                        date: draft.date,
                        closed_through,
                    });
                }
            }
        }

        let debits: Decimal = lines.iter().map(|l| l.debit.amount()).sum();
        let credits: Decimal = lines.iter().map(|l| l.credit.amount()).sum();

        if (debits - credits).abs() > BALANCE_TOLERANCE {
            return Err(LedgerError::Unbalanced { debits, credits });
        }

        if debits <= BALANCE_TOLERANCE {
            return Err(LedgerError::ZeroValueEntry);
        }

        let year = numbering::fiscal_year(draft.date);
        let seq = self.sequences.next(prefix::JOURNAL, year);

        let entry = JournalEntry {
            id: JournalEntryId::new_v7(),
            number: numbering::journal_number(prefix::JOURNAL, year, seq),
            business_id: self.business_id,
            date: draft.date,
            description: draft.description,
            lines,
            source: draft.source,
            recorded_by: draft.recorded_by,
            recorded_at: Utc::now(),
        };

        self.entries.push(entry);
        Ok(self.entries.last().expect("entry just appended"))
    }

    /// Retracts the most recently appended entry
    ///
    /// Only the session uses this, to undo an in-memory append whose
    /// persistence failed; the entry number is released so the sequence has
    /// no hole. Anything but the latest entry is refused.
    pub fn retract_last(&mut self, number: &str) -> Result<JournalEntry, LedgerError> {
        match self.entries.last() {
            Some(last) if last.number == number => {
                let entry = self.entries.pop().expect("last entry checked above");
                if let Some((pfx, year, seq)) = numbering::parse_journal_number(&entry.number) {
                    self.sequences.release(pfx, year, seq);
                }
                Ok(entry)
            }
            _ => Err(LedgerError::EntryNotFound(number.to_string())),
        }
    }

    /// Appends an entry offsetting a previous one
    ///
    /// History is never edited; this is the correction mechanism for a
    /// document that was deleted or posted in error. The reversal goes
    /// through the normal validation path, watermark included.
    pub fn reverse(
        &mut self,
        number: &str,
        date: NaiveDate,
        recorded_by: &str,
    ) -> Result<&JournalEntry, LedgerError> {
        let original = self
            .find(number)
            .ok_or_else(|| LedgerError::EntryNotFound(number.to_string()))?;

        let mut draft = EntryDraft::new(date, format!("Reversal of {}", original.number))
            .recorded_by(recorded_by);
        for line in &original.lines {
            let reversed = JournalLine {
                account_id: line.account_id,
                description: line.description.clone(),
                debit: line.credit,
                credit: line.debit,
            };
            draft = draft.line(reversed);
        }

        self.post(draft)
    }

    /// Replays the whole ledger and checks its standing invariants
    ///
    /// - every entry balances within tolerance
    /// - no entry is dated at or before the watermark, closing entries
    ///   excepted
    pub fn verify(&self) -> Result<(), LedgerError> {
        for entry in &self.entries {
            if !entry.is_balanced(BALANCE_TOLERANCE) {
                return Err(LedgerError::Unbalanced {
                    debits: entry.total_debits(),
                    credits: entry.total_credits(),
                });
            }
            if let Some(closed_through) = self.closed_through {
                if entry.date <= closed_through && !entry.is_closing_entry() {
                    return Err(LedgerError::PeriodClosed {
                        date: entry.date,
                        closed_through,
                    });
                }
            }
        }
        Ok(())
    }
}
