//! The period-closing state machine
//!
//! Closing advances monthly: `Open(period)` → `Closing` → `Closed(period)`.
//! The closing transaction zeroes every revenue and expense account with
//! period activity into retained earnings and advances the business's
//! watermark to the period end. Posting the entry and moving the watermark
//! are one logical transaction: a failed post leaves the watermark where
//! it was. Closing is irreversible; there is no reopen.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use core_kernel::{temporal, DateRange, Money};
use domain_ledger::documents::{DocumentRef, DocumentType};
use domain_ledger::{
    AccountRole, AccountType, AccountingSettings, ChartOfAccounts, EntryDraft, JournalLedger,
    JournalLine, CLOSING_TAG,
};
use domain_reports::FinancialStatementBuilder;

use crate::error::ClosingError;

/// Where a business stands in the closing lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClosingState {
    /// The next period that would close
    Open { period: DateRange },
    /// A closing transaction is being assembled for the period
    Closing { period: DateRange },
    /// The period has been closed and the watermark advanced
    Closed { period: DateRange },
}

/// The result of a completed close
#[derive(Debug, Clone, Serialize)]
pub struct ClosingOutcome {
    pub period: DateRange,
    /// Net income rolled into retained earnings (negative for a loss)
    pub net_income: Decimal,
    /// Number of the posted closing entry; `None` when the period had no
    /// revenue or expense activity and only the watermark moved
    pub entry_number: Option<String>,
    /// How many revenue/expense accounts were zeroed
    pub closed_accounts: usize,
}

/// Orchestrates the closing state machine
pub struct PeriodClosingManager;

impl PeriodClosingManager {
    /// The calendar month the next close would cover
    ///
    /// The month after the watermark; before the first close, the month of
    /// the earliest journal entry.
    ///
    /// # Errors
    ///
    /// `NothingToClose` when the ledger has no entries and no watermark.
    pub fn next_period(ledger: &JournalLedger) -> Result<DateRange, ClosingError> {
        if let Some(watermark) = ledger.closed_through() {
            return Ok(temporal::month_following(watermark));
        }
        let earliest = ledger
            .entries()
            .iter()
            .map(|e| e.date)
            .min()
            .ok_or(ClosingError::NothingToClose)?;
        Ok(temporal::month_of(earliest))
    }

    /// Assembles the closing entry for a period without posting it
    ///
    /// For every revenue/expense account with a nonzero period balance the
    /// draft carries a reversing line; one final line balances the sum into
    /// retained earnings. Returns `None` when the period has no activity.
    ///
    /// # Errors
    ///
    /// `MissingRetainedEarningsAccount` when the role does not resolve.
    pub fn prepare_closing_entry(
        ledger: &JournalLedger,
        chart: &ChartOfAccounts,
        settings: &AccountingSettings,
        period: DateRange,
        recorded_by: &str,
    ) -> Result<Option<(EntryDraft, Decimal, usize)>, ClosingError> {
        let retained_earnings = settings
            .resolve(AccountRole::RetainedEarnings, chart)
            .map_err(|_| ClosingError::MissingRetainedEarningsAccount)?;

        let builder = FinancialStatementBuilder::new(ledger, chart, settings);
        let changes = builder.period_changes(period);

        let mut draft = EntryDraft::new(period.end, format!("{CLOSING_TAG} {}", period.end))
            .recorded_by(recorded_by)
            .with_source(DocumentRef::new(
                DocumentType::PeriodClose,
                period.end.to_string(),
            ));
        let mut net_income = Decimal::ZERO;
        let mut closed_accounts = 0usize;
        let currency = ledger.currency();

        for account in chart.accounts() {
            if !matches!(
                account.account_type,
                AccountType::Revenue | AccountType::Expense
            ) {
                continue;
            }
            let balance = changes.get(&account.id).copied().unwrap_or(Decimal::ZERO);
            if balance.is_zero() {
                continue;
            }

            // Reverse the period balance: a credit balance (revenue) is
            // debited away, a debit balance (expense) is credited away.
            let amount = Money::new(balance.abs(), currency);
            let line = if balance < Decimal::ZERO {
                JournalLine::debit(account.id, amount)
            } else {
                JournalLine::credit(account.id, amount)
            };
            draft = draft.line(line.with_description(CLOSING_TAG));

            net_income -= balance;
            closed_accounts += 1;
        }

        if closed_accounts == 0 {
            return Ok(None);
        }

        // Profit is credited to retained earnings, loss debited.
        let result_money = Money::new(net_income.abs(), currency);
        let result_line = if net_income >= Decimal::ZERO {
            JournalLine::credit(retained_earnings, result_money)
        } else {
            JournalLine::debit(retained_earnings, result_money)
        };
        draft = draft.line(result_line.with_description(CLOSING_TAG));

        Ok(Some((draft, net_income, closed_accounts)))
    }

    /// Runs a full close of the next period
    ///
    /// Posts the closing entry (dated inside the period, the sanctioned
    /// watermark exception) and advances the watermark to the period end.
    /// A period without activity advances the watermark without posting.
    /// On any failure the watermark does not move.
    pub fn close(
        ledger: &mut JournalLedger,
        chart: &ChartOfAccounts,
        settings: &AccountingSettings,
        recorded_by: &str,
    ) -> Result<ClosingOutcome, ClosingError> {
        let period = Self::next_period(ledger)?;
        let prepared =
            Self::prepare_closing_entry(ledger, chart, settings, period, recorded_by)?;

        let outcome = match prepared {
            Some((draft, net_income, closed_accounts)) => {
                let entry = ledger.post_closing(draft)?;
                let entry_number = entry.number.clone();
                info!(
                    period = %period,
                    entry = %entry_number,
                    %net_income,
                    "period closed"
                );
                ClosingOutcome {
                    period,
                    net_income,
                    entry_number: Some(entry_number),
                    closed_accounts,
                }
            }
            None => {
                info!(period = %period, "period closed with no activity");
                ClosingOutcome {
                    period,
                    net_income: Decimal::ZERO,
                    entry_number: None,
                    closed_accounts: 0,
                }
            }
        };

        // Watermark moves only after the entry is safely in the ledger.
        ledger.set_closed_through(Some(period.end));
        Ok(outcome)
    }

    /// The business's position in the closing lifecycle
    ///
    /// `Closed` with the last closed period once a close has happened,
    /// otherwise `Open` with the first period waiting to close. The
    /// `Closing` state only exists transiently inside [`close`](Self::close).
    pub fn state(ledger: &JournalLedger) -> Result<ClosingState, ClosingError> {
        match ledger.closed_through() {
            Some(watermark) => Ok(ClosingState::Closed {
                period: temporal::month_of(watermark),
            }),
            None => Ok(ClosingState::Open {
                period: Self::next_period(ledger)?,
            }),
        }
    }
}
