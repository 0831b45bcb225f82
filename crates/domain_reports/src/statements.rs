//! Financial statements
//!
//! Balance sheet, profit & loss, cash flow, and trial balance, all derived
//! from journal lines. Balances are recomputed on every call; nothing here
//! caches state.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use core_kernel::{temporal, AccountId, DateRange};
use domain_ledger::{AccountRole, AccountType, AccountingSettings, ChartOfAccounts, JournalLedger};

/// Tolerance for the balance-sheet equation check
const EQUATION_TOLERANCE: Decimal = dec!(0.01);

/// One account line on a statement
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    pub account_id: AccountId,
    pub number: String,
    pub name: String,
    pub amount: Decimal,
}

/// Balance sheet as of a date
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
    /// Net income of all open (unclosed) revenue/expense activity up to the
    /// date, shown inside equity so the equation can hold mid-period
    pub current_earnings: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    /// `Assets == Liabilities + Equity` within tolerance; surfaced, never
    /// silently corrected
    pub equation_balanced: bool,
}

/// Profit & loss over a period
#[derive(Debug, Clone, Serialize)]
pub struct ProfitAndLoss {
    pub period: DateRange,
    pub revenue: Vec<StatementLine>,
    pub expenses: Vec<StatementLine>,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

/// Cash flow over a period (simplified indirect method)
#[derive(Debug, Clone, Serialize)]
pub struct CashFlow {
    pub period: DateRange,
    pub net_income: Decimal,
    /// Negated period change of accounts receivable
    pub receivables_adjustment: Decimal,
    /// Negated period change of inventory
    pub inventory_adjustment: Decimal,
    /// Period change of accounts payable, in its natural credit sign
    pub payables_adjustment: Decimal,
    pub operating_cash_flow: Decimal,
    /// Always zero in this design (known simplification)
    pub investing_cash_flow: Decimal,
    /// Always zero in this design (known simplification)
    pub financing_cash_flow: Decimal,
    pub beginning_cash: Decimal,
    pub net_cash_change: Decimal,
    pub ending_cash: Decimal,
}

/// Trial balance as of a date
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    pub as_of: NaiveDate,
    pub entries: Vec<TrialBalanceEntry>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub is_balanced: bool,
}

/// A single row of the trial balance
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceEntry {
    pub account_id: AccountId,
    pub number: String,
    pub name: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Derives financial statements from the journal
pub struct FinancialStatementBuilder<'a> {
    ledger: &'a JournalLedger,
    chart: &'a ChartOfAccounts,
    settings: &'a AccountingSettings,
}

impl<'a> FinancialStatementBuilder<'a> {
    pub fn new(
        ledger: &'a JournalLedger,
        chart: &'a ChartOfAccounts,
        settings: &'a AccountingSettings,
    ) -> Self {
        Self {
            ledger,
            chart,
            settings,
        }
    }

    /// Folds every journal line dated up to `as_of` into
    /// `account -> debit-minus-credit`
    ///
    /// This is the account projector's opening-balance computation
    /// generalized to all accounts at once.
    pub fn balances_as_of(&self, as_of: NaiveDate) -> HashMap<AccountId, Decimal> {
        let mut balances = HashMap::new();
        for entry in self.ledger.entries() {
            if entry.date > as_of {
                continue;
            }
            for line in &entry.lines {
                *balances.entry(line.account_id).or_insert(Decimal::ZERO) += line.signed_amount();
            }
        }
        balances
    }

    /// Folds journal lines inside the period into
    /// `account -> debit-minus-credit`
    ///
    /// Closing entries are excluded: they zero revenue and expense into
    /// retained earnings at the period boundary, and counting them would
    /// erase the very activity a period statement reports. A statement over
    /// an already-closed range therefore still computes from the raw
    /// entries.
    pub fn period_changes(&self, period: DateRange) -> HashMap<AccountId, Decimal> {
        let mut changes = HashMap::new();
        for entry in self.ledger.entries() {
            if !period.contains(entry.date) || entry.is_closing_entry() {
                continue;
            }
            for line in &entry.lines {
                *changes.entry(line.account_id).or_insert(Decimal::ZERO) += line.signed_amount();
            }
        }
        changes
    }

    /// Builds the balance sheet as of a date
    pub fn balance_sheet(&self, as_of: NaiveDate) -> BalanceSheet {
        let balances = self.balances_as_of(as_of);

        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();
        let mut current_earnings = Decimal::ZERO;

        for account in self.chart.accounts() {
            let balance = balances
                .get(&account.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if balance.is_zero() {
                continue;
            }
            let line = |amount: Decimal| StatementLine {
                account_id: account.id,
                number: account.number.clone(),
                name: account.name.clone(),
                amount,
            };
            match account.account_type {
                // Asset balances shown as-is; credit-natural sections negated.
                AccountType::Asset => assets.push(line(balance)),
                AccountType::Liability => liabilities.push(line(-balance)),
                AccountType::Equity => equity.push(line(-balance)),
                // Open revenue/expense activity rolls into equity as the
                // unclosed current-period result.
                AccountType::Revenue | AccountType::Expense => current_earnings -= balance,
            }
        }

        let total_assets: Decimal = assets.iter().map(|l| l.amount).sum();
        let total_liabilities: Decimal = liabilities.iter().map(|l| l.amount).sum();
        let equity_accounts: Decimal = equity.iter().map(|l| l.amount).sum();
        let total_equity = equity_accounts + current_earnings;

        let equation_balanced =
            (total_assets - (total_liabilities + total_equity)).abs() <= EQUATION_TOLERANCE;

        BalanceSheet {
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            equation_balanced,
        }
    }

    /// Builds the profit & loss statement over a period
    pub fn profit_and_loss(&self, period: DateRange) -> ProfitAndLoss {
        let changes = self.period_changes(period);

        let mut revenue = Vec::new();
        let mut expenses = Vec::new();

        for account in self.chart.accounts() {
            let change = changes.get(&account.id).copied().unwrap_or(Decimal::ZERO);
            if change.is_zero() {
                continue;
            }
            match account.account_type {
                AccountType::Revenue => revenue.push(StatementLine {
                    account_id: account.id,
                    number: account.number.clone(),
                    name: account.name.clone(),
                    // Credit-natural: shown positive as credit-minus-debit.
                    amount: -change,
                }),
                AccountType::Expense => expenses.push(StatementLine {
                    account_id: account.id,
                    number: account.number.clone(),
                    name: account.name.clone(),
                    amount: change,
                }),
                _ => {}
            }
        }

        let total_revenue: Decimal = revenue.iter().map(|l| l.amount).sum();
        let total_expenses: Decimal = expenses.iter().map(|l| l.amount).sum();

        ProfitAndLoss {
            period,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income: total_revenue - total_expenses,
        }
    }

    /// Builds the cash flow statement over a period
    ///
    /// An unresolved role contributes zero to its adjustment; the statement
    /// still computes.
    pub fn cash_flow(&self, period: DateRange) -> CashFlow {
        let pnl = self.profit_and_loss(period);
        let changes = self.period_changes(period);

        let change_for = |role: AccountRole| -> Decimal {
            match self.settings.resolve_optional(role, self.chart) {
                Some(account_id) => changes.get(&account_id).copied().unwrap_or(Decimal::ZERO),
                None => {
                    warn!(role = %role, "cash flow: role not resolved, adjustment is zero");
                    Decimal::ZERO
                }
            }
        };

        let receivables_adjustment = -change_for(AccountRole::AccountsReceivable);
        let inventory_adjustment = -change_for(AccountRole::Inventory);
        // Payables grow on the credit side; negating the debit-minus-credit
        // change yields the natural-sign period change.
        let payables_adjustment = -change_for(AccountRole::AccountsPayable);

        let operating_cash_flow = pnl.net_income
            + receivables_adjustment
            + inventory_adjustment
            + payables_adjustment;

        let beginning_cash = match self.settings.resolve_optional(AccountRole::Cash, self.chart) {
            Some(cash) => self
                .balances_as_of(temporal::day_before(period.start))
                .get(&cash)
                .copied()
                .unwrap_or(Decimal::ZERO),
            None => {
                warn!("cash flow: cash role not resolved, beginning cash is zero");
                Decimal::ZERO
            }
        };

        let net_cash_change = operating_cash_flow;

        CashFlow {
            period,
            net_income: pnl.net_income,
            receivables_adjustment,
            inventory_adjustment,
            payables_adjustment,
            operating_cash_flow,
            investing_cash_flow: Decimal::ZERO,
            financing_cash_flow: Decimal::ZERO,
            beginning_cash,
            net_cash_change,
            ending_cash: beginning_cash + net_cash_change,
        }
    }

    /// Builds the trial balance as of a date
    pub fn trial_balance(&self, as_of: NaiveDate) -> TrialBalance {
        let balances = self.balances_as_of(as_of);

        let mut entries = Vec::new();
        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;

        for account in self.chart.accounts() {
            let balance = balances
                .get(&account.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if balance.is_zero() {
                continue;
            }
            let (debit, credit) = if balance > Decimal::ZERO {
                (balance, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -balance)
            };
            total_debits += debit;
            total_credits += credit;
            entries.push(TrialBalanceEntry {
                account_id: account.id,
                number: account.number.clone(),
                name: account.name.clone(),
                debit,
                credit,
            });
        }

        TrialBalance {
            as_of,
            entries,
            total_debits,
            total_credits,
            is_balanced: total_debits == total_credits,
        }
    }
}
