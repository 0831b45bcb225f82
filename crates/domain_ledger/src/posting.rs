//! Automatic journal posting
//!
//! Builds balanced entry drafts from completed business documents using the
//! role mapping in [`AccountingSettings`]. A helper either produces a full
//! draft or fails with `AccountNotResolved`; it never produces a partial
//! one. Callers drop failed postings with a warning; the business event
//! itself (the sale, the purchase) still succeeds.

use core_kernel::AccountId;

use crate::account::ChartOfAccounts;
use crate::documents::{
    DocumentRef, DocumentType, IncomingPayment, OutgoingPayment, Purchase, PurchaseReturn, Sale,
    SalesReturn,
};
use crate::entry::EntryDraft;
use crate::error::LedgerError;
use crate::settings::{AccountRole, AccountingSettings};

/// Derives journal entry drafts from business documents
pub struct JournalPoster<'a> {
    chart: &'a ChartOfAccounts,
    settings: &'a AccountingSettings,
}

impl<'a> JournalPoster<'a> {
    pub fn new(chart: &'a ChartOfAccounts, settings: &'a AccountingSettings) -> Self {
        Self { chart, settings }
    }

    fn resolve(&self, role: AccountRole) -> Result<AccountId, LedgerError> {
        self.settings.resolve(role, self.chart)
    }

    fn resolve_optional(&self, role: AccountRole) -> Option<AccountId> {
        self.settings.resolve_optional(role, self.chart)
    }

    /// Sale: debit cash (walk-in) or receivable (named customer) for the
    /// gross total; credit revenue net and VAT payable for the tax. When
    /// the sold items carry a known purchase cost and the cost accounts
    /// resolve, the cost of goods sold moves from inventory to COGS in the
    /// same entry.
    pub fn sale_entry(&self, sale: &Sale) -> Result<EntryDraft, LedgerError> {
        let counter_account = if sale.customer_id.is_some() {
            self.resolve(AccountRole::AccountsReceivable)?
        } else {
            self.resolve(AccountRole::Cash)?
        };
        let revenue = self.resolve(AccountRole::SalesRevenue)?;

        let mut draft = EntryDraft::new(sale.date, format!("Sale {}", sale.number))
            .with_source(DocumentRef::new(DocumentType::Sale, &sale.number))
            .debit(counter_account, sale.gross_total)
            .credit(revenue, sale.net_total);

        if sale.vat_total.is_positive() {
            draft = draft.credit(self.resolve(AccountRole::VatPayable)?, sale.vat_total);
        }

        // Cost leg is best-effort: unresolvable cost accounts degrade the
        // entry to revenue-only rather than dropping the whole posting.
        if let Some(cost) = sale.cost_of_goods() {
            if cost.is_positive() {
                if let (Some(cogs), Some(inventory)) = (
                    self.resolve_optional(AccountRole::CostOfGoodsSold),
                    self.resolve_optional(AccountRole::Inventory),
                ) {
                    draft = draft.debit(cogs, cost).credit(inventory, cost);
                }
            }
        }

        Ok(draft)
    }

    /// Purchase: debit inventory net and VAT receivable for the tax;
    /// credit accounts payable gross.
    pub fn purchase_entry(&self, purchase: &Purchase) -> Result<EntryDraft, LedgerError> {
        let inventory = self.resolve(AccountRole::Inventory)?;
        let payable = self.resolve(AccountRole::AccountsPayable)?;

        let mut draft = EntryDraft::new(purchase.date, format!("Purchase {}", purchase.number))
            .with_source(DocumentRef::new(DocumentType::Purchase, &purchase.number))
            .debit(inventory, purchase.net_total);

        if purchase.vat_total.is_positive() {
            draft = draft.debit(self.resolve(AccountRole::VatReceivable)?, purchase.vat_total);
        }

        Ok(draft.credit(payable, purchase.gross_total))
    }

    /// Incoming payment: straight transfer from receivables to cash.
    pub fn incoming_payment_entry(
        &self,
        payment: &IncomingPayment,
    ) -> Result<EntryDraft, LedgerError> {
        let cash = self.resolve(AccountRole::Cash)?;
        let receivable = self.resolve(AccountRole::AccountsReceivable)?;

        Ok(
            EntryDraft::new(payment.date, format!("Incoming payment {}", payment.number))
                .with_source(DocumentRef::new(DocumentType::IncomingPayment, &payment.number))
                .debit(cash, payment.amount)
                .credit(receivable, payment.amount),
        )
    }

    /// Outgoing payment: straight transfer from cash to payables.
    pub fn outgoing_payment_entry(
        &self,
        payment: &OutgoingPayment,
    ) -> Result<EntryDraft, LedgerError> {
        let cash = self.resolve(AccountRole::Cash)?;
        let payable = self.resolve(AccountRole::AccountsPayable)?;

        Ok(
            EntryDraft::new(payment.date, format!("Outgoing payment {}", payment.number))
                .with_source(DocumentRef::new(DocumentType::OutgoingPayment, &payment.number))
                .debit(payable, payment.amount)
                .credit(cash, payment.amount),
        )
    }

    /// Sales return: the sale posting with sides swapped, routed through
    /// the dedicated returns account, cost reversal included.
    pub fn sales_return_entry(&self, ret: &SalesReturn) -> Result<EntryDraft, LedgerError> {
        let counter_account = if ret.customer_id.is_some() {
            self.resolve(AccountRole::AccountsReceivable)?
        } else {
            self.resolve(AccountRole::Cash)?
        };
        let returns = self.resolve(AccountRole::SalesReturns)?;

        let mut draft = EntryDraft::new(ret.date, format!("Sales return {}", ret.number))
            .with_source(DocumentRef::new(DocumentType::SalesReturn, &ret.number))
            .debit(returns, ret.net_total);

        if ret.vat_total.is_positive() {
            draft = draft.debit(self.resolve(AccountRole::VatPayable)?, ret.vat_total);
        }

        draft = draft.credit(counter_account, ret.gross_total);

        if let Some(cost) = ret.cost_of_goods() {
            if cost.is_positive() {
                if let (Some(cogs), Some(inventory)) = (
                    self.resolve_optional(AccountRole::CostOfGoodsSold),
                    self.resolve_optional(AccountRole::Inventory),
                ) {
                    draft = draft.debit(inventory, cost).credit(cogs, cost);
                }
            }
        }

        Ok(draft)
    }

    /// Purchase return: the purchase posting with sides swapped, routed
    /// through the dedicated returns account.
    pub fn purchase_return_entry(&self, ret: &PurchaseReturn) -> Result<EntryDraft, LedgerError> {
        let payable = self.resolve(AccountRole::AccountsPayable)?;
        let returns = self.resolve(AccountRole::PurchaseReturns)?;

        let mut draft = EntryDraft::new(ret.date, format!("Purchase return {}", ret.number))
            .with_source(DocumentRef::new(DocumentType::PurchaseReturn, &ret.number))
            .debit(payable, ret.gross_total)
            .credit(returns, ret.net_total);

        if ret.vat_total.is_positive() {
            draft = draft.credit(self.resolve(AccountRole::VatReceivable)?, ret.vat_total);
        }

        Ok(draft)
    }
}
