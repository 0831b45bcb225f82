//! The business session
//!
//! One session per active business. The session owns the chart, the
//! settings, the journal ledger, and the document archive; every mutation
//! runs compute-then-write: mutate in memory, await the store, and roll the
//! memory back if the store refuses. The session is owned by a single task,
//! so `&mut self` is the mutation queue: no two mutations can interleave,
//! and readers always see a settled snapshot.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::{AccountId, Collection, DateRange, ProductId, Store, SupplierId};
use domain_closing::{ClosingOutcome, ClosingState, PeriodClosingManager};
use domain_ledger::documents::{
    Customer, DocumentArchive, IncomingPayment, OutgoingPayment, Product, ProductionOrder,
    Purchase, PurchaseReturn, Sale, SalesReturn, StockAdjustment, Supplier,
};
use domain_ledger::{
    Account, AccountUpdate, AccountingSettings, Business, ChartOfAccounts, EntryDraft,
    JournalLedger, JournalPoster, LedgerError,
};
use domain_reports::{
    AccountLedgerSource, BalanceSheet, CashFlow, CustomerLedgerSource, CustomerRef,
    FinancialStatementBuilder, ItemLedgerSource, LedgerProjector, LedgerView, ProfitAndLoss,
    ReportError, SubjectKind, SupplierLedgerSource, TrialBalance,
};

use crate::error::SessionError;

/// What happened to the automatic posting behind a recorded document
///
/// The document itself always succeeds once this is returned; a skipped
/// posting is a bookkeeping gap to resolve, not a failed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PostingOutcome {
    Posted { entry_number: String },
    Skipped { reason: String },
}

/// The live context of one business
pub struct BusinessSession {
    store: Arc<dyn Store>,
    business: Business,
    chart: ChartOfAccounts,
    settings: AccountingSettings,
    ledger: JournalLedger,
    archive: DocumentArchive,
}

impl BusinessSession {
    /// Opens a session: loads every collection of the business
    ///
    /// Records that fail to decode (bad dates included) are skipped with a
    /// warning; one corrupt row never takes the whole session down.
    pub async fn open(store: Arc<dyn Store>, business: Business) -> Result<Self, SessionError> {
        let business_id = business.id;

        let accounts: Vec<Account> =
            decode_all(store.load(business_id, Collection::Accounts).await?, Collection::Accounts);
        let chart = ChartOfAccounts::from_accounts(business_id, accounts);

        let settings = decode_all::<AccountingSettings>(
            store.load(business_id, Collection::AccountingSettings).await?,
            Collection::AccountingSettings,
        )
        .into_iter()
        .find(|s| s.business_id == business_id)
        .unwrap_or_else(|| AccountingSettings::standard(business_id));

        let entries = decode_all(
            store.load(business_id, Collection::JournalEntries).await?,
            Collection::JournalEntries,
        );
        let ledger = JournalLedger::from_entries(
            business_id,
            business.currency,
            entries,
            business.last_closed_period_end,
        );

        let archive = DocumentArchive {
            customers: decode_all(
                store.load(business_id, Collection::Customers).await?,
                Collection::Customers,
            ),
            suppliers: decode_all(
                store.load(business_id, Collection::Suppliers).await?,
                Collection::Suppliers,
            ),
            products: decode_all(
                store.load(business_id, Collection::Products).await?,
                Collection::Products,
            ),
            sales: decode_all(store.load(business_id, Collection::Sales).await?, Collection::Sales),
            purchases: decode_all(
                store.load(business_id, Collection::Purchases).await?,
                Collection::Purchases,
            ),
            incoming_payments: decode_all(
                store.load(business_id, Collection::IncomingPayments).await?,
                Collection::IncomingPayments,
            ),
            outgoing_payments: decode_all(
                store.load(business_id, Collection::OutgoingPayments).await?,
                Collection::OutgoingPayments,
            ),
            sales_returns: decode_all(
                store.load(business_id, Collection::SalesReturns).await?,
                Collection::SalesReturns,
            ),
            purchase_returns: decode_all(
                store.load(business_id, Collection::PurchaseReturns).await?,
                Collection::PurchaseReturns,
            ),
            stock_adjustments: decode_all(
                store.load(business_id, Collection::StockAdjustments).await?,
                Collection::StockAdjustments,
            ),
            production_orders: decode_all(
                store.load(business_id, Collection::ProductionOrders).await?,
                Collection::ProductionOrders,
            ),
        };

        info!(business = %business.name, entries = ledger.len(), "session opened");

        Ok(Self {
            store,
            business,
            chart,
            settings,
            ledger,
            archive,
        })
    }

    pub fn business(&self) -> &Business {
        &self.business
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    pub fn settings(&self) -> &AccountingSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &JournalLedger {
        &self.ledger
    }

    pub fn archive(&self) -> &DocumentArchive {
        &self.archive
    }

    // ------------------------------------------------------------------
    // Chart administration
    // ------------------------------------------------------------------

    /// Adds an account to the chart
    pub async fn create_account(&mut self, account: Account) -> Result<AccountId, SessionError> {
        let snapshot = self.chart.clone();
        let id = self.chart.add(account)?;
        if let Err(err) = self.save_chart().await {
            self.chart = snapshot;
            return Err(err);
        }
        Ok(id)
    }

    /// Updates an account
    pub async fn update_account(
        &mut self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<(), SessionError> {
        let snapshot = self.chart.clone();
        self.chart.update(id, update)?;
        if let Err(err) = self.save_chart().await {
            self.chart = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Deletes an account
    pub async fn delete_account(&mut self, id: AccountId) -> Result<(), SessionError> {
        let snapshot = self.chart.clone();
        self.chart.remove(id)?;
        if let Err(err) = self.save_chart().await {
            self.chart = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Replaces the role-to-account mapping
    pub async fn update_settings(
        &mut self,
        settings: AccountingSettings,
    ) -> Result<(), SessionError> {
        let snapshot = std::mem::replace(&mut self.settings, settings);
        if let Err(err) = self
            .persist(Collection::AccountingSettings, std::slice::from_ref(&self.settings))
            .await
        {
            self.settings = snapshot;
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    /// Posts a manual journal entry
    ///
    /// Validation failures surface to the caller; nothing is persisted or
    /// kept in memory for a rejected draft.
    pub async fn post_journal_entry(&mut self, draft: EntryDraft) -> Result<String, SessionError> {
        let number = self.ledger.post(draft)?.number.clone();
        if let Err(err) = self.save_journal().await {
            let _ = self.ledger.retract_last(&number);
            return Err(err);
        }
        Ok(number)
    }

    /// Appends a reversal of an earlier entry
    pub async fn reverse_entry(
        &mut self,
        number: &str,
        date: chrono::NaiveDate,
        recorded_by: &str,
    ) -> Result<String, SessionError> {
        let reversal = self.ledger.reverse(number, date, recorded_by)?.number.clone();
        if let Err(err) = self.save_journal().await {
            let _ = self.ledger.retract_last(&reversal);
            return Err(err);
        }
        Ok(reversal)
    }

    // ------------------------------------------------------------------
    // Business documents (record + automatic posting)
    // ------------------------------------------------------------------

    /// Records a completed sale and posts it to the journal
    pub async fn record_sale(&mut self, sale: Sale) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).sale_entry(&sale);
        self.archive.sales.push(sale);
        if let Err(err) = self.persist(Collection::Sales, &self.archive.sales).await {
            self.archive.sales.pop();
            return Err(err);
        }
        self.apply_posting(draft, "sale").await
    }

    /// Records a purchase invoice and posts it to the journal
    pub async fn record_purchase(
        &mut self,
        purchase: Purchase,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).purchase_entry(&purchase);
        self.archive.purchases.push(purchase);
        if let Err(err) = self.persist(Collection::Purchases, &self.archive.purchases).await {
            self.archive.purchases.pop();
            return Err(err);
        }
        self.apply_posting(draft, "purchase").await
    }

    /// Records a customer payment and posts it to the journal
    pub async fn record_incoming_payment(
        &mut self,
        payment: IncomingPayment,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).incoming_payment_entry(&payment);
        self.archive.incoming_payments.push(payment);
        if let Err(err) = self
            .persist(Collection::IncomingPayments, &self.archive.incoming_payments)
            .await
        {
            self.archive.incoming_payments.pop();
            return Err(err);
        }
        self.apply_posting(draft, "incoming payment").await
    }

    /// Records a supplier payment and posts it to the journal
    pub async fn record_outgoing_payment(
        &mut self,
        payment: OutgoingPayment,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).outgoing_payment_entry(&payment);
        self.archive.outgoing_payments.push(payment);
        if let Err(err) = self
            .persist(Collection::OutgoingPayments, &self.archive.outgoing_payments)
            .await
        {
            self.archive.outgoing_payments.pop();
            return Err(err);
        }
        self.apply_posting(draft, "outgoing payment").await
    }

    /// Records a sales return and posts it to the journal
    pub async fn record_sales_return(
        &mut self,
        ret: SalesReturn,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).sales_return_entry(&ret);
        self.archive.sales_returns.push(ret);
        if let Err(err) = self
            .persist(Collection::SalesReturns, &self.archive.sales_returns)
            .await
        {
            self.archive.sales_returns.pop();
            return Err(err);
        }
        self.apply_posting(draft, "sales return").await
    }

    /// Records a purchase return and posts it to the journal
    pub async fn record_purchase_return(
        &mut self,
        ret: PurchaseReturn,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = JournalPoster::new(&self.chart, &self.settings).purchase_return_entry(&ret);
        self.archive.purchase_returns.push(ret);
        if let Err(err) = self
            .persist(Collection::PurchaseReturns, &self.archive.purchase_returns)
            .await
        {
            self.archive.purchase_returns.pop();
            return Err(err);
        }
        self.apply_posting(draft, "purchase return").await
    }

    /// Records a stock adjustment (stock only; no journal posting)
    pub async fn record_stock_adjustment(
        &mut self,
        adjustment: StockAdjustment,
    ) -> Result<(), SessionError> {
        self.archive.stock_adjustments.push(adjustment);
        if let Err(err) = self
            .persist(Collection::StockAdjustments, &self.archive.stock_adjustments)
            .await
        {
            self.archive.stock_adjustments.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Records a production order (stock only; no journal posting)
    pub async fn record_production_order(
        &mut self,
        order: ProductionOrder,
    ) -> Result<(), SessionError> {
        self.archive.production_orders.push(order);
        if let Err(err) = self
            .persist(Collection::ProductionOrders, &self.archive.production_orders)
            .await
        {
            self.archive.production_orders.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Registers a customer
    pub async fn add_customer(&mut self, customer: Customer) -> Result<(), SessionError> {
        self.archive.customers.push(customer);
        if let Err(err) = self.persist(Collection::Customers, &self.archive.customers).await {
            self.archive.customers.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Registers a supplier
    pub async fn add_supplier(&mut self, supplier: Supplier) -> Result<(), SessionError> {
        self.archive.suppliers.push(supplier);
        if let Err(err) = self.persist(Collection::Suppliers, &self.archive.suppliers).await {
            self.archive.suppliers.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Registers a product
    pub async fn add_product(&mut self, product: Product) -> Result<(), SessionError> {
        self.archive.products.push(product);
        if let Err(err) = self.persist(Collection::Products, &self.archive.products).await {
            self.archive.products.pop();
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ledger queries
    // ------------------------------------------------------------------

    /// Running-balance ledger of one account
    pub fn account_ledger(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<LedgerView, SessionError> {
        if self.chart.get(account_id).is_none() {
            return Err(
                ReportError::subject_not_found(SubjectKind::Account, account_id).into(),
            );
        }
        Ok(LedgerProjector::project(
            &AccountLedgerSource::new(&self.ledger),
            &account_id,
            range,
            Decimal::ZERO,
        ))
    }

    /// Running-balance ledger of one customer (or the walk-in bucket)
    pub fn customer_ledger(
        &self,
        customer: CustomerRef,
        range: DateRange,
    ) -> Result<LedgerView, SessionError> {
        if let CustomerRef::Customer(id) = customer {
            if !self.archive.customer_exists(id) {
                return Err(ReportError::subject_not_found(SubjectKind::Customer, id).into());
            }
        }
        Ok(LedgerProjector::project(
            &CustomerLedgerSource::new(&self.archive),
            &customer,
            range,
            Decimal::ZERO,
        ))
    }

    /// Running-balance ledger of one supplier
    pub fn supplier_ledger(
        &self,
        supplier_id: SupplierId,
        range: DateRange,
    ) -> Result<LedgerView, SessionError> {
        if !self.archive.supplier_exists(supplier_id) {
            return Err(
                ReportError::subject_not_found(SubjectKind::Supplier, supplier_id).into(),
            );
        }
        Ok(LedgerProjector::project(
            &SupplierLedgerSource::new(&self.archive),
            &supplier_id,
            range,
            Decimal::ZERO,
        ))
    }

    /// Running-quantity ledger of one product
    pub fn item_ledger(
        &self,
        product_id: ProductId,
        range: DateRange,
    ) -> Result<LedgerView, SessionError> {
        let product = self
            .archive
            .product(product_id)
            .ok_or_else(|| ReportError::subject_not_found(SubjectKind::Item, product_id))?;
        Ok(LedgerProjector::project(
            &ItemLedgerSource::new(&self.archive),
            &product_id,
            range,
            product.opening_stock,
        ))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn balance_sheet(&self, as_of: chrono::NaiveDate) -> BalanceSheet {
        self.statement_builder().balance_sheet(as_of)
    }

    pub fn profit_and_loss(&self, period: DateRange) -> ProfitAndLoss {
        self.statement_builder().profit_and_loss(period)
    }

    pub fn cash_flow(&self, period: DateRange) -> CashFlow {
        self.statement_builder().cash_flow(period)
    }

    pub fn trial_balance(&self, as_of: chrono::NaiveDate) -> TrialBalance {
        self.statement_builder().trial_balance(as_of)
    }

    fn statement_builder(&self) -> FinancialStatementBuilder<'_> {
        FinancialStatementBuilder::new(&self.ledger, &self.chart, &self.settings)
    }

    // ------------------------------------------------------------------
    // Period closing
    // ------------------------------------------------------------------

    /// Where the business stands in the closing lifecycle
    pub fn closing_state(&self) -> Result<ClosingState, SessionError> {
        Ok(PeriodClosingManager::state(&self.ledger)?)
    }

    /// Closes the next fiscal period
    ///
    /// Posting the closing entry, advancing the watermark, and persisting
    /// both are one logical transaction: any failure rolls everything back
    /// and the period stays open.
    pub async fn close_period(&mut self, recorded_by: &str) -> Result<ClosingOutcome, SessionError> {
        let previous_watermark = self.ledger.closed_through();
        let outcome =
            PeriodClosingManager::close(&mut self.ledger, &self.chart, &self.settings, recorded_by)?;
        self.business.last_closed_period_end = Some(outcome.period.end);

        let persisted = match self.save_journal().await {
            Ok(()) => self.save_business().await,
            Err(err) => Err(err),
        };

        if let Err(err) = persisted {
            if let Some(number) = &outcome.entry_number {
                let _ = self.ledger.retract_last(number);
            }
            self.ledger.set_closed_through(previous_watermark);
            self.business.last_closed_period_end = previous_watermark;
            return Err(err);
        }

        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Persistence plumbing
    // ------------------------------------------------------------------

    /// Resolves a posting draft against the ledger and persists the journal
    ///
    /// Draft or validation failures degrade to `Skipped`; the document is
    /// already recorded and must not be lost to a bookkeeping gap. A store
    /// failure rolls back the appended entry and surfaces as retryable.
    async fn apply_posting(
        &mut self,
        draft: Result<EntryDraft, LedgerError>,
        context: &'static str,
    ) -> Result<PostingOutcome, SessionError> {
        let draft = match draft {
            Ok(draft) => draft,
            Err(err) => {
                warn!(context, error = %err, "automatic posting skipped");
                return Ok(PostingOutcome::Skipped {
                    reason: err.to_string(),
                });
            }
        };

        let number = match self.ledger.post(draft) {
            Ok(entry) => entry.number.clone(),
            Err(err) => {
                warn!(context, error = %err, "automatic posting rejected");
                return Ok(PostingOutcome::Skipped {
                    reason: err.to_string(),
                });
            }
        };

        if let Err(err) = self.save_journal().await {
            let _ = self.ledger.retract_last(&number);
            return Err(err);
        }

        Ok(PostingOutcome::Posted {
            entry_number: number,
        })
    }

    async fn persist<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<(), SessionError> {
        let records = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .save(self.business.id, collection, records)
            .await?;
        Ok(())
    }

    async fn save_chart(&self) -> Result<(), SessionError> {
        let accounts: Vec<Account> = self.chart.accounts().cloned().collect();
        self.persist(Collection::Accounts, &accounts).await
    }

    async fn save_journal(&self) -> Result<(), SessionError> {
        self.persist(Collection::JournalEntries, self.ledger.entries())
            .await
    }

    async fn save_business(&self) -> Result<(), SessionError> {
        self.persist(Collection::Businesses, std::slice::from_ref(&self.business))
            .await
    }
}

/// Decodes a collection of raw records, skipping the undecodable ones
fn decode_all<T: DeserializeOwned>(records: Vec<serde_json::Value>, collection: Collection) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(%collection, error = %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}
