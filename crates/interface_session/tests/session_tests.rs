//! End-to-end tests for the business session

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Collection, CustomerId, DateRange, ProductId, Store, SupplierId};
use domain_ledger::account::StandardChart;
use domain_ledger::documents::{Customer, Product, Supplier};
use domain_ledger::settings::{AccountRole, AccountingSettings};
use domain_ledger::{Business, EntryDraft};
use domain_reports::CustomerRef;
use infra_store::MemoryStore;
use interface_session::{BusinessSession, PostingOutcome, SessionError};
use test_utils::{date, init_tracing, money, standard_business, PurchaseBuilder, SaleBuilder};

fn march() -> DateRange {
    DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap()
}

/// Seeds the store with the standard chart and settings, then opens a
/// session for a fresh business.
async fn seeded_session(store: Arc<MemoryStore>) -> BusinessSession {
    init_tracing();
    let business = standard_business();
    seed_for(&store, &business);
    BusinessSession::open(store, business).await.unwrap()
}

fn seed_for(store: &MemoryStore, business: &Business) {
    let accounts: Vec<serde_json::Value> = StandardChart::small_business(business.id)
        .iter()
        .map(|a| serde_json::to_value(a).unwrap())
        .collect();
    store.seed(business.id, Collection::Accounts, accounts);

    let settings = AccountingSettings::standard(business.id);
    store.seed(
        business.id,
        Collection::AccountingSettings,
        vec![serde_json::to_value(&settings).unwrap()],
    );
}

// ============================================================================
// The 118 sale, end to end
// ============================================================================

#[tokio::test]
async fn test_sale_flows_into_every_query_surface() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store.clone()).await;
    let customer = CustomerId::new();
    session
        .add_customer(Customer {
            id: customer,
            name: "Agron".into(),
        })
        .await
        .unwrap();

    let sale = SaleBuilder::new(
        session.business().id,
        "FSH-001-2024",
        date(2024, 3, 10),
    )
    .invoice_for(customer)
    .line(ProductId::new(), dec!(1), dec!(100), None)
    .build();

    let outcome = session.record_sale(sale).await.unwrap();
    assert!(matches!(outcome, PostingOutcome::Posted { .. }));

    let receivable = session.chart().resolve_by_number("1200").unwrap().id;
    let view = session.account_ledger(receivable, march()).unwrap();
    assert_eq!(view.closing_balance(), dec!(118));

    let view = session
        .customer_ledger(CustomerRef::Customer(customer), march())
        .unwrap();
    assert_eq!(view.closing_balance(), dec!(118));

    let pnl = session.profit_and_loss(march());
    assert_eq!(pnl.total_revenue, dec!(100));

    // Both the document and the entry reached the store.
    let business_id = session.business().id;
    assert_eq!(
        store.load(business_id, Collection::Sales).await.unwrap().len(),
        1
    );
    assert_eq!(
        store
            .load(business_id, Collection::JournalEntries)
            .await
            .unwrap()
            .len(),
        1
    );
}

// ============================================================================
// Degraded automatic posting
// ============================================================================

#[tokio::test]
async fn test_unresolved_role_skips_posting_but_keeps_document() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store.clone()).await;

    let mut settings = AccountingSettings::standard(session.business().id);
    settings.unmap(AccountRole::SalesRevenue);
    session.update_settings(settings).await.unwrap();

    let sale = SaleBuilder::new(session.business().id, "FSH-002-2024", date(2024, 3, 11))
        .line(ProductId::new(), dec!(1), dec!(50), None)
        .build();

    let outcome = session.record_sale(sale).await.unwrap();
    assert!(matches!(outcome, PostingOutcome::Skipped { .. }));

    // The sale still exists; the journal does not.
    assert_eq!(session.archive().sales.len(), 1);
    assert!(session.ledger().is_empty());
}

// ============================================================================
// Persistence failure rollback
// ============================================================================

#[tokio::test]
async fn test_failed_save_rolls_back_manual_entry() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store.clone()).await;
    let cash = session.chart().resolve_by_number("1010").unwrap().id;
    let capital = session.chart().resolve_by_number("3010").unwrap().id;

    let draft = || {
        EntryDraft::new(date(2024, 3, 5), "Owner deposit")
            .debit(cash, money(dec!(500)))
            .credit(capital, money(dec!(500)))
    };

    store.fail_next_saves(1);
    let err = session.post_journal_entry(draft()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(session.ledger().is_empty());

    // The retry reuses the released entry number.
    let number = session.post_journal_entry(draft()).await.unwrap();
    assert_eq!(number, "VEP-2024-00001");
}

#[tokio::test]
async fn test_failed_save_during_close_keeps_period_open() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store.clone()).await;
    let cash = session.chart().resolve_by_number("1010").unwrap().id;
    let revenue = session.chart().resolve_by_number("4010").unwrap().id;

    session
        .post_journal_entry(
            EntryDraft::new(date(2024, 3, 10), "Sales")
                .debit(cash, money(dec!(1000)))
                .credit(revenue, money(dec!(1000))),
        )
        .await
        .unwrap();
    let entries_before = session.ledger().len();

    store.fail_next_saves(1);
    let err = session.close_period("admin").await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));

    // Watermark and ledger rolled all the way back.
    assert_eq!(session.ledger().closed_through(), None);
    assert_eq!(session.business().last_closed_period_end, None);
    assert_eq!(session.ledger().len(), entries_before);

    // A retry closes cleanly.
    let outcome = session.close_period("admin").await.unwrap();
    assert_eq!(outcome.period.end, date(2024, 3, 31));
    assert_eq!(outcome.net_income, dec!(1000));
}

// ============================================================================
// Reload from the store
// ============================================================================

#[tokio::test]
async fn test_closed_state_survives_reload() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store.clone()).await;
    let cash = session.chart().resolve_by_number("1010").unwrap().id;
    let revenue = session.chart().resolve_by_number("4010").unwrap().id;

    session
        .post_journal_entry(
            EntryDraft::new(date(2024, 3, 10), "Sales")
                .debit(cash, money(dec!(700)))
                .credit(revenue, money(dec!(700))),
        )
        .await
        .unwrap();
    session.close_period("admin").await.unwrap();

    // Reload the business record the session persisted, then reopen.
    let business_id = session.business().id;
    let records = store.load(business_id, Collection::Businesses).await.unwrap();
    let business: Business = serde_json::from_value(records[0].clone()).unwrap();
    assert_eq!(business.last_closed_period_end, Some(date(2024, 3, 31)));

    let reopened = BusinessSession::open(store.clone(), business).await.unwrap();
    assert_eq!(reopened.ledger().closed_through(), Some(date(2024, 3, 31)));
    assert_eq!(reopened.ledger().len(), 2); // sales entry + closing entry
    assert!(reopened.ledger().verify().is_ok());
}

#[tokio::test]
async fn test_corrupt_records_are_skipped_on_open() {
    let store = Arc::new(MemoryStore::new());
    init_tracing();
    let business = standard_business();
    seed_for(&store, &business);

    // One good entry, one garbage record.
    let good = {
        let mut ledger =
            domain_ledger::JournalLedger::new(business.id, core_kernel::Currency::ALL);
        let cash = core_kernel::AccountId::new();
        let capital = core_kernel::AccountId::new();
        ledger
            .post(
                EntryDraft::new(date(2024, 3, 1), "Seed")
                    .debit(cash, money(dec!(10)))
                    .credit(capital, money(dec!(10))),
            )
            .unwrap();
        serde_json::to_value(&ledger.entries()[0]).unwrap()
    };
    store.seed(
        business.id,
        Collection::JournalEntries,
        vec![good, serde_json::json!({"date": "not-a-date"})],
    );

    let session = BusinessSession::open(store, business).await.unwrap();
    assert_eq!(session.ledger().len(), 1);
}

// ============================================================================
// Query surface errors
// ============================================================================

#[tokio::test]
async fn test_unknown_subjects_are_reported() {
    let store = Arc::new(MemoryStore::new());
    let session = seeded_session(store).await;

    assert!(matches!(
        session.customer_ledger(CustomerRef::Customer(CustomerId::new()), march()),
        Err(SessionError::Report(_))
    ));
    assert!(matches!(
        session.supplier_ledger(SupplierId::new(), march()),
        Err(SessionError::Report(_))
    ));
    assert!(matches!(
        session.item_ledger(ProductId::new(), march()),
        Err(SessionError::Report(_))
    ));
}

// ============================================================================
// Supplier & stock round trip
// ============================================================================

#[tokio::test]
async fn test_purchase_and_item_ledger_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let mut session = seeded_session(store).await;
    let supplier = SupplierId::new();
    let product = ProductId::new();

    session
        .add_supplier(Supplier {
            id: supplier,
            name: "Furnitori Kryesor".into(),
        })
        .await
        .unwrap();
    session
        .add_product(Product {
            id: product,
            name: "Flour 1kg".into(),
            opening_stock: dec!(10),
        })
        .await
        .unwrap();

    let purchase = PurchaseBuilder::new(
        session.business().id,
        "FBL-001-2024",
        date(2024, 3, 5),
        supplier,
    )
    .line(product, dec!(5), dec!(40))
    .build();
    let outcome = session.record_purchase(purchase).await.unwrap();
    assert!(matches!(outcome, PostingOutcome::Posted { .. }));

    let sale = SaleBuilder::new(session.business().id, "FSH-001-2024", date(2024, 3, 12))
        .line(product, dec!(3), dec!(60), Some(dec!(40)))
        .build();
    session.record_sale(sale).await.unwrap();

    let supplier_view = session.supplier_ledger(supplier, march()).unwrap();
    assert_eq!(supplier_view.closing_balance(), dec!(236));

    let item_view = session.item_ledger(product, march()).unwrap();
    assert_eq!(item_view.opening_balance, dec!(10));
    assert_eq!(item_view.rows[0].balance, dec!(15));
    assert_eq!(item_view.rows[1].balance, dec!(12));
}
