//! Comprehensive tests for domain_reports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    BusinessId, Currency, CustomerId, DateRange, Money, ProductId, PurchaseId, SaleId, SupplierId,
};
use domain_ledger::account::{ChartOfAccounts, StandardChart};
use domain_ledger::documents::{
    DocumentArchive, Product, Purchase, PurchaseLine, Sale, SaleChannel, SaleLine,
};
use domain_ledger::posting::JournalPoster;
use domain_ledger::settings::AccountingSettings;
use domain_ledger::JournalLedger;
use domain_reports::{
    AccountLedgerSource, CustomerLedgerSource, CustomerRef, FinancialStatementBuilder,
    ItemLedgerSource, LedgerProjector,
};

fn money(amount: Decimal) -> Money {
    Money::new(amount, Currency::ALL)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn march() -> DateRange {
    DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap()
}

struct Fixture {
    chart: ChartOfAccounts,
    settings: AccountingSettings,
    ledger: JournalLedger,
    archive: DocumentArchive,
}

fn fixture() -> Fixture {
    let business_id = BusinessId::new();
    Fixture {
        chart: ChartOfAccounts::from_accounts(
            business_id,
            StandardChart::small_business(business_id),
        ),
        settings: AccountingSettings::standard(business_id),
        ledger: JournalLedger::new(business_id, Currency::ALL),
        archive: DocumentArchive::new(),
    }
}

fn sale(
    business_id: BusinessId,
    number: &str,
    day: NaiveDate,
    customer: Option<CustomerId>,
    net: Decimal,
    vat: Decimal,
) -> Sale {
    Sale {
        id: SaleId::new(),
        number: number.into(),
        business_id,
        date: day,
        channel: SaleChannel::Invoice,
        customer_id: customer,
        lines: vec![],
        net_total: money(net),
        vat_total: money(vat),
        gross_total: money(net + vat),
    }
}

// ============================================================================
// Account ledger scenario: the 118 sale
// ============================================================================

#[test]
fn test_sale_of_118_flows_through_every_view() {
    let mut fx = fixture();
    let customer = CustomerId::new();
    let business_id = fx.chart.business_id();

    let sale = sale(
        business_id,
        "FSH-001-2024",
        date(2024, 3, 10),
        Some(customer),
        dec!(100),
        dec!(18),
    );
    let draft = JournalPoster::new(&fx.chart, &fx.settings)
        .sale_entry(&sale)
        .unwrap();
    fx.ledger.post(draft).unwrap();
    fx.archive.sales.push(sale);

    // Account ledger of accounts receivable shows 118.
    let receivable = fx.chart.resolve_by_number("1200").unwrap().id;
    let view = LedgerProjector::project(
        &AccountLedgerSource::new(&fx.ledger),
        &receivable,
        march(),
        Decimal::ZERO,
    );
    assert_eq!(view.opening_balance, Decimal::ZERO);
    assert_eq!(view.closing_balance(), dec!(118));

    // Customer ledger of that customer shows the same 118 debt.
    let view = LedgerProjector::project(
        &CustomerLedgerSource::new(&fx.archive),
        &CustomerRef::Customer(customer),
        march(),
        Decimal::ZERO,
    );
    assert_eq!(view.closing_balance(), dec!(118));
    assert_eq!(view.rows.len(), 1);

    // P&L shows 100 of revenue.
    let builder = FinancialStatementBuilder::new(&fx.ledger, &fx.chart, &fx.settings);
    let pnl = builder.profit_and_loss(march());
    assert_eq!(pnl.total_revenue, dec!(100));
    assert_eq!(pnl.net_income, dec!(100));
}

// ============================================================================
// Item ledger scenario: opening 10, +5 purchase, -3 sale
// ============================================================================

#[test]
fn test_item_ledger_running_stock() {
    let mut fx = fixture();
    let business_id = fx.chart.business_id();
    let product = ProductId::new();
    fx.archive.products.push(Product {
        id: product,
        name: "Flour 1kg".into(),
        opening_stock: dec!(10),
    });

    fx.archive.purchases.push(Purchase {
        id: PurchaseId::new(),
        number: "FBL-001-2024".into(),
        business_id,
        date: date(2024, 3, 5),
        supplier_id: SupplierId::new(),
        lines: vec![PurchaseLine {
            product_id: product,
            quantity: dec!(5),
            unit_cost: money(dec!(40)),
        }],
        net_total: money(dec!(200)),
        vat_total: money(dec!(36)),
        gross_total: money(dec!(236)),
    });

    let mut sold = sale(business_id, "FSH-002-2024", date(2024, 3, 12), None, dec!(150), dec!(27));
    sold.lines = vec![SaleLine {
        product_id: Some(product),
        quantity: dec!(3),
        unit_price: money(dec!(50)),
        unit_cost: Some(money(dec!(40))),
        components: vec![],
    }];
    fx.archive.sales.push(sold);

    let opening_stock = fx.archive.product(product).unwrap().opening_stock;
    let view = LedgerProjector::project(
        &ItemLedgerSource::new(&fx.archive),
        &product,
        march(),
        opening_stock,
    );

    assert_eq!(view.opening_balance, dec!(10));
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].balance, dec!(15));
    assert_eq!(view.rows[1].balance, dec!(12));
    assert_eq!(view.closing_balance(), dec!(12));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_balance_sheet_equation_holds_mid_period() {
    let mut fx = fixture();
    let business_id = fx.chart.business_id();
    let poster = JournalPoster::new(&fx.chart, &fx.settings);

    for (i, net) in [dec!(100), dec!(250), dec!(75)].iter().enumerate() {
        let s = sale(
            business_id,
            &format!("FSH-{:03}-2024", i + 1),
            date(2024, 3, 10 + i as u32),
            None,
            *net,
            net * dec!(0.18),
        );
        let draft = poster.sale_entry(&s).unwrap();
        fx.ledger.post(draft).unwrap();
    }

    let builder = FinancialStatementBuilder::new(&fx.ledger, &fx.chart, &fx.settings);
    let sheet = builder.balance_sheet(date(2024, 3, 31));

    assert!(sheet.equation_balanced);
    assert_eq!(
        sheet.total_assets,
        sheet.total_liabilities + sheet.total_equity
    );
    assert_eq!(sheet.current_earnings, dec!(425));
}

#[test]
fn test_cash_flow_simplified_indirect() {
    let mut fx = fixture();
    let business_id = fx.chart.business_id();
    let poster = JournalPoster::new(&fx.chart, &fx.settings);

    // Credit sale: revenue recognized but cash untouched, receivable grows.
    let s = sale(
        business_id,
        "FSH-001-2024",
        date(2024, 3, 10),
        Some(CustomerId::new()),
        dec!(100),
        dec!(0),
    );
    fx.ledger.post(poster.sale_entry(&s).unwrap()).unwrap();

    let builder = FinancialStatementBuilder::new(&fx.ledger, &fx.chart, &fx.settings);
    let flow = builder.cash_flow(march());

    assert_eq!(flow.net_income, dec!(100));
    assert_eq!(flow.receivables_adjustment, dec!(-100));
    assert_eq!(flow.operating_cash_flow, dec!(0));
    assert_eq!(flow.investing_cash_flow, dec!(0));
    assert_eq!(flow.financing_cash_flow, dec!(0));
    assert_eq!(flow.ending_cash, flow.beginning_cash);
}

#[test]
fn test_trial_balance_balances() {
    let mut fx = fixture();
    let business_id = fx.chart.business_id();
    let poster = JournalPoster::new(&fx.chart, &fx.settings);

    let s = sale(
        business_id,
        "FSH-001-2024",
        date(2024, 3, 10),
        None,
        dec!(200),
        dec!(36),
    );
    fx.ledger.post(poster.sale_entry(&s).unwrap()).unwrap();

    let builder = FinancialStatementBuilder::new(&fx.ledger, &fx.chart, &fx.settings);
    let trial = builder.trial_balance(date(2024, 12, 31));

    assert!(trial.is_balanced);
    assert_eq!(trial.total_debits, dec!(236));
    assert_eq!(trial.total_credits, dec!(236));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_queries_return_identical_views() {
    let mut fx = fixture();
    let business_id = fx.chart.business_id();
    let poster = JournalPoster::new(&fx.chart, &fx.settings);

    for i in 1..=5u32 {
        let s = sale(
            business_id,
            &format!("FSH-{i:03}-2024"),
            date(2024, 3, i),
            None,
            Decimal::from(i * 10),
            Decimal::ZERO,
        );
        fx.ledger.post(poster.sale_entry(&s).unwrap()).unwrap();
    }

    let cash = fx.chart.resolve_by_number("1010").unwrap().id;
    let source = AccountLedgerSource::new(&fx.ledger);
    let a = LedgerProjector::project(&source, &cash, march(), Decimal::ZERO);
    let b = LedgerProjector::project(&source, &cash, march(), Decimal::ZERO);

    assert_eq!(a.opening_balance, b.opening_balance);
    assert_eq!(a.rows.len(), b.rows.len());
    for (ra, rb) in a.rows.iter().zip(b.rows.iter()) {
        assert_eq!(ra.balance, rb.balance);
        assert_eq!(ra.doc_number, rb.doc_number);
    }
}
