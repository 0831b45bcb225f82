//! Comprehensive tests for domain_ledger

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BusinessId, Currency, CustomerId, Money, ProductId, SaleId};

use domain_ledger::account::{AccountUpdate, ChartOfAccounts, StandardChart};
use domain_ledger::documents::{Sale, SaleChannel, SaleLine};
use domain_ledger::entry::EntryDraft;
use domain_ledger::journal::{JournalLedger, BALANCE_TOLERANCE};
use domain_ledger::posting::JournalPoster;
use domain_ledger::settings::{AccountRole, AccountingSettings};
use domain_ledger::{AccountType, LedgerError};

fn money(amount: Decimal) -> Money {
    Money::new(amount, Currency::ALL)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn standard_fixtures() -> (ChartOfAccounts, AccountingSettings, JournalLedger) {
    let business_id = BusinessId::new();
    (
        ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id)),
        AccountingSettings::standard(business_id),
        JournalLedger::new(business_id, Currency::ALL),
    )
}

// ============================================================================
// Chart of accounts
// ============================================================================

mod chart_tests {
    use super::*;
    use domain_ledger::Account;

    #[test]
    fn test_standard_chart_covers_every_role() {
        let (chart, settings, _) = standard_fixtures();

        for role in AccountRole::ALL {
            assert!(settings.resolve(role, &chart).is_ok(), "missing {role}");
        }
    }

    #[test]
    fn test_create_update_delete_cycle() {
        let (mut chart, _, _) = standard_fixtures();
        let business_id = chart.business_id();

        let id = chart
            .add(Account::new(business_id, "6020", "Rent", AccountType::Expense))
            .unwrap();

        chart
            .update(
                id,
                AccountUpdate {
                    name: Some("Office Rent".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(chart.get(id).unwrap().name, "Office Rent");

        chart.remove(id).unwrap();
        assert!(chart.get(id).is_none());
    }
}

// ============================================================================
// Posting scenarios (end-to-end at the ledger layer)
// ============================================================================

mod posting_tests {
    use super::*;

    fn sale_of_118(customer: Option<CustomerId>) -> Sale {
        Sale {
            id: SaleId::new(),
            number: "FSH-001-2024".into(),
            business_id: BusinessId::new(),
            date: date(2024, 4, 10),
            channel: SaleChannel::Invoice,
            customer_id: customer,
            lines: vec![SaleLine {
                product_id: Some(ProductId::new()),
                quantity: dec!(1),
                unit_price: money(dec!(100)),
                unit_cost: None,
                components: vec![],
            }],
            net_total: money(dec!(100)),
            vat_total: money(dec!(18)),
            gross_total: money(dec!(118)),
        }
    }

    #[test]
    fn test_sale_of_118_lands_on_receivable_and_revenue() {
        let (chart, settings, mut ledger) = standard_fixtures();
        let poster = JournalPoster::new(&chart, &settings);
        let receivable = chart.resolve_by_number("1200").unwrap().id;
        let revenue = chart.resolve_by_number("4010").unwrap().id;

        let draft = poster.sale_entry(&sale_of_118(Some(CustomerId::new()))).unwrap();
        ledger.post(draft).unwrap();

        let receivable_balance: Decimal = ledger
            .lines_for_account(receivable)
            .map(|(_, l)| l.signed_amount())
            .sum();
        assert_eq!(receivable_balance, dec!(118));

        // Revenue has a credit-natural balance: -100 as debit-minus-credit.
        let revenue_balance: Decimal = ledger
            .lines_for_account(revenue)
            .map(|(_, l)| l.signed_amount())
            .sum();
        assert_eq!(revenue_balance, dec!(-100));
    }

    #[test]
    fn test_failed_posting_applies_nothing() {
        let (chart, mut settings, mut ledger) = standard_fixtures();
        settings.unmap(AccountRole::VatPayable);
        let poster = JournalPoster::new(&chart, &settings);

        let result = poster.sale_entry(&sale_of_118(None));
        assert!(matches!(result, Err(LedgerError::AccountNotResolved(_))));
        assert!(ledger.is_empty());

        // The ledger still accepts unrelated work afterwards.
        let cash = chart.resolve_by_number("1010").unwrap().id;
        let capital = chart.resolve_by_number("3010").unwrap().id;
        let draft = EntryDraft::new(date(2024, 4, 11), "Owner deposit")
            .debit(cash, money(dec!(500)))
            .credit(capital, money(dec!(500)));
        assert!(ledger.post(draft).is_ok());
    }
}

// ============================================================================
// Replay verification
// ============================================================================

mod verify_tests {
    use super::*;

    #[test]
    fn test_whole_ledger_replay_stays_balanced() {
        let (chart, settings, mut ledger) = standard_fixtures();
        let poster = JournalPoster::new(&chart, &settings);

        for i in 1..=10u32 {
            let sale = Sale {
                id: SaleId::new(),
                number: format!("FSH-{i:03}-2024"),
                business_id: chart.business_id(),
                date: date(2024, 3, i),
                channel: SaleChannel::Pos,
                customer_id: None,
                lines: vec![],
                net_total: money(Decimal::from(i * 100)),
                vat_total: money(Decimal::from(i * 18)),
                gross_total: money(Decimal::from(i * 118)),
            };
            let draft = poster.sale_entry(&sale).unwrap();
            ledger.post(draft).unwrap();
        }

        assert_eq!(ledger.len(), 10);
        assert!(ledger.verify().is_ok());
        for entry in ledger.entries() {
            assert!(entry.is_balanced(BALANCE_TOLERANCE));
        }
    }
}
