//! Common fixtures

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use core_kernel::{BusinessId, Currency, Money};
use domain_ledger::account::{ChartOfAccounts, StandardChart};
use domain_ledger::settings::AccountingSettings;
use domain_ledger::{Business, JournalLedger};

/// Initializes tracing once per test binary
///
/// Respects `RUST_LOG`; defaults to warnings so skipped-posting logs show
/// up in test output.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
    Lazy::force(&INIT);
}

/// Lek amount shorthand
pub fn money(amount: Decimal) -> Money {
    Money::new(amount, Currency::ALL)
}

/// Date shorthand; panics on invalid dates (tests only)
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fresh business in lek with nothing closed yet
pub fn standard_business() -> Business {
    Business::new("Dyqani Test", Currency::ALL)
}

/// Standard chart, standard settings, and an empty ledger for one business
pub fn standard_fixtures(
    business_id: BusinessId,
) -> (ChartOfAccounts, AccountingSettings, JournalLedger) {
    (
        ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id)),
        AccountingSettings::standard(business_id),
        JournalLedger::new(business_id, Currency::ALL),
    )
}
