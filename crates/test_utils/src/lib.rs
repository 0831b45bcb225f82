//! Shared test utilities for the back-office workspace
//!
//! Builders for business documents, ready-made chart/settings/ledger
//! fixtures, and one-shot tracing initialization for test binaries.

pub mod builders;
pub mod fixtures;

pub use builders::{PurchaseBuilder, SaleBuilder};
pub use fixtures::{date, init_tracing, money, standard_business, standard_fixtures};
