//! Core Kernel - Foundational types for the back-office bookkeeping system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Document numbering schemes shared with the stored data
//! - Calendar-period helpers for fiscal dates
//! - The `Store` port every persistence adapter implements

pub mod error;
pub mod identifiers;
pub mod money;
pub mod numbering;
pub mod ports;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{
    AccountId, BusinessId, CustomerId, JournalEntryId, PaymentId, ProductId, ProductionOrderId,
    PurchaseId, PurchaseReturnId, SaleId, SalesReturnId, StockAdjustmentId, SupplierId,
};
pub use money::{Currency, Money, MoneyError};
pub use numbering::SequenceRegistry;
pub use ports::{Collection, Store, StoreError};
pub use temporal::{DateRange, TemporalError};
