//! Storage port
//!
//! The core has no opinion about where records live. Everything it persists
//! goes through this narrow key-value port: a named collection of JSON
//! records per business. Adapters (in-memory, file, database) live in infra
//! crates; the domain only sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::identifiers::BusinessId;

/// The record collections the core reads and writes
///
/// Collection names match the keys used by the original stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Businesses,
    Accounts,
    JournalEntries,
    AccountingSettings,
    Customers,
    Suppliers,
    Products,
    Sales,
    Purchases,
    IncomingPayments,
    OutgoingPayments,
    SalesReturns,
    PurchaseReturns,
    StockAdjustments,
    ProductionOrders,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Businesses => "businesses",
            Collection::Accounts => "accounts",
            Collection::JournalEntries => "journalEntries",
            Collection::AccountingSettings => "accountingSettings",
            Collection::Customers => "customers",
            Collection::Suppliers => "suppliers",
            Collection::Products => "products",
            Collection::Sales => "sales",
            Collection::Purchases => "purchases",
            Collection::IncomingPayments => "incomingPayments",
            Collection::OutgoingPayments => "outgoingPayments",
            Collection::SalesReturns => "salesReturns",
            Collection::PurchaseReturns => "purchaseReturns",
            Collection::StockAdjustments => "stockAdjustments",
            Collection::ProductionOrders => "productionOrders",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors a storage adapter can surface
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the write
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded
    #[error("Corrupted record in {collection}: {message}")]
    Corrupted {
        collection: Collection,
        message: String,
    },
}

impl StoreError {
    /// Returns true if retrying the same operation may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// The persistence collaborator
///
/// `save` replaces the whole collection; once it returns `Ok` the records are
/// considered durable. Callers must await completion before reporting success
/// and must roll back their in-memory state when it fails.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(
        &self,
        business: BusinessId,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, StoreError>;

    async fn save(
        &self,
        business: BusinessId,
        collection: Collection,
        records: Vec<serde_json::Value>,
    ) -> Result<(), StoreError>;
}
