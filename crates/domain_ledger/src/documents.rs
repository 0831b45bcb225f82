//! Business documents
//!
//! Completed business events arrive here already validated by the upstream
//! screens; the ledger only re-checks its own invariants. The documents also
//! double as ledger line-items: the customer, supplier, and item ledgers
//! blend journal data with these raw records, because the original system
//! does not post every micro-transaction as a journal entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    BusinessId, CustomerId, Money, PaymentId, ProductId, ProductionOrderId, PurchaseId,
    PurchaseReturnId, SaleId, SalesReturnId, StockAdjustmentId, SupplierId,
};

/// The kinds of documents a ledger row can point back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Journal,
    Sale,
    Purchase,
    IncomingPayment,
    OutgoingPayment,
    SalesReturn,
    PurchaseReturn,
    StockAdjustment,
    ProductionOrder,
    PeriodClose,
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Journal => "Journal Entry",
            DocumentType::Sale => "Sale",
            DocumentType::Purchase => "Purchase",
            DocumentType::IncomingPayment => "Incoming Payment",
            DocumentType::OutgoingPayment => "Outgoing Payment",
            DocumentType::SalesReturn => "Sales Return",
            DocumentType::PurchaseReturn => "Purchase Return",
            DocumentType::StockAdjustment => "Stock Adjustment",
            DocumentType::ProductionOrder => "Production Order",
            DocumentType::PeriodClose => "Period Close",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A reference from a ledger row or journal entry back to its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub doc_type: DocumentType,
    pub number: String,
}

impl DocumentRef {
    pub fn new(doc_type: DocumentType, number: impl Into<String>) -> Self {
        Self {
            doc_type,
            number: number.into(),
        }
    }
}

/// Sales channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleChannel {
    /// Point-of-sale till
    Pos,
    /// Invoice ("local") sale
    Invoice,
}

/// A component of a bundled deal line
///
/// Deal lines sell a composed product; stock moves on the components, not
/// on the bundle itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealComponent {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

/// One line of a sale or sales return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    /// The product sold; `None` for free-text lines
    pub product_id: Option<ProductId>,
    pub quantity: Decimal,
    pub unit_price: Money,
    /// Purchase cost per unit, when known; feeds the COGS posting
    pub unit_cost: Option<Money>,
    /// Deal components, when the line is a bundle
    #[serde(default)]
    pub components: Vec<DealComponent>,
}

/// A completed sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub channel: SaleChannel,
    /// `None` for walk-in customers
    pub customer_id: Option<CustomerId>,
    pub lines: Vec<SaleLine>,
    pub net_total: Money,
    pub vat_total: Money,
    pub gross_total: Money,
}

impl Sale {
    /// Total purchase cost of the sold goods, when any line carries one
    pub fn cost_of_goods(&self) -> Option<Money> {
        let mut total: Option<Money> = None;
        for line in &self.lines {
            if let Some(unit_cost) = line.unit_cost {
                let cost = unit_cost.multiply(line.quantity);
                total = Some(match total {
                    Some(sum) => sum + cost,
                    None => cost,
                });
            }
        }
        total
    }
}

/// One line of a purchase or purchase return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit_cost: Money,
}

/// A recorded purchase invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub supplier_id: SupplierId,
    pub lines: Vec<PurchaseLine>,
    pub net_total: Money,
    pub vat_total: Money,
    pub gross_total: Money,
}

/// A payment received from a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingPayment {
    pub id: PaymentId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    /// `None` for walk-in settlements
    pub customer_id: Option<CustomerId>,
    pub amount: Money,
}

/// A payment made to a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingPayment {
    pub id: PaymentId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub supplier_id: SupplierId,
    pub amount: Money,
}

/// Goods returned by a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReturn {
    pub id: SalesReturnId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub customer_id: Option<CustomerId>,
    pub lines: Vec<SaleLine>,
    pub net_total: Money,
    pub vat_total: Money,
    pub gross_total: Money,
}

impl SalesReturn {
    /// Total purchase cost of the returned goods, when known
    pub fn cost_of_goods(&self) -> Option<Money> {
        let mut total: Option<Money> = None;
        for line in &self.lines {
            if let Some(unit_cost) = line.unit_cost {
                let cost = unit_cost.multiply(line.quantity);
                total = Some(match total {
                    Some(sum) => sum + cost,
                    None => cost,
                });
            }
        }
        total
    }
}

/// Goods returned to a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReturn {
    pub id: PurchaseReturnId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub supplier_id: SupplierId,
    pub lines: Vec<PurchaseLine>,
    pub net_total: Money,
    pub vat_total: Money,
    pub gross_total: Money,
}

/// How a stock adjustment came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentKind {
    /// Explicit correction entered in the stock screen
    Manual,
    /// Correction produced by the daily-cash count
    DailyCount,
}

/// A manual stock quantity correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: StockAdjustmentId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub product_id: ProductId,
    /// Signed quantity change
    pub quantity_change: Decimal,
    pub kind: AdjustmentKind,
    pub note: Option<String>,
}

/// A produced or consumed quantity on a production order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionItem {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

/// A completed production order: inputs consumed, yields produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: ProductionOrderId,
    pub number: String,
    pub business_id: BusinessId,
    pub date: NaiveDate,
    pub yields: Vec<ProductionItem>,
    pub inputs: Vec<ProductionItem>,
}

/// Minimal customer record, enough for ledger queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

/// Minimal supplier record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
}

/// Minimal product record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Opening stock quantity carried from before the system was adopted
    #[serde(default)]
    pub opening_stock: Decimal,
}

/// Every document the session has loaded or recorded, by kind
///
/// Readers treat the archive as an immutable snapshot for the duration of a
/// query; only the session mutates it, under its write lock.
#[derive(Debug, Clone, Default)]
pub struct DocumentArchive {
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub incoming_payments: Vec<IncomingPayment>,
    pub outgoing_payments: Vec<OutgoingPayment>,
    pub sales_returns: Vec<SalesReturn>,
    pub purchase_returns: Vec<PurchaseReturn>,
    pub stock_adjustments: Vec<StockAdjustment>,
    pub production_orders: Vec<ProductionOrder>,
}

impl DocumentArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_exists(&self, id: CustomerId) -> bool {
        self.customers.iter().any(|c| c.id == id)
    }

    pub fn supplier_exists(&self, id: SupplierId) -> bool {
        self.suppliers.iter().any(|s| s.id == id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
