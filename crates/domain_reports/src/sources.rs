//! Transaction sources for the four sub-ledgers
//!
//! The account ledger replays journal lines; the customer, supplier, and
//! item ledgers blend the raw business documents, because the original
//! system does not post every micro-transaction as a journal entry. Each
//! source only decides *what counts* and *with which sign*; the replay
//! itself lives in [`crate::projector`].

use rust_decimal::Decimal;

use core_kernel::{AccountId, CustomerId, ProductId, SupplierId};
use domain_ledger::documents::{DocumentArchive, DocumentType, Sale, SaleLine, SalesReturn};
use domain_ledger::JournalLedger;

use crate::projector::{Movement, TransactionSource};

/// Subject of a customer ledger: a named customer or the walk-in bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRef {
    /// Anonymous till customers, pooled into one synthetic subject
    WalkIn,
    Customer(CustomerId),
}

impl CustomerRef {
    fn matches(&self, customer_id: Option<CustomerId>) -> bool {
        match self {
            CustomerRef::WalkIn => customer_id.is_none(),
            CustomerRef::Customer(id) => customer_id == Some(*id),
        }
    }
}

/// Journal lines of one account, signed debit-minus-credit
pub struct AccountLedgerSource<'a> {
    ledger: &'a JournalLedger,
}

impl<'a> AccountLedgerSource<'a> {
    pub fn new(ledger: &'a JournalLedger) -> Self {
        Self { ledger }
    }
}

impl TransactionSource for AccountLedgerSource<'_> {
    type Subject = AccountId;

    fn movements_for(&self, subject: &AccountId) -> Vec<Movement> {
        self.ledger
            .lines_for_account(*subject)
            .map(|(entry, line)| {
                let doc = entry.document_ref();
                Movement {
                    date: entry.date,
                    doc_type: doc.doc_type,
                    doc_number: doc.number,
                    description: line
                        .description
                        .clone()
                        .unwrap_or_else(|| entry.description.clone()),
                    amount: line.signed_amount(),
                }
            })
            .collect()
    }
}

/// Customer debt: sales increase it, payments and returns decrease it
pub struct CustomerLedgerSource<'a> {
    archive: &'a DocumentArchive,
}

impl<'a> CustomerLedgerSource<'a> {
    pub fn new(archive: &'a DocumentArchive) -> Self {
        Self { archive }
    }
}

impl TransactionSource for CustomerLedgerSource<'_> {
    type Subject = CustomerRef;

    fn movements_for(&self, subject: &CustomerRef) -> Vec<Movement> {
        let mut movements = Vec::new();

        for sale in &self.archive.sales {
            if subject.matches(sale.customer_id) {
                movements.push(Movement {
                    date: sale.date,
                    doc_type: DocumentType::Sale,
                    doc_number: sale.number.clone(),
                    description: format!("Sale {}", sale.number),
                    amount: sale.gross_total.amount(),
                });
            }
        }

        for payment in &self.archive.incoming_payments {
            if subject.matches(payment.customer_id) {
                movements.push(Movement {
                    date: payment.date,
                    doc_type: DocumentType::IncomingPayment,
                    doc_number: payment.number.clone(),
                    description: format!("Payment {}", payment.number),
                    amount: -payment.amount.amount(),
                });
            }
        }

        for ret in &self.archive.sales_returns {
            if subject.matches(ret.customer_id) {
                movements.push(Movement {
                    date: ret.date,
                    doc_type: DocumentType::SalesReturn,
                    doc_number: ret.number.clone(),
                    description: format!("Return {}", ret.number),
                    amount: -ret.gross_total.amount(),
                });
            }
        }

        movements
    }
}

/// Supplier debt: purchases increase it, returns and payments decrease it
pub struct SupplierLedgerSource<'a> {
    archive: &'a DocumentArchive,
}

impl<'a> SupplierLedgerSource<'a> {
    pub fn new(archive: &'a DocumentArchive) -> Self {
        Self { archive }
    }
}

impl TransactionSource for SupplierLedgerSource<'_> {
    type Subject = SupplierId;

    fn movements_for(&self, subject: &SupplierId) -> Vec<Movement> {
        let mut movements = Vec::new();

        for purchase in &self.archive.purchases {
            if purchase.supplier_id == *subject {
                movements.push(Movement {
                    date: purchase.date,
                    doc_type: DocumentType::Purchase,
                    doc_number: purchase.number.clone(),
                    description: format!("Purchase {}", purchase.number),
                    amount: purchase.gross_total.amount(),
                });
            }
        }

        for ret in &self.archive.purchase_returns {
            if ret.supplier_id == *subject {
                movements.push(Movement {
                    date: ret.date,
                    doc_type: DocumentType::PurchaseReturn,
                    doc_number: ret.number.clone(),
                    description: format!("Return {}", ret.number),
                    amount: -ret.gross_total.amount(),
                });
            }
        }

        for payment in &self.archive.outgoing_payments {
            if payment.supplier_id == *subject {
                movements.push(Movement {
                    date: payment.date,
                    doc_type: DocumentType::OutgoingPayment,
                    doc_number: payment.number.clone(),
                    description: format!("Payment {}", payment.number),
                    amount: -payment.amount.amount(),
                });
            }
        }

        movements
    }
}

/// Stock quantity of one product across every stock-affecting document
pub struct ItemLedgerSource<'a> {
    archive: &'a DocumentArchive,
}

impl<'a> ItemLedgerSource<'a> {
    pub fn new(archive: &'a DocumentArchive) -> Self {
        Self { archive }
    }
}

/// Quantity a sale-shaped line moves for a product, deal components
/// included. Component quantities are per unit of the bundle.
fn sold_quantity(lines: &[SaleLine], product: ProductId) -> Decimal {
    let mut quantity = Decimal::ZERO;
    for line in lines {
        if line.product_id == Some(product) {
            quantity += line.quantity;
        }
        for component in &line.components {
            if component.product_id == product {
                quantity += component.quantity * line.quantity;
            }
        }
    }
    quantity
}

impl TransactionSource for ItemLedgerSource<'_> {
    type Subject = ProductId;

    fn movements_for(&self, subject: &ProductId) -> Vec<Movement> {
        let product = *subject;
        let mut movements = Vec::new();

        for purchase in &self.archive.purchases {
            let qty: Decimal = purchase
                .lines
                .iter()
                .filter(|l| l.product_id == product)
                .map(|l| l.quantity)
                .sum();
            if !qty.is_zero() {
                movements.push(Movement {
                    date: purchase.date,
                    doc_type: DocumentType::Purchase,
                    doc_number: purchase.number.clone(),
                    description: format!("Purchase {}", purchase.number),
                    amount: qty,
                });
            }
        }

        for ret in &self.archive.purchase_returns {
            let qty: Decimal = ret
                .lines
                .iter()
                .filter(|l| l.product_id == product)
                .map(|l| l.quantity)
                .sum();
            if !qty.is_zero() {
                movements.push(Movement {
                    date: ret.date,
                    doc_type: DocumentType::PurchaseReturn,
                    doc_number: ret.number.clone(),
                    description: format!("Return {}", ret.number),
                    amount: -qty,
                });
            }
        }

        for sale in &self.archive.sales {
            let qty = sold_quantity(&sale.lines, product);
            if !qty.is_zero() {
                movements.push(sale_movement(sale, qty));
            }
        }

        for ret in &self.archive.sales_returns {
            let qty = sold_quantity(&ret.lines, product);
            if !qty.is_zero() {
                movements.push(sales_return_movement(ret, qty));
            }
        }

        for order in &self.archive.production_orders {
            let produced: Decimal = order
                .yields
                .iter()
                .filter(|i| i.product_id == product)
                .map(|i| i.quantity)
                .sum();
            let consumed: Decimal = order
                .inputs
                .iter()
                .filter(|i| i.product_id == product)
                .map(|i| i.quantity)
                .sum();
            let net = produced - consumed;
            if !net.is_zero() {
                movements.push(Movement {
                    date: order.date,
                    doc_type: DocumentType::ProductionOrder,
                    doc_number: order.number.clone(),
                    description: format!("Production {}", order.number),
                    amount: net,
                });
            }
        }

        for adjustment in &self.archive.stock_adjustments {
            if adjustment.product_id == product && !adjustment.quantity_change.is_zero() {
                movements.push(Movement {
                    date: adjustment.date,
                    doc_type: DocumentType::StockAdjustment,
                    doc_number: adjustment.number.clone(),
                    description: adjustment
                        .note
                        .clone()
                        .unwrap_or_else(|| format!("Adjustment {}", adjustment.number)),
                    amount: adjustment.quantity_change,
                });
            }
        }

        movements
    }
}

fn sale_movement(sale: &Sale, quantity: Decimal) -> Movement {
    Movement {
        date: sale.date,
        doc_type: DocumentType::Sale,
        doc_number: sale.number.clone(),
        description: format!("Sale {}", sale.number),
        amount: -quantity,
    }
}

fn sales_return_movement(ret: &SalesReturn, quantity: Decimal) -> Movement {
    Movement {
        date: ret.date,
        doc_type: DocumentType::SalesReturn,
        doc_number: ret.number.clone(),
        description: format!("Return {}", ret.number),
        amount: quantity,
    }
}
