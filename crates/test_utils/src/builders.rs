//! Document builders
//!
//! Fluent builders for the business documents used across the test suite.
//! Totals are derived from the lines with an 18% VAT default, matching how
//! the upstream screens hand documents to the core.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BusinessId, CustomerId, ProductId, PurchaseId, SaleId, SupplierId};
use domain_ledger::documents::{
    Purchase, PurchaseLine, Sale, SaleChannel, SaleLine,
};

use crate::fixtures::money;

const DEFAULT_VAT_RATE: Decimal = dec!(0.18);

/// Builds a [`Sale`] with derived totals
pub struct SaleBuilder {
    business_id: BusinessId,
    number: String,
    date: NaiveDate,
    channel: SaleChannel,
    customer_id: Option<CustomerId>,
    lines: Vec<SaleLine>,
    vat_rate: Decimal,
}

impl SaleBuilder {
    pub fn new(business_id: BusinessId, number: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            business_id,
            number: number.into(),
            date,
            channel: SaleChannel::Pos,
            customer_id: None,
            lines: Vec::new(),
            vat_rate: DEFAULT_VAT_RATE,
        }
    }

    pub fn invoice_for(mut self, customer_id: CustomerId) -> Self {
        self.channel = SaleChannel::Invoice;
        self.customer_id = Some(customer_id);
        self
    }

    pub fn vat_rate(mut self, rate: Decimal) -> Self {
        self.vat_rate = rate;
        self
    }

    /// Adds a product line; `unit_cost` feeds the COGS posting when given
    pub fn line(
        mut self,
        product_id: ProductId,
        quantity: Decimal,
        unit_price: Decimal,
        unit_cost: Option<Decimal>,
    ) -> Self {
        self.lines.push(SaleLine {
            product_id: Some(product_id),
            quantity,
            unit_price: money(unit_price),
            unit_cost: unit_cost.map(money),
            components: vec![],
        });
        self
    }

    pub fn build(self) -> Sale {
        let net: Decimal = self
            .lines
            .iter()
            .map(|l| l.unit_price.amount() * l.quantity)
            .sum();
        let vat = (net * self.vat_rate).round_dp(2);
        Sale {
            id: SaleId::new(),
            number: self.number,
            business_id: self.business_id,
            date: self.date,
            channel: self.channel,
            customer_id: self.customer_id,
            lines: self.lines,
            net_total: money(net),
            vat_total: money(vat),
            gross_total: money(net + vat),
        }
    }
}

/// Builds a [`Purchase`] with derived totals
pub struct PurchaseBuilder {
    business_id: BusinessId,
    number: String,
    date: NaiveDate,
    supplier_id: SupplierId,
    lines: Vec<PurchaseLine>,
    vat_rate: Decimal,
}

impl PurchaseBuilder {
    pub fn new(
        business_id: BusinessId,
        number: impl Into<String>,
        date: NaiveDate,
        supplier_id: SupplierId,
    ) -> Self {
        Self {
            business_id,
            number: number.into(),
            date,
            supplier_id,
            lines: Vec::new(),
            vat_rate: DEFAULT_VAT_RATE,
        }
    }

    pub fn line(mut self, product_id: ProductId, quantity: Decimal, unit_cost: Decimal) -> Self {
        self.lines.push(PurchaseLine {
            product_id,
            quantity,
            unit_cost: money(unit_cost),
        });
        self
    }

    pub fn build(self) -> Purchase {
        let net: Decimal = self
            .lines
            .iter()
            .map(|l| l.unit_cost.amount() * l.quantity)
            .sum();
        let vat = (net * self.vat_rate).round_dp(2);
        Purchase {
            id: PurchaseId::new(),
            number: self.number,
            business_id: self.business_id,
            date: self.date,
            supplier_id: self.supplier_id,
            lines: self.lines,
            net_total: money(net),
            vat_total: money(vat),
            gross_total: money(net + vat),
        }
    }
}
