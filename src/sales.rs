//! Sales and dashboard statistics

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{pricing::line_amount, products::ProductId};

/// Number of sales shown in the dashboard summary.
pub const RECENT_SALES_WINDOW: usize = 5;

/// A finalised, backend-confirmed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Invoice number assigned by the backend
    pub invoice_id: String,

    /// Customer name
    pub customer_name: String,

    /// Customer phone number
    pub customer_phone: String,

    /// Amount paid, tax included
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Payment method as recorded by the backend
    pub payment_method: String,

    /// When the backend recorded the sale
    pub date: DateTime,

    /// Items sold
    #[serde(default)]
    pub items: Vec<SaleItem>,

    /// Subtotal persisted at checkout, when the backend kept it
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub subtotal: Option<Decimal>,

    /// Tax persisted at checkout, when the backend kept it
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub tax: Option<Decimal>,
}

/// One line of a recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Product sold; the backend may report `0` for historical rows
    #[serde(default)]
    pub id: ProductId,

    /// Product name at the time of sale
    pub name: String,

    /// Unit price at the time of sale
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Units sold
    pub qty: u32,
}

impl SaleItem {
    /// Price multiplied by quantity.
    pub fn amount(&self) -> Decimal {
        line_amount(self.price, self.qty)
    }
}

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Revenue today
    #[serde(with = "rust_decimal::serde::float")]
    pub today: Decimal,

    /// Revenue this month
    #[serde(with = "rust_decimal::serde::float")]
    pub month: Decimal,

    /// All-time revenue
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,

    /// Number of bills issued
    pub bills: u64,

    /// Number of products below the low-stock threshold
    pub low_stock: u32,
}

impl Stats {
    /// Whether any product needs restocking.
    pub fn has_low_stock(&self) -> bool {
        self.low_stock > 0
    }
}

/// The most recent `limit` sales, newest first.
pub fn recent_sales(sales: &[Sale], limit: usize) -> Vec<&Sale> {
    let mut recent: Vec<&Sale> = sales.iter().collect();

    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(limit);

    recent
}
