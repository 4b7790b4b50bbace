//! Receipt

use std::io;

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    checkout::{CustomerDetails, PaymentMethod},
    pricing::{PricingError, Totals, format_money, line_amount},
    sales::Sale,
};

/// Format used for receipt dates.
pub const RECEIPT_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount could not be formatted.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One printed line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Product name
    pub name: String,

    /// Units bought
    pub quantity: u32,

    /// Unit price
    pub price: Decimal,

    /// Price multiplied by quantity
    pub amount: Decimal,
}

impl ReceiptLine {
    fn new(name: &str, price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            price,
            amount: line_amount(price, quantity),
        }
    }
}

/// Receipt for a completed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    invoice_id: String,
    date: DateTime,
    customer: CustomerDetails,
    payment_method: String,
    lines: Vec<ReceiptLine>,
    totals: Totals,
}

impl Receipt {
    /// Build the receipt for a checkout the backend just confirmed.
    ///
    /// The invoice number and date come from the confirmation; everything else comes from what
    /// the client submitted.
    pub fn from_confirmation(
        confirmation: &Sale,
        customer: &CustomerDetails,
        payment_method: PaymentMethod,
        lines: &[CartLine],
        totals: Totals,
    ) -> Self {
        Self {
            invoice_id: confirmation.invoice_id.clone(),
            date: confirmation.date,
            customer: customer.clone(),
            payment_method: payment_method.to_string(),
            lines: lines
                .iter()
                .map(|line| ReceiptLine::new(&line.name, line.price, line.quantity))
                .collect(),
            totals,
        }
    }

    /// Build the receipt for a historical sale.
    ///
    /// Persisted subtotal and tax are used as-is, and a missing one is the total minus the other.
    /// When the backend kept neither, the breakdown is reconstructed from the total (see
    /// [`Totals::from_total`]).
    pub fn from_sale(sale: &Sale) -> Self {
        let totals = match (sale.subtotal, sale.tax) {
            (Some(subtotal), Some(tax)) => Totals {
                subtotal,
                tax,
                total: sale.total,
            },
            (Some(subtotal), None) => Totals {
                subtotal,
                tax: sale.total - subtotal,
                total: sale.total,
            },
            (None, Some(tax)) => Totals {
                subtotal: sale.total - tax,
                tax,
                total: sale.total,
            },
            (None, None) => Totals::from_total(sale.total),
        };

        Self {
            invoice_id: sale.invoice_id.clone(),
            date: sale.date,
            customer: CustomerDetails {
                name: sale.customer_name.clone(),
                phone: sale.customer_phone.clone(),
            },
            payment_method: sale.payment_method.clone(),
            lines: sale
                .items
                .iter()
                .map(|item| ReceiptLine::new(&item.name, item.price, item.qty))
                .collect(),
            totals,
        }
    }

    /// Invoice number
    pub fn invoice_id(&self) -> &str {
        &self.invoice_id
    }

    /// Date and time of the sale
    pub fn date(&self) -> DateTime {
        self.date
    }

    /// Date formatted for printing.
    pub fn formatted_date(&self) -> String {
        self.date.strftime(RECEIPT_DATE_FORMAT).to_string()
    }

    /// Customer details
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Payment method
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Printed lines
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Monetary totals, at full precision
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Write the receipt as a text table.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if an amount cannot be formatted or writing fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), ReceiptError> {
        writeln!(out, "Invoice #{}", self.invoice_id).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "Date:     {}", self.formatted_date()).map_err(|_err| ReceiptError::IO)?;
        writeln!(
            out,
            "Customer: {} ({})",
            self.customer.name, self.customer.phone
        )
        .map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Price", "Amount"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                format!("x{}", line.quantity),
                format_money(line.price, currency)?,
                format_money(line.amount, currency)?,
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        let summary = [
            ("Subtotal", format_money(self.totals.subtotal, currency)?),
            ("Tax (5%)", format_money(self.totals.tax, currency)?),
            ("Total", format_money(self.totals.total, currency)?),
        ];

        let value_width = summary
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or_default();

        for (label, value) in summary {
            writeln!(out, "{label:>12}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out, "{:>12}  {}", "Paid by", self.payment_method).map_err(|_err| ReceiptError::IO)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{products::ProductId, sales::SaleItem};

    use super::*;

    fn confirmation() -> Sale {
        Sale {
            invoice_id: "9f2c1a".to_string(),
            customer_name: String::new(),
            customer_phone: String::new(),
            total: Decimal::new(26_250, 2),
            payment_method: "Cash".to_string(),
            date: date(2024, 6, 14).at(17, 30, 5, 0),
            items: vec![],
            subtotal: None,
            tax: None,
        }
    }

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine {
                product: ProductId(1),
                name: "Paneer Roll".to_string(),
                price: Decimal::from(100),
                quantity: 2,
            },
            CartLine {
                product: ProductId(2),
                name: "Lassi".to_string(),
                price: Decimal::from(50),
                quantity: 1,
            },
        ]
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Meera".to_string(),
            phone: "9000000001".to_string(),
        }
    }

    #[test]
    fn from_confirmation_uses_local_lines_and_totals() {
        let totals = Totals::from_subtotal(Decimal::from(250));

        let receipt = Receipt::from_confirmation(
            &confirmation(),
            &customer(),
            PaymentMethod::Card,
            &lines(),
            totals,
        );

        assert_eq!(receipt.invoice_id(), "9f2c1a");
        assert_eq!(receipt.customer(), &customer());
        assert_eq!(receipt.payment_method(), "Card");
        assert_eq!(receipt.totals(), totals);
        assert_eq!(
            receipt.lines().iter().map(|line| line.amount).collect::<Vec<_>>(),
            [Decimal::from(200), Decimal::from(50)]
        );
    }

    #[test]
    fn formatted_date_is_day_first() {
        let receipt = Receipt::from_sale(&confirmation());

        assert_eq!(receipt.formatted_date(), "14/06/2024, 17:30:05");
    }

    #[test]
    fn from_sale_prefers_persisted_breakdown() {
        let sale = Sale {
            subtotal: Some(Decimal::new(24_999, 2)),
            tax: Some(Decimal::new(1_251, 2)),
            ..confirmation()
        };

        let totals = Receipt::from_sale(&sale).totals();

        assert_eq!(totals.subtotal, Decimal::new(24_999, 2));
        assert_eq!(totals.tax, Decimal::new(1_251, 2));
        assert_eq!(totals.total, Decimal::new(26_250, 2));
    }

    #[test]
    fn from_sale_derives_tax_from_persisted_subtotal() {
        let sale = Sale {
            subtotal: Some(Decimal::from(250)),
            ..confirmation()
        };

        assert_eq!(Receipt::from_sale(&sale).totals().tax, Decimal::new(1_250, 2));
    }

    #[test]
    fn from_sale_derives_subtotal_from_persisted_tax() {
        let sale = Sale {
            tax: Some(Decimal::new(1_300, 2)),
            ..confirmation()
        };

        let totals = Receipt::from_sale(&sale).totals();

        assert_eq!(totals.tax, Decimal::new(1_300, 2));
        assert_eq!(totals.subtotal, Decimal::new(24_950, 2));
        assert_eq!(totals.subtotal + totals.tax, totals.total);
    }

    #[test]
    fn from_sale_reconstructs_missing_breakdown() {
        let totals = Receipt::from_sale(&confirmation()).totals();

        assert_eq!(totals.subtotal, Decimal::from(250));
        assert_eq!(totals.tax, Decimal::new(1_250, 2));
    }

    #[test]
    fn from_sale_copies_items_and_customer() {
        let sale = Sale {
            customer_name: "Kabir".to_string(),
            customer_phone: "555".to_string(),
            items: vec![SaleItem {
                id: ProductId(0),
                name: "Chai".to_string(),
                price: Decimal::from(20),
                qty: 3,
            }],
            ..confirmation()
        };

        let receipt = Receipt::from_sale(&sale);

        assert_eq!(receipt.customer().name, "Kabir");
        assert_eq!(receipt.lines().len(), 1);
        assert_eq!(receipt.lines().first().map(|line| line.amount), Some(Decimal::from(60)));
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let receipt = Receipt::from_confirmation(
            &confirmation(),
            &customer(),
            PaymentMethod::Upi,
            &lines(),
            Totals::from_subtotal(Decimal::from(250)),
        );

        let mut out = Vec::new();
        receipt.write_to(&mut out, iso::GBP)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("Invoice #9f2c1a"), "missing invoice: {text}");
        assert!(text.contains("Meera (9000000001)"), "missing customer: {text}");
        assert!(text.contains("Paneer Roll"), "missing line: {text}");
        assert!(text.contains("200.00"), "missing line amount: {text}");
        assert!(text.contains("12.50"), "missing tax: {text}");
        assert!(text.contains("262.50"), "missing total: {text}");
        assert!(text.contains("UPI"), "missing payment method: {text}");

        Ok(())
    }
}
