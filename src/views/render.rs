//! Text rendering of view models

use std::io::Write;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    app::EditorMode,
    checkout::CheckoutState,
    pricing::{PricingError, Totals, format_money},
    products::{LOW_STOCK_THRESHOLD, Product},
    receipt::{RECEIPT_DATE_FORMAT, ReceiptError},
    reporting::Summary,
    sales::Sale,
};

use super::{Body, CartView, CheckoutModal, EditorModal, PosView, Screen};

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An amount could not be formatted.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The receipt could not be written.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Render the whole screen: the main view, then any open overlay.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn screen<W: Write>(
    out: &mut W,
    screen: &Screen<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    match &screen.body {
        Body::Login => writeln!(out, "Not logged in.").map_err(|_err| RenderError::IO)?,
        Body::Dashboard(summary) => dashboard(out, summary, currency)?,
        Body::Pos(pos_view) => pos(out, pos_view, currency)?,
        Body::Inventory(products) => inventory(out, products, currency)?,
        Body::Sales(history) => sales(out, history, currency)?,
    }

    if let Some(modal) = &screen.checkout {
        writeln!(out).map_err(|_err| RenderError::IO)?;
        checkout(out, modal, currency)?;
    }

    if let Some(modal) = &screen.editor {
        writeln!(out).map_err(|_err| RenderError::IO)?;
        editor(out, modal, currency)?;
    }

    if let Some(receipt) = screen.receipt {
        writeln!(out).map_err(|_err| RenderError::IO)?;
        receipt.write_to(&mut *out, currency)?;
    }

    Ok(())
}

/// Statistics cards followed by the recent sales table.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn dashboard<W: Write>(
    out: &mut W,
    summary: &Summary<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    match summary.stats {
        Some(stats) => {
            let mut builder = Builder::default();

            builder.push_record([
                "Today's Sales",
                "This Month",
                "Total Revenue",
                "Total Bills",
                "Low Stock",
            ]);
            builder.push_record([
                format_money(stats.today, currency)?,
                format_money(stats.month, currency)?,
                format_money(stats.revenue, currency)?,
                stats.bills.to_string(),
                if stats.has_low_stock() {
                    format!("{} (!)", stats.low_stock)
                } else {
                    stats.low_stock.to_string()
                },
            ]);

            let mut table = builder.build();
            table.with(Style::modern_rounded());

            writeln!(out, "{table}").map_err(|_err| RenderError::IO)?;

            if stats.has_low_stock() {
                writeln!(
                    out,
                    "{} product(s) have fewer than {LOW_STOCK_THRESHOLD} units in stock.",
                    stats.low_stock
                )
                .map_err(|_err| RenderError::IO)?;
            }
        }
        None => writeln!(out, "No statistics loaded.").map_err(|_err| RenderError::IO)?,
    }

    writeln!(out, "\nRecent Sales").map_err(|_err| RenderError::IO)?;

    sales_table(out, &summary.recent, currency)
}

/// Product grid and cart panel.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn pos<W: Write>(
    out: &mut W,
    view: &PosView<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if view.products.is_empty() {
        writeln!(out, "No products.").map_err(|_err| RenderError::IO)?;
    } else {
        let mut builder = Builder::default();

        builder.push_record(["ID", "Name", "Category", "Price", "Stock", "In cart"]);

        for tile in &view.products {
            let stock = if tile.product.is_sold_out() {
                "SOLD OUT".to_string()
            } else if tile.available {
                tile.product.stock.to_string()
            } else {
                format!("{} (max)", tile.product.stock)
            };

            builder.push_record([
                tile.product.id.to_string(),
                tile.product.name.clone(),
                tile.product.category.to_string(),
                format_money(tile.product.price, currency)?,
                stock,
                tile.in_cart.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| RenderError::IO)?;
    }

    writeln!(out, "\nCart").map_err(|_err| RenderError::IO)?;

    cart(out, &view.cart, currency)
}

/// Cart lines and totals.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn cart<W: Write>(
    out: &mut W,
    view: &CartView<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if view.lines.is_empty() {
        writeln!(out, "Cart is empty.").map_err(|_err| RenderError::IO)?;
    } else {
        let mut builder = Builder::default();

        builder.push_record(["ID", "Item", "Qty", "Price", "Amount"]);

        for line in view.lines {
            builder.push_record([
                line.product.to_string(),
                line.name.clone(),
                line.quantity.to_string(),
                format_money(line.price, currency)?,
                format_money(line.amount(), currency)?,
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| RenderError::IO)?;
    }

    totals(out, view.totals, currency)
}

/// Product management table.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn inventory<W: Write>(
    out: &mut W,
    products: &[Product],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if products.is_empty() {
        return writeln!(out, "No products.").map_err(|_err| RenderError::IO);
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Category", "Price", "Stock", "Image"]);

    for product in products {
        let stock = if product.is_low_stock() {
            format!("{} (low)", product.stock)
        } else {
            product.stock.to_string()
        };

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            format!("[{}]", product.category.badge()),
            format_money(product.price, currency)?,
            stock,
            product.image_or_placeholder().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| RenderError::IO)
}

/// Full sales history.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn sales<W: Write>(
    out: &mut W,
    history: &[Sale],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let rows: Vec<&Sale> = history.iter().collect();

    sales_table(out, &rows, currency)
}

fn sales_table<W: Write>(
    out: &mut W,
    rows: &[&Sale],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if rows.is_empty() {
        return writeln!(out, "No sales yet.").map_err(|_err| RenderError::IO);
    }

    let mut builder = Builder::default();

    builder.push_record(["Invoice", "Customer", "Phone", "Total", "Payment", "Date"]);

    for sale in rows {
        builder.push_record([
            format!("#{}", sale.invoice_id),
            sale.customer_name.clone(),
            sale.customer_phone.clone(),
            format_money(sale.total, currency)?,
            sale.payment_method.clone(),
            sale.date.strftime(RECEIPT_DATE_FORMAT).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| RenderError::IO)
}

/// Checkout modal.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn checkout<W: Write>(
    out: &mut W,
    modal: &CheckoutModal<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    writeln!(out, "Checkout").map_err(|_err| RenderError::IO)?;

    totals(out, modal.totals, currency)?;

    if let Some((customer, payment_method)) = modal.details {
        writeln!(
            out,
            "Customer: {} ({}), paying by {payment_method}",
            customer.name, customer.phone
        )
        .map_err(|_err| RenderError::IO)?;
    }

    let written = match modal.state {
        CheckoutState::Submitting => writeln!(out, "Placing order..."),
        CheckoutState::Failed(reason) => {
            writeln!(out, "Order failed: {reason}. Submit again to retry or cancel.")
        }
        CheckoutState::Idle | CheckoutState::ModalOpen | CheckoutState::Success(_) => {
            writeln!(out, "Enter customer details and payment method to place the order.")
        }
    };

    written.map_err(|_err| RenderError::IO)
}

/// Product editor modal.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be formatted or writing fails.
pub fn editor<W: Write>(
    out: &mut W,
    modal: &EditorModal<'_>,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let title = match modal.mode {
        EditorMode::Create => "Add Product".to_string(),
        EditorMode::Edit(product) => format!("Edit Product #{product}"),
    };

    writeln!(out, "{title}").map_err(|_err| RenderError::IO)?;

    let Some(product) = modal.current else {
        return Ok(());
    };

    let mut builder = Builder::default();

    builder.push_record(["Name".to_string(), product.name.clone()]);
    builder.push_record(["Category".to_string(), product.category.to_string()]);
    builder.push_record(["Price".to_string(), format_money(product.price, currency)?]);
    builder.push_record(["Stock".to_string(), product.stock.to_string()]);

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "{table}").map_err(|_err| RenderError::IO)
}

fn totals<W: Write>(
    out: &mut W,
    totals: Totals,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let rows = [
        ("Subtotal", format_money(totals.subtotal, currency)?),
        ("Tax (5%)", format_money(totals.tax, currency)?),
        ("Total", format_money(totals.total, currency)?),
    ];

    for (label, value) in rows {
        writeln!(out, "{label:>12}  {value}").map_err(|_err| RenderError::IO)?;
    }

    Ok(())
}
