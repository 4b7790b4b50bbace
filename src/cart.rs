//! Cart

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    pricing::{Totals, line_amount},
    products::{Product, ProductId},
};

/// Errors related to cart changes.
///
/// All of these leave the cart unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product is not in the catalog.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// The product has no stock left.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// The cart already holds every unit in stock (product, stock).
    #[error("max stock reached for product {0} ({1} in stock)")]
    StockExceeded(ProductId, u32),

    /// There is no line for the product.
    #[error("product {0} is not in the cart")]
    MissingLine(ProductId),
}

/// Single-step quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityDelta {
    /// Add one unit
    Increment,
    /// Remove one unit
    Decrement,
}

impl FromStr for QuantityDelta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "+1" | "1" | "inc" => Ok(QuantityDelta::Increment),
            "-" | "-1" | "dec" => Ok(QuantityDelta::Decrement),
            other => Err(format!("expected + or -, got {other:?}")),
        }
    }
}

impl fmt::Display for QuantityDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityDelta::Increment => f.write_str("+1"),
            QuantityDelta::Decrement => f.write_str("-1"),
        }
    }
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product in this line
    pub product: ProductId,

    /// Product name when it was added
    pub name: String,

    /// Unit price when it was added
    pub price: Decimal,

    /// Units in the cart, always at least one
    pub quantity: u32,
}

impl CartLine {
    /// Price multiplied by quantity.
    pub fn amount(&self) -> Decimal {
        line_amount(self.price, self.quantity)
    }
}

/// Products selected for checkout, unique by product and kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// A new line snapshots the product's current name and price. Returns the quantity now in
    /// the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`]: the product has no stock.
    /// - [`CartError::StockExceeded`]: the cart already holds all units in stock.
    pub fn add_item(&mut self, product: &Product) -> Result<u32, CartError> {
        if product.is_sold_out() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        if let Some(line) = self.line_mut(product.id) {
            if line.quantity >= product.stock {
                return Err(CartError::StockExceeded(product.id, product.stock));
            }

            line.quantity += 1;

            return Ok(line.quantity);
        }

        self.lines.push(CartLine {
            product: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
        });

        Ok(1)
    }

    /// Step the quantity of an existing line up or down.
    ///
    /// `stock` is the product's current stock. Returns the new quantity, or `None` when the
    /// line was removed because it reached zero.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingLine`]: no line for `product`.
    /// - [`CartError::StockExceeded`]: an increment would exceed `stock`.
    pub fn change_quantity(
        &mut self,
        product: ProductId,
        delta: QuantityDelta,
        stock: u32,
    ) -> Result<Option<u32>, CartError> {
        let line = self
            .line_mut(product)
            .ok_or(CartError::MissingLine(product))?;

        match delta {
            QuantityDelta::Increment => {
                if line.quantity >= stock {
                    return Err(CartError::StockExceeded(product, stock));
                }

                line.quantity += 1;

                Ok(Some(line.quantity))
            }
            QuantityDelta::Decrement => {
                line.quantity = line.quantity.saturating_sub(1);

                if line.quantity == 0 {
                    self.lines.retain(|line| line.product != product);

                    return Ok(None);
                }

                Ok(Some(line.quantity))
            }
        }
    }

    /// Remove the line for `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingLine`] if there is no such line.
    pub fn remove(&mut self, product: ProductId) -> Result<CartLine, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product == product)
            .ok_or(CartError::MissingLine(product))?;

        Ok(self.lines.remove(idx))
    }

    /// Clamp quantities to the stock levels in a freshly fetched product list.
    ///
    /// Lines for sold-out products are dropped; lines for products missing from the list are
    /// left alone. Returns the number of lines that changed.
    pub fn reconcile(&mut self, products: &[Product]) -> usize {
        let mut changed = 0;

        self.lines.retain_mut(|line| {
            let Some(product) = products.iter().find(|p| p.id == line.product) else {
                return true;
            };

            if line.quantity <= product.stock {
                return true;
            }

            changed += 1;
            line.quantity = product.stock;

            line.quantity > 0
        });

        changed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line amounts.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::amount).sum()
    }

    /// Subtotal, tax and total at full precision.
    pub fn totals(&self) -> Totals {
        Totals::from_subtotal(self.subtotal())
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for `product`, if any.
    pub fn line(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product == product)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product == product)
    }
}
