use std::{fmt, str::FromStr};

use clap::Args;
use till::{
    app::{Command, View},
    backend::Backend,
    checkout::{CustomerDetails, PaymentMethod},
    products::ProductId,
};

use super::{CliError, Frontend};

#[derive(Debug, Args)]
pub(crate) struct SellArgs {
    /// Product to sell, as `ID` or `IDxQTY`; repeat for more lines
    #[arg(long = "item", short = 'i', required = true)]
    items: Vec<SellItem>,

    /// Customer name
    #[arg(long)]
    customer: String,

    /// Customer phone number
    #[arg(long)]
    phone: String,

    /// Payment method
    #[arg(long, value_enum, default_value_t = PaymentMethod::Cash)]
    payment: PaymentMethod,
}

/// A product and how many units of it to ring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SellItem {
    product: ProductId,
    quantity: u32,
}

impl FromStr for SellItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product, quantity) = match s.split_once(['x', 'X', '*']) {
            Some((product, quantity)) => (product, quantity),
            None => (s, "1"),
        };

        let product = product
            .trim()
            .parse::<ProductId>()
            .map_err(|error| format!("invalid product id {product:?}: {error}"))?;

        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid quantity {quantity:?}: {error}"))?;

        if quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }

        Ok(Self { product, quantity })
    }
}

impl fmt::Display for SellItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.product, self.quantity)
    }
}

pub(crate) async fn run<B: Backend>(
    frontend: &mut Frontend<B>,
    args: SellArgs,
) -> Result<(), CliError> {
    frontend.dispatch(Command::Navigate(View::Pos)).await?;

    for item in &args.items {
        for _ in 0..item.quantity {
            frontend.dispatch(Command::AddToCart(item.product)).await?;
        }
    }

    frontend.dispatch(Command::OpenCheckout).await?;
    frontend
        .dispatch(Command::SubmitCheckout {
            customer: CustomerDetails {
                name: args.customer,
                phone: args.phone,
            },
            payment_method: args.payment,
        })
        .await?;

    frontend.render_receipt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_defaults_to_one_unit() {
        assert_eq!(
            "7".parse::<SellItem>(),
            Ok(SellItem {
                product: ProductId(7),
                quantity: 1
            })
        );
    }

    #[test]
    fn item_accepts_quantity_suffix() {
        assert_eq!(
            "#12x3".parse::<SellItem>().map(|item| item.to_string()),
            Ok("12x3".to_string())
        );
    }

    #[test]
    fn item_rejects_zero_quantity() {
        assert!("4x0".parse::<SellItem>().is_err(), "zero quantity accepted");
    }
}
