//! Pricing
//!
//! All arithmetic stays in full [`Decimal`] precision. Rounding to two decimal places only
//! happens at the display boundary, via [`Totals::rounded`] and [`format_money`].

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Sales tax rate applied to every order, as a fraction (5%).
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Number of decimal places used when showing money.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur while preparing amounts for display.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount does not fit in the minor units of the display currency.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),
}

/// Subtotal, tax and total for a set of priced lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Sum of every line amount before tax.
    pub subtotal: Decimal,

    /// Tax charged on the subtotal.
    pub tax: Decimal,

    /// Amount payable: subtotal plus tax.
    pub total: Decimal,
}

impl Totals {
    /// Derive tax and total from a subtotal.
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax = tax_on(subtotal);

        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Reconstruct the breakdown of a historical order from its total alone.
    ///
    /// Inverts the tax rate exactly (`total / 1.05`) and assigns the remainder to tax, so the
    /// parts always add back up to the stored total.
    pub fn from_total(total: Decimal) -> Self {
        let subtotal = total / (Decimal::ONE + TAX_RATE);

        Self {
            subtotal,
            tax: total - subtotal,
            total,
        }
    }

    /// Copy of these totals rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_for_display(self.subtotal),
            tax: round_for_display(self.tax),
            total: round_for_display(self.total),
        }
    }

    /// Whether every figure is zero.
    pub fn is_zero(&self) -> bool {
        self.subtotal.is_zero() && self.tax.is_zero() && self.total.is_zero()
    }
}

/// Tax due on `subtotal` at [`TAX_RATE`].
pub fn tax_on(subtotal: Decimal) -> Decimal {
    Percentage::from(TAX_RATE) * subtotal
}

/// Amount for `quantity` units at `price`.
pub fn line_amount(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Round an amount half away from zero to [`DISPLAY_DECIMAL_PLACES`].
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        DISPLAY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Convert an amount into [`Money`] in the given currency, rounding for display.
///
/// # Errors
///
/// Returns [`PricingError::Unrepresentable`] if the rounded amount overflows `i64` minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = round_for_display(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or(PricingError::Unrepresentable(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Format an amount with the currency symbol, e.g. `₹262.50`.
///
/// # Errors
///
/// Returns [`PricingError::Unrepresentable`] if the amount overflows minor units.
pub fn format_money(amount: Decimal, currency: &'static Currency) -> Result<String, PricingError> {
    Ok(to_money(amount, currency)?.to_string())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn tax_rate_is_five_hundredths() {
        assert_eq!(TAX_RATE, Decimal::new(5, 2));
        assert_eq!(TAX_RATE.to_string(), "0.05");
    }

    #[test]
    fn tax_is_five_percent_of_subtotal() {
        assert_eq!(tax_on(Decimal::from(250)), Decimal::new(1250, 2));
        assert_eq!(tax_on(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn totals_from_subtotal() {
        let totals = Totals::from_subtotal(Decimal::from(250));

        assert_eq!(totals.subtotal, Decimal::from(250));
        assert_eq!(totals.tax, Decimal::new(1250, 2));
        assert_eq!(totals.total, Decimal::new(26250, 2));
    }

    #[test]
    fn totals_keep_full_precision_until_rounded() {
        let totals = Totals::from_subtotal(Decimal::new(30, 2));

        assert_eq!(totals.tax, Decimal::new(15, 3));
        assert_eq!(totals.total, Decimal::new(315, 3));

        let rounded = totals.rounded();

        assert_eq!(rounded.tax, Decimal::new(2, 2));
        assert_eq!(rounded.total, Decimal::new(32, 2));
    }

    #[test]
    fn from_total_inverts_the_tax_rate() {
        let totals = Totals::from_total(Decimal::new(26250, 2));

        assert_eq!(totals.subtotal, Decimal::from(250));
        assert_eq!(totals.tax, Decimal::new(1250, 2));
        assert_eq!(totals.subtotal + totals.tax, totals.total);
    }

    #[test]
    fn from_total_parts_always_sum_to_total() {
        let totals = Totals::from_total(Decimal::from(100));

        assert_eq!(totals.subtotal + totals.tax, Decimal::from(100));
        assert_eq!(totals.rounded().subtotal, Decimal::new(9524, 2));
        assert_eq!(totals.rounded().tax, Decimal::new(476, 2));
    }

    #[test]
    fn zero_totals() {
        assert!(Totals::default().is_zero());
        assert!(Totals::from_subtotal(Decimal::ZERO).is_zero());
        assert!(!Totals::from_subtotal(Decimal::from(1)).is_zero());
    }

    #[test]
    fn line_amount_multiplies_price_by_quantity() {
        assert_eq!(line_amount(Decimal::new(1999, 2), 3), Decimal::new(5997, 2));
        assert_eq!(line_amount(Decimal::new(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_for_display(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_for_display(Decimal::new(1004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn to_money_uses_minor_units() -> TestResult {
        assert_eq!(
            to_money(Decimal::new(2625, 1), iso::GBP)?,
            Money::from_minor(26_250, iso::GBP)
        );

        Ok(())
    }

    #[test]
    fn format_money_includes_two_decimals() -> TestResult {
        let formatted = format_money(Decimal::new(125, 1), iso::GBP)?;

        assert!(formatted.contains("12.50"), "unexpected format: {formatted}");

        Ok(())
    }

    #[test]
    fn to_money_rejects_overflowing_amounts() {
        assert_eq!(
            to_money(Decimal::MAX, iso::GBP),
            Err(PricingError::Unrepresentable(Decimal::MAX))
        );
    }
}
