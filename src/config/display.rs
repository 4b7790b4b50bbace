//! Display Config

use clap::Args;
use rusty_money::iso::{self, Currency};

/// Currency used to print amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CurrencyCode {
    /// Indian rupee
    #[default]
    Inr,
    /// US dollar
    Usd,
    /// Euro
    Eur,
    /// Pound sterling
    Gbp,
}

impl CurrencyCode {
    /// ISO currency definition.
    pub fn currency(self) -> &'static Currency {
        match self {
            CurrencyCode::Inr => iso::INR,
            CurrencyCode::Usd => iso::USD,
            CurrencyCode::Eur => iso::EUR,
            CurrencyCode::Gbp => iso::GBP,
        }
    }
}

/// Output settings.
#[derive(Debug, Args)]
pub struct DisplayConfig {
    /// Currency amounts are shown in
    #[arg(long, env = "TILL_CURRENCY", value_enum, default_value_t = CurrencyCode::Inr, global = true)]
    pub currency: CurrencyCode,
}
