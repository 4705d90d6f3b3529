//! Utils

use clap::Parser;
use rusty_money::{Money, iso::Currency};

use crate::{
    calculator::{CalculatorConfig, DEFAULT_LTM_THRESHOLD},
    charges::AdditionalCharge,
    embellishments::EmbellishmentType,
    fixtures::{FixtureError, price_tables::parse_price},
    observability::LoggingConfig,
    sizes::{ONE_SIZE_FITS_ALL, SizeQuantities},
};

/// Arguments for the quote example
#[derive(Debug, Parser)]
#[command(name = "quote", about = "Price a tiered apparel quote", long_about = None)]
pub struct QuoteArgs {
    /// Price table fixture to use
    #[arg(short, long, env = "PRICE_TABLE", default_value = "embroidery-tees")]
    pub table: String,

    /// Directory containing the `price-tables` fixtures
    #[arg(long, env = "FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures: String,

    /// Quantity for a size, as SIZE=QTY (repeatable)
    #[arg(short, long = "size", value_parser = parse_key_value::<u32>)]
    pub sizes: Vec<(String, u32)>,

    /// Units of the same embellishment type already in the cart
    #[arg(short, long, default_value_t = 0)]
    pub existing: u32,

    /// Embellishment type, used for the quote ID
    #[arg(long, default_value = "embroidery")]
    pub embellishment: EmbellishmentType,

    /// Combined quantity below which the minimum-order fee applies
    #[arg(long, env = "LTM_THRESHOLD", default_value_t = DEFAULT_LTM_THRESHOLD)]
    pub ltm_threshold: u32,

    /// Minimum-order fee used when a tier sets none
    #[arg(long, env = "MINIMUM_ORDER_FEE", default_value = "50.00 USD")]
    pub minimum_order_fee: String,

    /// Per-unit charge, as NAME=AMOUNT (repeatable)
    #[arg(long = "per-unit-charge", value_parser = parse_key_value::<String>)]
    pub per_unit_charges: Vec<(String, String)>,

    /// Flat charge, as NAME=AMOUNT (repeatable)
    #[arg(long = "flat-charge", value_parser = parse_key_value::<String>)]
    pub flat_charges: Vec<(String, String)>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl QuoteArgs {
    /// Load arguments from the command line, the environment and `.env`
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Requested quantities
    pub fn request(&self) -> SizeQuantities {
        self.sizes
            .iter()
            .map(|(size, quantity)| (size.as_str(), *quantity))
            .collect()
    }

    /// Calculator defaults from the arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the minimum-order fee is not a valid amount.
    pub fn calculator_config(&self) -> Result<CalculatorConfig<'static>, FixtureError> {
        Ok(CalculatorConfig {
            ltm_threshold: self.ltm_threshold,
            minimum_order_fee: parse_money(&self.minimum_order_fee)?,
            fallback_size: ONE_SIZE_FITS_ALL.to_string(),
        })
    }

    /// Per-unit and flat charges from the arguments
    ///
    /// # Errors
    ///
    /// Returns an error if a charge amount is not a valid amount.
    pub fn charges(&self) -> Result<Vec<AdditionalCharge<'static>>, FixtureError> {
        let per_unit = self
            .per_unit_charges
            .iter()
            .map(|(name, amount)| {
                parse_money(amount).map(|money| AdditionalCharge::per_unit(name, money))
            });

        let flat = self
            .flat_charges
            .iter()
            .map(|(name, amount)| parse_money(amount).map(|money| AdditionalCharge::flat(name, money)));

        per_unit.chain(flat).collect()
    }
}

fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a `KEY=VALUE` argument.
///
/// # Errors
///
/// Returns an error if there is no `=` or the value does not parse.
pub fn parse_key_value<T>(s: &str) -> Result<(String, T), String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got: {s}"))?;

    let value = value
        .trim()
        .parse::<T>()
        .map_err(|err| format!("invalid value in {s}: {err}"))?;

    Ok((key.trim().to_string(), value))
}
