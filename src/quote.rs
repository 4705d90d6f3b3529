//! Quote
//!
//! The result of pricing a request, and its terminal rendering.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::money::{AmountError, to_money};

/// Errors that can occur while rendering a quote.
#[derive(Debug, Error)]
pub enum QuoteRenderError {
    /// An amount could not be rounded for display.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Data-quality gaps found while pricing. None of these stop a calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingWarning {
    /// Neither the size nor the fallback size had a price; the size priced at zero.
    MissingPrice {
        /// Requested size
        size: String,
        /// Tier the price was looked up at
        tier: String,
    },

    /// The size had no price and the fallback size's price was used.
    FallbackSizePrice {
        /// Requested size
        size: String,
        /// Tier the price was looked up at
        tier: String,
    },

    /// No tier contains the minimum-order threshold, so base prices came from the matched tier.
    ReferenceTierFallback {
        /// Minimum-order threshold in effect
        threshold: u32,
        /// Tier used instead
        tier: String,
    },
}

/// Pricing for one size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLine<'a> {
    /// Size label
    pub size: String,

    /// Units of this size being priced
    pub quantity: u32,

    /// Unit price from the table, before fees and charges
    pub base_unit_price: Money<'a, Currency>,

    /// Unit price including the minimum-order fee share and per-unit charges, unrounded
    pub display_unit_price: Decimal,

    /// Line total rounded to the currency's precision
    pub line_total: Money<'a, Currency>,
}

impl<'a> SizeLine<'a> {
    /// The display unit price rounded to the currency's precision.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if the amount cannot be represented.
    pub fn rounded_unit_price(&self) -> Result<Money<'a, Currency>, AmountError> {
        to_money(self.display_unit_price, self.line_total.currency())
    }
}

/// A flat charge included in the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCharge<'a> {
    /// Charge name
    pub name: String,

    /// Amount charged
    pub amount: Money<'a, Currency>,
}

/// Result of a tiered price calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    /// Tier matched by the combined quantity
    pub matched_tier_key: String,

    /// Tier base prices were looked up at; differs from the matched tier
    /// when the minimum-order fee applies
    pub reference_tier_key: String,

    /// Requested quantity plus the quantity already in the cart
    pub combined_quantity: u32,

    /// Whether the combined quantity is below the minimum-order threshold
    pub minimum_order_fee_applies: bool,

    /// The flat minimum-order fee, or zero
    pub minimum_order_fee_total: Money<'a, Currency>,

    /// Fee share carried by each unit of the combined quantity
    pub minimum_order_fee_per_unit: Decimal,

    /// Per-size pricing, in canonical size order
    pub lines: SmallVec<[SizeLine<'a>; 8]>,

    /// Sum of line totals
    pub total_price: Money<'a, Currency>,

    /// Flat charges, outside the line totals
    pub flat_charges: SmallVec<[AppliedCharge<'a>; 2]>,

    /// Total price plus flat charges
    pub grand_total: Money<'a, Currency>,

    /// The next better tier, if any
    pub next_tier_key: Option<String>,

    /// Units still needed to reach the next tier
    pub units_needed_for_next_tier: u32,

    /// Data-quality gaps found while pricing
    pub warnings: Vec<PricingWarning>,
}

impl PricingResult<'_> {
    /// Total units across all priced lines.
    pub fn quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// "Add N more" prompt for reaching the next tier, if there is one.
    pub fn next_tier_prompt(&self) -> Option<String> {
        let next = self.next_tier_key.as_deref()?;

        (self.units_needed_for_next_tier > 0).then(|| {
            format!(
                "Add {} more to reach the {next} tier",
                self.units_needed_for_next_tier
            )
        })
    }

    /// Writes the quote as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be rounded or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteRenderError> {
        let mut builder = Builder::default();

        builder.push_record(["Size", "Qty", "Base", "LTM / unit", "Unit", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                line.size.clone(),
                line.quantity.to_string(),
                line.base_unit_price.to_string(),
                format!("{:.4}", self.minimum_order_fee_per_unit),
                line.rounded_unit_price()?.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());

        writeln!(out, "\n{table}")?;

        writeln!(
            out,
            " Tier: {} ({} combined units)",
            self.matched_tier_key, self.combined_quantity
        )?;

        if self.minimum_order_fee_applies {
            writeln!(
                out,
                " Less-than-minimum fee: {} (priced at the {} tier)",
                self.minimum_order_fee_total, self.reference_tier_key
            )?;
        }

        writeln!(out, " Total: {}", self.total_price)?;

        for charge in &self.flat_charges {
            writeln!(out, " {}: {}", charge.name, charge.amount)?;
        }

        if !self.flat_charges.is_empty() {
            writeln!(out, " \x1b[1mGrand total: {}\x1b[0m", self.grand_total)?;
        }

        if let Some(prompt) = self.next_tier_prompt() {
            writeln!(out, " {prompt}")?;
        }

        for warning in &self.warnings {
            writeln!(out, " warning: {warning:?}")?;
        }

        Ok(())
    }
}
