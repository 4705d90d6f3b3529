//! Cart
//!
//! Priced quote lines. Lines of the same embellishment type bundle towards a
//! shared tier, so adding or removing a line reprices every other line of
//! that type.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    calculator::{CalculationError, TieredPriceCalculator},
    charges::AdditionalCharge,
    embellishments::EmbellishmentType,
    money::zero,
    prices::PriceTable,
    quote::PricingResult,
    sizes::SizeQuantities,
};

/// Errors related to cart changes or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A price table's currency differs from the cart currency (table currency, cart currency).
    #[error("price table has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// No line exists at the given index.
    #[error("no cart line at index {0}")]
    NoSuchLine(usize),

    /// Pricing a line failed.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One priced addition to the cart.
#[derive(Debug, Clone)]
pub struct CartLine<'a> {
    embellishment: EmbellishmentType,
    quantities: SizeQuantities,
    charges: Vec<AdditionalCharge<'a>>,
    table: PriceTable<'a>,
    pricing: PricingResult<'a>,
}

impl<'a> CartLine<'a> {
    /// Embellishment type of the line.
    pub fn embellishment(&self) -> EmbellishmentType {
        self.embellishment
    }

    /// Requested quantities.
    pub fn quantities(&self) -> &SizeQuantities {
        &self.quantities
    }

    /// Additional charges applied to the line.
    pub fn charges(&self) -> &[AdditionalCharge<'a>] {
        &self.charges
    }

    /// Price table the line was priced from.
    pub fn table(&self) -> &PriceTable<'a> {
        &self.table
    }

    /// Current pricing, reflecting the cart's cumulative quantity.
    pub fn pricing(&self) -> &PricingResult<'a> {
        &self.pricing
    }

    /// Units on this line.
    pub fn quantity(&self) -> u32 {
        self.pricing.quantity()
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    calculator: TieredPriceCalculator<'a>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced by `calculator`.
    pub fn new(currency: &'static Currency, calculator: TieredPriceCalculator<'a>) -> Self {
        Self {
            lines: Vec::new(),
            calculator,
            currency,
        }
    }

    /// Add a line and reprice every line of the same embellishment type.
    ///
    /// Returns the index of the new line.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the table is not in the cart currency.
    /// - [`CartError::Calculation`]: the line, or a line being repriced, could not be priced.
    pub fn add(
        &mut self,
        embellishment: EmbellishmentType,
        quantities: SizeQuantities,
        table: &PriceTable<'a>,
        charges: Vec<AdditionalCharge<'a>>,
    ) -> Result<usize, CartError> {
        if table.currency() != self.currency {
            return Err(CartError::CurrencyMismatch(
                table.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let existing_quantity = self.quantity_for(embellishment);
        let pricing =
            self.calculator
                .calculate_with_charges(&quantities, existing_quantity, table, &charges)?;

        self.lines.push(CartLine {
            embellishment,
            quantities,
            charges,
            table: table.clone(),
            pricing,
        });

        self.reprice(embellishment)?;

        tracing::debug!(
            embellishment = embellishment.name(),
            cumulative = self.quantity_for(embellishment),
            lines = self.lines.len(),
            "added cart line"
        );

        Ok(self.lines.len() - 1)
    }

    /// Remove a line and reprice the remaining lines of its embellishment type.
    ///
    /// # Errors
    ///
    /// - [`CartError::NoSuchLine`]: `index` is out of range.
    /// - [`CartError::Calculation`]: a remaining line could not be repriced.
    pub fn remove(&mut self, index: usize) -> Result<CartLine<'a>, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::NoSuchLine(index));
        }

        let line = self.lines.remove(index);

        self.reprice(line.embellishment)?;

        Ok(line)
    }

    /// Reprice every line of `embellishment` against the cart's cumulative
    /// quantity for that type.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Calculation`] if a line cannot be priced.
    pub fn reprice(&mut self, embellishment: EmbellishmentType) -> Result<(), CartError> {
        let cumulative = self.quantity_for(embellishment);

        for line in self
            .lines
            .iter_mut()
            .filter(|line| line.embellishment == embellishment)
        {
            let existing_quantity = cumulative.saturating_sub(line.quantity());

            line.pricing = self.calculator.calculate_with_charges(
                &line.quantities,
                existing_quantity,
                &line.table,
                &line.charges,
            )?;
        }

        Ok(())
    }

    /// Cumulative quantity of an embellishment type across the cart.
    pub fn quantity_for(&self, embellishment: EmbellishmentType) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.embellishment == embellishment)
            .fold(0, |acc, line| acc.saturating_add(line.quantity()))
    }

    /// Sum of every line's grand total.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Money`] if money arithmetic fails.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let total = self
            .lines
            .iter()
            .try_fold(zero(self.currency), |acc, line| {
                acc.add(line.pricing.grand_total)
            })?;

        Ok(total)
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::tiers::Tier;

    use super::*;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    fn table() -> PriceTable<'static> {
        let mut table = PriceTable::new(USD);

        table
            .push_tier(Tier::new("1-23", 1, Some(23)).with_minimum_order_fee(usd(5000)))
            .push_tier(Tier::new("24-47", 24, Some(47)))
            .set_price("M", "24-47", usd(1000))
            .set_price("L", "24-47", usd(1000));

        table
    }

    fn cart() -> Cart<'static> {
        Cart::new(USD, TieredPriceCalculator::default())
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = cart();

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.currency(), USD);
    }

    #[test]
    fn add_rejects_table_in_another_currency() {
        let mut cart = cart();
        let table = PriceTable::new(GBP);

        let result = cart.add(
            EmbellishmentType::Dtg,
            SizeQuantities::new().with("M", 1),
            &table,
            Vec::new(),
        );

        assert_eq!(result, Err(CartError::CurrencyMismatch("GBP", "USD")));
    }

    #[test]
    fn adding_a_line_reprices_earlier_lines_of_the_same_type() -> TestResult {
        let mut cart = cart();
        let table = table();

        cart.add(
            EmbellishmentType::Embroidery,
            SizeQuantities::new().with("M", 18),
            &table,
            Vec::new(),
        )?;

        let first = cart.lines().first().ok_or("missing line")?;

        assert!(first.pricing().minimum_order_fee_applies);

        cart.add(
            EmbellishmentType::Embroidery,
            SizeQuantities::new().with("L", 6),
            &table,
            Vec::new(),
        )?;

        let first = cart.lines().first().ok_or("missing line")?;

        assert!(!first.pricing().minimum_order_fee_applies);
        assert_eq!(first.pricing().combined_quantity, 24);
        assert_eq!(first.pricing().total_price, usd(18_000));
        assert_eq!(cart.quantity_for(EmbellishmentType::Embroidery), 24);
        assert_eq!(cart.subtotal()?, usd(24_000));

        Ok(())
    }

    #[test]
    fn other_embellishment_types_do_not_bundle() -> TestResult {
        let mut cart = cart();
        let table = table();

        cart.add(
            EmbellishmentType::Embroidery,
            SizeQuantities::new().with("M", 18),
            &table,
            Vec::new(),
        )?;

        let index = cart.add(
            EmbellishmentType::ScreenPrint,
            SizeQuantities::new().with("M", 6),
            &table,
            Vec::new(),
        )?;

        let line = cart.lines().get(index).ok_or("missing line")?;

        assert_eq!(line.pricing().combined_quantity, 6);
        assert!(line.pricing().minimum_order_fee_applies);
        assert_eq!(line.embellishment(), EmbellishmentType::ScreenPrint);

        Ok(())
    }

    #[test]
    fn removing_a_line_reprices_the_rest() -> TestResult {
        let mut cart = cart();
        let table = table();

        cart.add(
            EmbellishmentType::Embroidery,
            SizeQuantities::new().with("M", 18),
            &table,
            Vec::new(),
        )?;
        cart.add(
            EmbellishmentType::Embroidery,
            SizeQuantities::new().with("L", 6),
            &table,
            Vec::new(),
        )?;

        let removed = cart.remove(1)?;

        assert_eq!(removed.quantity(), 6);

        let remaining = cart.lines().first().ok_or("missing line")?;

        assert!(remaining.pricing().minimum_order_fee_applies);
        assert_eq!(remaining.pricing().combined_quantity, 18);
        // 18 × $10 + $50 fee
        assert_eq!(cart.subtotal()?, usd(23_000));

        Ok(())
    }

    #[test]
    fn remove_out_of_range_errors() {
        let mut cart = cart();

        assert!(matches!(cart.remove(0), Err(CartError::NoSuchLine(0))));
    }

    #[test]
    fn subtotal_includes_flat_charges() -> TestResult {
        let mut cart = cart();

        cart.add(
            EmbellishmentType::ScreenPrint,
            SizeQuantities::new().with("M", 24),
            &table(),
            vec![AdditionalCharge::flat("Screen setup", usd(3000))],
        )?;

        assert_eq!(cart.subtotal()?, usd(27_000));
        assert_eq!(cart.lines().first().map(|line| line.charges().len()), Some(1));

        Ok(())
    }
}
