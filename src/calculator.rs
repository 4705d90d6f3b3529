//! Tiered Price Calculator
//!
//! Prices a set of per-size quantities against a [`PriceTable`]. The tier is
//! chosen from the *combined* quantity: what is being added now plus what the
//! cart already holds for the same embellishment type, so several small
//! additions can bundle into a better tier.
//!
//! Below the minimum-order threshold a flat less-than-minimum (LTM) fee is
//! spread evenly across every unit in the combined quantity, and base prices
//! are taken from the tier containing the threshold rather than the
//! customer's actual tier.

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    charges::{AdditionalCharge, ChargeAmount, per_unit_total},
    money::{AmountError, to_decimal, to_money, zero},
    prices::{PriceLookup, PriceTable, PriceTableError},
    quote::{AppliedCharge, PricingResult, PricingWarning, SizeLine},
    sizes::{ONE_SIZE_FITS_ALL, SizeQuantities},
    tiers::{Tier, TierSelection, select_tier, tier_containing},
};

/// Quantity below which the minimum-order fee applies when a tier sets none.
pub const DEFAULT_LTM_THRESHOLD: u32 = 24;

/// Minimum-order fee in cents when a tier sets none.
pub const DEFAULT_MINIMUM_ORDER_FEE_MINOR: i64 = 5000;

/// Errors that stop a calculation from producing any result.
#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    /// The price table is structurally unusable.
    #[error("invalid price table: {0}")]
    InvalidPriceTable(#[from] PriceTableError),

    /// A fee or charge is in a different currency to the price table (amount currency, table currency).
    #[error("amount in {0} cannot be used with a price table in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Requested plus existing quantity does not fit in a `u32`.
    #[error("combined quantity overflowed")]
    QuantityOverflow,

    /// A computed amount could not be represented in the table's currency.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Defaults used when a tier does not specify its own minimum-order terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig<'a> {
    /// Combined quantity below which the minimum-order fee applies.
    pub ltm_threshold: u32,

    /// Flat minimum-order fee.
    pub minimum_order_fee: Money<'a, Currency>,

    /// Size whose price is used for sizes missing from the table.
    pub fallback_size: String,
}

impl Default for CalculatorConfig<'_> {
    fn default() -> Self {
        Self {
            ltm_threshold: DEFAULT_LTM_THRESHOLD,
            minimum_order_fee: Money::from_minor(
                DEFAULT_MINIMUM_ORDER_FEE_MINOR,
                rusty_money::iso::USD,
            ),
            fallback_size: ONE_SIZE_FITS_ALL.to_string(),
        }
    }
}

/// Minimum-order fee terms resolved for one calculation.
#[derive(Debug)]
struct MinimumOrderFee<'t, 'a> {
    applies: bool,
    total: Money<'a, Currency>,
    per_unit: Decimal,
    reference_tier: &'t Tier<'a>,
}

impl<'t, 'a> MinimumOrderFee<'t, 'a> {
    fn none(tier: &'t Tier<'a>, currency: &'static Currency) -> Self {
        Self {
            applies: false,
            total: zero(currency),
            per_unit: Decimal::ZERO,
            reference_tier: tier,
        }
    }
}

/// Stateless calculator for quantity-tiered pricing.
#[derive(Debug, Clone, Default)]
pub struct TieredPriceCalculator<'a> {
    config: CalculatorConfig<'a>,
}

impl<'a> TieredPriceCalculator<'a> {
    /// Create a calculator with the given defaults.
    pub fn new(config: CalculatorConfig<'a>) -> Self {
        Self { config }
    }

    /// The calculator's defaults.
    pub fn config(&self) -> &CalculatorConfig<'a> {
        &self.config
    }

    /// Price `request` given `existing_quantity` units of the same
    /// embellishment type already in the cart.
    ///
    /// # Errors
    ///
    /// - [`CalculationError::InvalidPriceTable`]: the table has no tiers or no prices.
    /// - [`CalculationError::CurrencyMismatch`]: the default fee is in another currency.
    /// - [`CalculationError::QuantityOverflow`]: the combined quantity overflows.
    /// - [`CalculationError::Amount`] / [`CalculationError::Money`]: amount arithmetic failed.
    pub fn calculate(
        &self,
        request: &SizeQuantities,
        existing_quantity: u32,
        table: &PriceTable<'a>,
    ) -> Result<PricingResult<'a>, CalculationError> {
        self.calculate_with_charges(request, existing_quantity, table, &[])
    }

    /// [`calculate`](Self::calculate), then layer additional charges on top.
    ///
    /// Per-unit charges are added to every size's display unit price and so
    /// flow into the line totals. Flat charges are listed separately and only
    /// count towards the grand total.
    ///
    /// # Errors
    ///
    /// As [`calculate`](Self::calculate); additionally returns
    /// [`CalculationError::CurrencyMismatch`] if a charge is not in the
    /// table's currency.
    pub fn calculate_with_charges(
        &self,
        request: &SizeQuantities,
        existing_quantity: u32,
        table: &PriceTable<'a>,
        charges: &[AdditionalCharge<'a>],
    ) -> Result<PricingResult<'a>, CalculationError> {
        table.validate()?;

        let currency = table.currency();

        for charge in charges {
            ensure_currency(charge.amount().money(), currency)?;
        }

        let combined_quantity = request
            .total()
            .and_then(|requested| requested.checked_add(existing_quantity))
            .ok_or(CalculationError::QuantityOverflow)?;

        let selection = select_tier(table.tiers(), combined_quantity)
            .ok_or(CalculationError::InvalidPriceTable(PriceTableError::NoTiers))?;

        let mut warnings = Vec::new();
        let fee = if request.is_empty() {
            MinimumOrderFee::none(selection.tier, currency)
        } else {
            self.minimum_order_fee(&selection, table, combined_quantity, &mut warnings)?
        };

        let per_unit_charges = per_unit_total(charges);
        let mut lines: SmallVec<[SizeLine<'a>; 8]> = SmallVec::new();
        let mut total_price = zero(currency);

        for (size, quantity) in request.ordered() {
            let base_unit_price =
                self.base_unit_price(table, size, fee.reference_tier.key(), &mut warnings);

            let quantity_decimal = Decimal::from(quantity);
            let base_with_charges = to_decimal(&base_unit_price) + per_unit_charges;

            // Each line is rounded on its own, so the collected fee can differ
            // from the flat total by a cent per line.
            let fee_share = if fee.applies {
                to_decimal(&fee.total) * quantity_decimal / Decimal::from(combined_quantity)
            } else {
                Decimal::ZERO
            };

            let line_total = to_money(base_with_charges * quantity_decimal + fee_share, currency)?;

            total_price = total_price.add(line_total)?;

            lines.push(SizeLine {
                size: size.to_string(),
                quantity,
                base_unit_price,
                display_unit_price: base_with_charges + fee.per_unit,
                line_total,
            });
        }

        let flat_charges: SmallVec<[AppliedCharge<'a>; 2]> = charges
            .iter()
            .filter_map(|charge| match charge.amount() {
                ChargeAmount::Flat(amount) => Some(AppliedCharge {
                    name: charge.name().to_string(),
                    amount: *amount,
                }),
                ChargeAmount::PerUnit(_) => None,
            })
            .collect();

        let grand_total = flat_charges
            .iter()
            .try_fold(total_price, |acc, charge| acc.add(charge.amount))?;

        Ok(PricingResult {
            matched_tier_key: selection.tier.key().to_string(),
            reference_tier_key: fee.reference_tier.key().to_string(),
            combined_quantity,
            minimum_order_fee_applies: fee.applies,
            minimum_order_fee_total: fee.total,
            minimum_order_fee_per_unit: fee.per_unit,
            lines,
            total_price,
            flat_charges,
            grand_total,
            next_tier_key: selection.next.map(|tier| tier.key().to_string()),
            units_needed_for_next_tier: selection.units_to_next,
            warnings,
        })
    }

    fn minimum_order_fee<'t>(
        &self,
        selection: &TierSelection<'t, 'a>,
        table: &'t PriceTable<'a>,
        combined_quantity: u32,
        warnings: &mut Vec<PricingWarning>,
    ) -> Result<MinimumOrderFee<'t, 'a>, CalculationError> {
        let currency = table.currency();
        let tier = selection.tier;

        let threshold = tier.ltm_threshold().unwrap_or(self.config.ltm_threshold);
        let applies = combined_quantity > 0 && combined_quantity < threshold;

        if !applies {
            return Ok(MinimumOrderFee::none(tier, currency));
        }

        let total = *tier
            .minimum_order_fee()
            .unwrap_or(&self.config.minimum_order_fee);

        ensure_currency(&total, currency)?;

        let reference_tier = tier_containing(table.tiers(), threshold).unwrap_or_else(|| {
            tracing::warn!(
                threshold,
                tier = tier.key(),
                "no tier contains the minimum-order threshold; pricing from the matched tier"
            );

            warnings.push(PricingWarning::ReferenceTierFallback {
                threshold,
                tier: tier.key().to_string(),
            });

            tier
        });

        Ok(MinimumOrderFee {
            applies,
            total,
            per_unit: to_decimal(&total) / Decimal::from(combined_quantity),
            reference_tier,
        })
    }

    fn base_unit_price(
        &self,
        table: &PriceTable<'a>,
        size: &str,
        tier_key: &str,
        warnings: &mut Vec<PricingWarning>,
    ) -> Money<'a, Currency> {
        match table.unit_price_with_fallback(size, tier_key, &self.config.fallback_size) {
            PriceLookup::Exact(price) => price,
            PriceLookup::OneSizeFallback(price) => {
                tracing::debug!(
                    size,
                    tier = tier_key,
                    fallback = self.config.fallback_size.as_str(),
                    "size not stocked; using fallback size price"
                );

                warnings.push(PricingWarning::FallbackSizePrice {
                    size: size.to_string(),
                    tier: tier_key.to_string(),
                });

                price
            }
            PriceLookup::Missing => {
                tracing::warn!(size, tier = tier_key, "missing unit price; pricing at zero");

                warnings.push(PricingWarning::MissingPrice {
                    size: size.to_string(),
                    tier: tier_key.to_string(),
                });

                zero(table.currency())
            }
        }
    }
}

fn ensure_currency(
    amount: &Money<'_, Currency>,
    currency: &'static Currency,
) -> Result<(), CalculationError> {
    if amount.currency() == currency {
        Ok(())
    } else {
        Err(CalculationError::CurrencyMismatch(
            amount.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    fn table() -> PriceTable<'static> {
        let mut table = PriceTable::new(USD);

        table
            .push_tier(Tier::new("1-23", 1, Some(23)).with_minimum_order_fee(usd(5000)))
            .push_tier(Tier::new("24-47", 24, Some(47)))
            .push_tier(Tier::new("48+", 48, None))
            .set_price("M", "1-23", usd(1200))
            .set_price("M", "24-47", usd(1000))
            .set_price("M", "48+", usd(900))
            .set_price("L", "1-23", usd(1200))
            .set_price("L", "24-47", usd(1000))
            .set_price("L", "48+", usd(900));

        table
    }

    #[test]
    fn fee_is_spread_over_the_combined_quantity() -> TestResult {
        let calculator = TieredPriceCalculator::default();
        let request = SizeQuantities::new().with("M", 5);

        let result = calculator.calculate(&request, 5, &table())?;

        assert_eq!(result.combined_quantity, 10);
        assert!(result.minimum_order_fee_applies);
        assert_eq!(result.minimum_order_fee_per_unit, Decimal::new(5, 0));
        // 5 × ($10 base + $5 fee share)
        assert_eq!(result.total_price, usd(7500));

        Ok(())
    }

    #[test]
    fn tier_specific_threshold_overrides_default() -> TestResult {
        let mut table = PriceTable::new(USD);

        table
            .push_tier(Tier::new("1-11", 1, Some(11)).with_ltm_threshold(12))
            .push_tier(Tier::new("12+", 12, None))
            .set_price("M", "12+", usd(800));

        let calculator = TieredPriceCalculator::default();
        let result = calculator.calculate(&SizeQuantities::new().with("M", 6), 0, &table)?;

        assert!(result.minimum_order_fee_applies);
        assert_eq!(result.reference_tier_key, "12+");
        // default $50 fee: 6 × $8 + $50
        assert_eq!(result.total_price, usd(9800));

        Ok(())
    }

    #[test]
    fn reference_tier_falls_back_to_matched_tier() -> TestResult {
        let mut table = PriceTable::new(USD);

        table
            .push_tier(Tier::new("1-11", 1, Some(11)))
            .push_tier(Tier::new("48+", 48, None))
            .set_price("M", "1-11", usd(1500));

        let calculator = TieredPriceCalculator::default();
        let result = calculator.calculate(&SizeQuantities::new().with("M", 10), 0, &table)?;

        assert_eq!(result.reference_tier_key, "1-11");
        assert_eq!(
            result.warnings,
            vec![PricingWarning::ReferenceTierFallback {
                threshold: 24,
                tier: "1-11".to_string()
            }]
        );
        assert_eq!(result.total_price, usd(20_000));

        Ok(())
    }

    #[test]
    fn per_unit_and_flat_charges() -> TestResult {
        let calculator = TieredPriceCalculator::default();
        let request = SizeQuantities::new().with("M", 20).with("L", 10);
        let charges = [
            AdditionalCharge::per_unit("Left sleeve", usd(300)),
            AdditionalCharge::flat("Screen setup", usd(3000)),
        ];

        let result = calculator.calculate_with_charges(&request, 0, &table(), &charges)?;

        assert!(!result.minimum_order_fee_applies);
        assert_eq!(result.total_price, usd(30 * 1300));
        assert_eq!(result.flat_charges.len(), 1);
        assert_eq!(result.grand_total, usd(30 * 1300 + 3000));

        Ok(())
    }

    #[test]
    fn charge_in_another_currency_is_rejected() {
        let calculator = TieredPriceCalculator::default();
        let charges = [AdditionalCharge::flat("Setup", Money::from_minor(100, GBP))];

        let result = calculator.calculate_with_charges(
            &SizeQuantities::new().with("M", 30),
            0,
            &table(),
            &charges,
        );

        assert_eq!(result, Err(CalculationError::CurrencyMismatch("GBP", "USD")));
    }

    #[test]
    fn default_fee_in_another_currency_is_rejected() {
        let mut table = PriceTable::new(GBP);

        table
            .push_tier(Tier::new("1+", 1, None))
            .set_price("M", "1+", Money::from_minor(700, GBP));

        let result = TieredPriceCalculator::default().calculate(
            &SizeQuantities::new().with("M", 2),
            0,
            &table,
        );

        assert_eq!(result, Err(CalculationError::CurrencyMismatch("USD", "GBP")));
    }

    #[test]
    fn quantity_overflow_is_an_error() {
        let result = TieredPriceCalculator::default().calculate(
            &SizeQuantities::new().with("M", u32::MAX),
            1,
            &table(),
        );

        assert_eq!(result, Err(CalculationError::QuantityOverflow));
    }

    #[test]
    fn missing_price_is_zero_with_warning() -> TestResult {
        let result = TieredPriceCalculator::default().calculate(
            &SizeQuantities::new().with("5XL", 30),
            0,
            &table(),
        )?;

        assert_eq!(result.total_price, usd(0));
        assert_eq!(
            result.warnings,
            vec![PricingWarning::MissingPrice {
                size: "5XL".to_string(),
                tier: "24-47".to_string()
            }]
        );

        Ok(())
    }

    #[test]
    fn config_fallback_size_is_used() -> TestResult {
        let mut table = table();

        table.set_price("ADJ", "24-47", usd(1100));

        let calculator = TieredPriceCalculator::new(CalculatorConfig {
            fallback_size: "ADJ".to_string(),
            ..CalculatorConfig::default()
        });

        let result = calculator.calculate(&SizeQuantities::new().with("S/M", 24), 0, &table)?;

        assert_eq!(result.total_price, usd(24 * 1100));
        assert_eq!(calculator.config().fallback_size, "ADJ");

        Ok(())
    }
}
