//! NWCA Pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calculator::{CalculationError, CalculatorConfig, TieredPriceCalculator},
    cart::{Cart, CartError, CartLine},
    charges::{AdditionalCharge, ChargeAmount},
    embellishments::EmbellishmentType,
    fixtures::{Fixture, FixtureError},
    prices::{PriceLookup, PriceTable, PriceTableError},
    quote::{AppliedCharge, PricingResult, PricingWarning, SizeLine},
    quote_id::{QuoteId, QuoteSequence},
    sizes::{ONE_SIZE_FITS_ALL, SizeQuantities},
    tiers::Tier,
};
