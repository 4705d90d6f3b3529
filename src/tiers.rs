//! Pricing Tiers
//!
//! A tier is a contiguous quantity range (e.g. "24-47") with its own unit
//! prices. Orders below the minimum-order threshold additionally carry a
//! flat less-than-minimum (LTM) fee.

use rusty_money::{Money, iso::Currency};

/// A quantity range with an optional minimum-order fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier<'a> {
    key: String,
    min_quantity: u32,
    max_quantity: Option<u32>,
    minimum_order_fee: Option<Money<'a, Currency>>,
    ltm_threshold: Option<u32>,
}

impl<'a> Tier<'a> {
    /// Create a tier covering `min_quantity..=max_quantity`; `None` means unbounded.
    pub fn new(key: impl Into<String>, min_quantity: u32, max_quantity: Option<u32>) -> Self {
        Self {
            key: key.into(),
            min_quantity,
            max_quantity,
            minimum_order_fee: None,
            ltm_threshold: None,
        }
    }

    /// Set the flat fee charged when an order in this tier is below the threshold.
    #[must_use]
    pub fn with_minimum_order_fee(mut self, fee: Money<'a, Currency>) -> Self {
        self.minimum_order_fee = Some(fee);
        self
    }

    /// Override the quantity below which the minimum-order fee applies.
    #[must_use]
    pub fn with_ltm_threshold(mut self, threshold: u32) -> Self {
        self.ltm_threshold = Some(threshold);
        self
    }

    /// Tier key, as referenced by the unit price table.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lowest quantity in the tier.
    pub const fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Highest quantity in the tier, or `None` if unbounded.
    pub const fn max_quantity(&self) -> Option<u32> {
        self.max_quantity
    }

    /// Tier-specific minimum-order fee.
    pub fn minimum_order_fee(&self) -> Option<&Money<'a, Currency>> {
        self.minimum_order_fee.as_ref()
    }

    /// Tier-specific LTM threshold.
    pub const fn ltm_threshold(&self) -> Option<u32> {
        self.ltm_threshold
    }

    /// Returns true if `quantity` falls inside this tier's range.
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_quantity && self.max_quantity.is_none_or(|max| quantity <= max)
    }
}

/// The outcome of matching a combined quantity against a sorted tier list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSelection<'t, 'a> {
    /// The tier the quantity prices at.
    pub tier: &'t Tier<'a>,

    /// The next better tier, if there is one.
    pub next: Option<&'t Tier<'a>>,

    /// Units still needed to reach `next`; zero when there is no next tier.
    pub units_to_next: u32,
}

/// Select the tier for `quantity` from tiers sorted ascending by minimum.
///
/// Quantities below the first tier (including zero) fall back to the lowest
/// tier. Quantities beyond the last bounded tier, or inside a gap between two
/// tiers, price at the highest tier whose minimum they have reached, so the
/// selected tier never gets worse as the quantity grows.
///
/// Returns `None` only if `tiers` is empty.
pub fn select_tier<'t, 'a>(tiers: &'t [Tier<'a>], quantity: u32) -> Option<TierSelection<'t, 'a>> {
    let position = tiers
        .iter()
        .position(|tier| tier.contains(quantity))
        .or_else(|| tiers.iter().rposition(|tier| tier.min_quantity <= quantity))
        .unwrap_or(0);

    let tier = tiers.get(position)?;
    let next = tiers.get(position + 1);

    let units_to_next = next.map_or(0, |next| next.min_quantity.saturating_sub(quantity));

    tracing::debug!(
        quantity,
        tier = tier.key(),
        next = next.map(Tier::key),
        units_to_next,
        "selected pricing tier"
    );

    Some(TierSelection {
        tier,
        next,
        units_to_next,
    })
}

/// The first tier whose range contains `quantity`, without any fallback.
pub fn tier_containing<'t, 'a>(tiers: &'t [Tier<'a>], quantity: u32) -> Option<&'t Tier<'a>> {
    tiers.iter().find(|tier| tier.contains(quantity))
}
