//! NWCA Pricing
//!
//! Quantity-tiered pricing for custom apparel quotes: tier selection from the
//! cumulative quantity of an embellishment type, less-than-minimum fee
//! distribution, per-size unit prices and order totals.

pub mod calculator;
pub mod cart;
pub mod charges;
pub mod embellishments;
pub mod fixtures;
pub mod money;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod quote;
pub mod quote_id;
pub mod sizes;
pub mod tiers;
pub mod utils;
