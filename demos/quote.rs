//! Quote Example
//!
//! Prices a set of sizes against a fixture price table and prints the quote.
//!
//! Use `-t` to pick the price table fixture
//! Use `-s SIZE=QTY` (repeatable) to set quantities
//! Use `-e` to set the quantity of the same embellishment already in the cart
//!
//! `cargo run --example quote -- -s M=12 -s L=6 -e 3`

use std::io;

use anyhow::Result;

use nwca_pricing::{
    calculator::TieredPriceCalculator, fixtures::Fixture, observability::init_logging,
    quote_id::QuoteSequence, utils::QuoteArgs,
};

/// Quote Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = QuoteArgs::load()?;

    init_logging(&args.logging)?;

    let mut fixture = Fixture::with_base_path(&args.fixtures);
    fixture.load_price_table(&args.table)?;

    let table = fixture.price_table(&args.table)?;
    let calculator = TieredPriceCalculator::new(args.calculator_config()?);
    let charges = args.charges()?;

    let result =
        calculator.calculate_with_charges(&args.request(), args.existing, table, &charges)?;

    let quote_id = QuoteSequence::new().next_id_today(args.embellishment);

    println!("Quote {quote_id} ({}, {})", args.embellishment, args.table);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    result.write_to(&mut handle)?;

    Ok(())
}
