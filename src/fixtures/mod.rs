//! Fixtures
//!
//! Price tables stored as YAML under `<base>/price-tables/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{fixtures::price_tables::PriceTableFixture, prices::PriceTable};

pub mod price_tables;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between amounts in one table
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No amounts in the table, so its currency is unknown
    #[error("Price table has no amounts; currency unknown")]
    NoCurrency,

    /// Tier with a maximum below its minimum
    #[error("Tier {0} has a maximum below its minimum")]
    InvalidTier(String),

    /// Two tiers share a key
    #[error("Duplicate tier key: {0}")]
    DuplicateTier(String),

    /// Two tiers cover some of the same quantities
    #[error("Tiers {0} and {1} overlap")]
    OverlappingTiers(String, String),

    /// A price references a tier that is not defined
    #[error("Price for size {size} references unknown tier {tier}")]
    UnknownTier {
        /// Size the price is for
        size: String,
        /// Tier key referenced
        tier: String,
    },

    /// Price table not loaded
    #[error("Price table not found: {0}")]
    PriceTableNotFound(String),

    /// The loaded table is structurally unusable
    #[error(transparent)]
    PriceTable(#[from] crate::prices::PriceTableError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded price tables keyed by fixture name
    price_tables: FxHashMap<String, PriceTable<'static>>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            price_tables: FxHashMap::default(),
        }
    }

    /// Load a price table from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the table is invalid.
    pub fn load_price_table(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("price-tables")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let table = PriceTableFixture::from_yaml(&contents)?.try_into_table()?;

        tracing::debug!(
            name,
            path = %file_path.display(),
            tiers = table.tiers().len(),
            sizes = ?table.sizes(),
            "loaded price table"
        );

        self.price_tables.insert(name.to_string(), table);

        Ok(self)
    }

    /// Load several price tables by name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_tables(names: &[&str]) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        for name in names {
            fixture.load_price_table(name)?;
        }

        Ok(fixture)
    }

    /// Get a loaded price table by name
    ///
    /// # Errors
    ///
    /// Returns an error if the table has not been loaded.
    pub fn price_table(&self, name: &str) -> Result<&PriceTable<'static>, FixtureError> {
        self.price_tables
            .get(name)
            .ok_or_else(|| FixtureError::PriceTableNotFound(name.to_string()))
    }

    /// Names of the loaded price tables, sorted
    pub fn price_table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.price_tables.keys().map(String::as_str).collect();

        names.sort_unstable();
        names
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    fn write_table(base: &Path, name: &str, contents: &str) -> TestResult {
        let dir = base.join("price-tables");

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_bundled_tables() -> TestResult {
        let fixture = Fixture::from_tables(&["embroidery-tees", "caps"])?;

        assert_eq!(fixture.price_table_names(), vec!["caps", "embroidery-tees"]);
        assert_eq!(fixture.price_table("embroidery-tees")?.currency(), USD);

        Ok(())
    }

    #[test]
    fn fixture_loads_table_from_custom_base_path() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_table(
            dir.path(),
            "tiny",
            "tiers:\n  - { key: \"1+\", min: 1 }\nprices:\n  OSFA: { \"1+\": 5.00 GBP }\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_price_table("tiny")?;

        assert_eq!(fixture.price_table("tiny")?.tiers().len(), 1);

        Ok(())
    }

    #[test]
    fn fixture_missing_file_is_io_error() {
        let mut fixture = Fixture::with_base_path("./does-not-exist");

        assert!(matches!(
            fixture.load_price_table("nope"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn fixture_invalid_yaml_is_yaml_error() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_table(dir.path(), "broken", "tiers: [\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_price_table("broken"),
            Err(FixtureError::Yaml(_))
        ));

        Ok(())
    }

    #[test]
    fn fixture_price_table_not_found_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.price_table("missing"),
            Err(FixtureError::PriceTableNotFound(_))
        ));
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.price_tables.is_empty());
    }
}
