//! Embellishments

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Unrecognised embellishment name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown embellishment type: {0}")]
pub struct UnknownEmbellishment(pub String);

/// Decoration method. Quantities only bundle towards a better tier within
/// the same embellishment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbellishmentType {
    /// Embroidered garments
    Embroidery,

    /// Embroidered caps
    CapEmbroidery,

    /// Screen printing
    ScreenPrint,

    /// Direct-to-garment printing
    Dtg,

    /// Direct-to-film transfers
    Dtf,
}

impl EmbellishmentType {
    /// Every embellishment type.
    pub const ALL: [Self; 5] = [
        Self::Embroidery,
        Self::CapEmbroidery,
        Self::ScreenPrint,
        Self::Dtg,
        Self::Dtf,
    ];

    /// Kebab-case name, as used in fixtures and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Embroidery => "embroidery",
            Self::CapEmbroidery => "cap-embroidery",
            Self::ScreenPrint => "screen-print",
            Self::Dtg => "dtg",
            Self::Dtf => "dtf",
        }
    }

    /// Prefix used for quote IDs.
    pub const fn quote_prefix(self) -> &'static str {
        match self {
            Self::Embroidery => "EMB",
            Self::CapEmbroidery => "CAP",
            Self::ScreenPrint => "SPC",
            Self::Dtg => "DTG",
            Self::Dtf => "DTF",
        }
    }
}

impl fmt::Display for EmbellishmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmbellishmentType {
    type Err = UnknownEmbellishment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEmbellishment(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_round_trips_names() -> Result<(), UnknownEmbellishment> {
        for kind in EmbellishmentType::ALL {
            assert_eq!(kind.to_string().parse::<EmbellishmentType>()?, kind);
        }

        Ok(())
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert_eq!(
            "sublimation".parse::<EmbellishmentType>(),
            Err(UnknownEmbellishment("sublimation".to_string()))
        );
    }

    #[test]
    fn quote_prefixes_are_unique() {
        let mut prefixes: Vec<_> = EmbellishmentType::ALL
            .iter()
            .map(|kind| kind.quote_prefix())
            .collect();

        prefixes.sort_unstable();
        prefixes.dedup();

        assert_eq!(prefixes.len(), EmbellishmentType::ALL.len());
    }
}
