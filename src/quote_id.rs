//! Quote IDs
//!
//! Quote IDs take the form `<PREFIX><MMDD>-<n>`, e.g. `EMB0119-3` for the
//! third embroidery quote on 19 January. Sequences are per prefix and restart
//! at 1 each day.

use std::fmt;

use jiff::{Zoned, civil::Date};
use rustc_hash::FxHashMap;

use crate::embellishments::EmbellishmentType;

/// A generated quote identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteId {
    prefix: &'static str,
    date: Date,
    sequence: u32,
}

impl QuoteId {
    /// Embellishment prefix.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Date the ID was issued for.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Position within the day's sequence, starting at 1.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{:02}-{}",
            self.prefix,
            self.date.month(),
            self.date.day(),
            self.sequence
        )
    }
}

/// Daily quote ID counters.
#[derive(Debug, Default)]
pub struct QuoteSequence {
    counters: FxHashMap<&'static str, (Date, u32)>,
}

impl QuoteSequence {
    /// Create a sequence with no IDs issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ID for `embellishment` on `date`.
    pub fn next_id(&mut self, embellishment: EmbellishmentType, date: Date) -> QuoteId {
        let prefix = embellishment.quote_prefix();
        let counter = self.counters.entry(prefix).or_insert((date, 0));

        if counter.0 != date {
            *counter = (date, 0);
        }

        counter.1 = counter.1.saturating_add(1);

        QuoteId {
            prefix,
            date,
            sequence: counter.1,
        }
    }

    /// Issue the next ID for `embellishment` using today's date in the system time zone.
    pub fn next_id_today(&mut self, embellishment: EmbellishmentType) -> QuoteId {
        self.next_id(embellishment, Zoned::now().date())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn ids_count_up_within_a_day() {
        let mut sequence = QuoteSequence::new();
        let day = date(2026, 1, 19);

        let first = sequence.next_id(EmbellishmentType::Embroidery, day);
        let second = sequence.next_id(EmbellishmentType::Embroidery, day);

        assert_eq!(first.to_string(), "EMB0119-1");
        assert_eq!(second.to_string(), "EMB0119-2");
        assert_eq!(second.sequence(), 2);
    }

    #[test]
    fn ids_restart_on_a_new_day() {
        let mut sequence = QuoteSequence::new();

        sequence.next_id(EmbellishmentType::Dtg, date(2026, 3, 1));
        sequence.next_id(EmbellishmentType::Dtg, date(2026, 3, 1));

        let next_day = sequence.next_id(EmbellishmentType::Dtg, date(2026, 3, 2));

        assert_eq!(next_day.to_string(), "DTG0302-1");
        assert_eq!(next_day.date(), date(2026, 3, 2));
    }

    #[test]
    fn prefixes_have_independent_counters() {
        let mut sequence = QuoteSequence::new();
        let day = date(2026, 11, 5);

        sequence.next_id(EmbellishmentType::ScreenPrint, day);

        let cap = sequence.next_id(EmbellishmentType::CapEmbroidery, day);

        assert_eq!(cap.to_string(), "CAP1105-1");
        assert_eq!(cap.prefix(), "CAP");
    }

    #[test]
    fn next_id_today_starts_at_one() {
        let mut sequence = QuoteSequence::new();

        assert_eq!(sequence.next_id_today(EmbellishmentType::Dtf).sequence(), 1);
    }
}
