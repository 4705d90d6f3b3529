//! Sizes
//!
//! Garment size labels and the per-size quantities a customer requests for a
//! single embellishment.

use std::cmp::Ordering;

use smallvec::SmallVec;

/// Size label used for products that come in a single size, such as most caps.
pub const ONE_SIZE_FITS_ALL: &str = "OSFA";

/// Canonical display order of the sizes the shop stocks.
const SIZE_ORDER: [&str; 24] = [
    "XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL", "6XL", "LT", "XLT", "2XLT", "3XLT",
    "4XLT", "XS/S", "S/M", "M/L", "L/XL", "XL/2XL", "OSFA", "YS", "YM", "YL",
];

/// Position of a size label in the canonical order, if it is a known size.
///
/// `XXL` and `XXXL` are treated as aliases of `2XL` and `3XL`.
pub fn size_rank(size: &str) -> Option<usize> {
    let upper = size.to_ascii_uppercase();

    let normalized = match upper.as_str() {
        "XXL" => "2XL",
        "XXXL" => "3XL",
        other => other,
    };

    SIZE_ORDER.iter().position(|known| *known == normalized)
}

/// Orders size labels canonically (XS before S before M, and so on), with
/// unknown labels sorted alphabetically after every known size.
pub fn compare_sizes(left: &str, right: &str) -> Ordering {
    match (size_rank(left), size_rank(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.cmp(right),
    }
}

/// Requested quantities keyed by size label.
///
/// Insertion order is kept; setting the same size twice replaces the earlier
/// quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeQuantities {
    sizes: SmallVec<[(String, u32); 8]>,
}

impl SizeQuantities {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, size: impl Into<String>, quantity: u32) -> Self {
        self.set(size, quantity);
        self
    }

    /// Set the quantity requested for a size, replacing any earlier value.
    pub fn set(&mut self, size: impl Into<String>, quantity: u32) {
        let size = size.into();

        match self.sizes.iter_mut().find(|(label, _)| *label == size) {
            Some((_, existing)) => *existing = quantity,
            None => self.sizes.push((size, quantity)),
        }
    }

    /// Quantity requested for a size, or zero if the size was never set.
    pub fn get(&self, size: &str) -> u32 {
        self.sizes
            .iter()
            .find(|(label, _)| label == size)
            .map_or(0, |(_, quantity)| *quantity)
    }

    /// Total requested quantity across all sizes, or `None` on overflow.
    pub fn total(&self) -> Option<u32> {
        self.sizes
            .iter()
            .try_fold(0_u32, |acc, (_, quantity)| acc.checked_add(*quantity))
    }

    /// Returns true if no size has a quantity above zero.
    pub fn is_empty(&self) -> bool {
        self.sizes.iter().all(|(_, quantity)| *quantity == 0)
    }

    /// Sizes with a quantity above zero, in canonical size order.
    pub fn ordered(&self) -> SmallVec<[(&str, u32); 8]> {
        let mut ordered: SmallVec<[(&str, u32); 8]> = self
            .sizes
            .iter()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(size, quantity)| (size.as_str(), *quantity))
            .collect();

        ordered.sort_by(|(left, _), (right, _)| compare_sizes(left, right));
        ordered
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for SizeQuantities {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut quantities = Self::new();

        for (size, quantity) in iter {
            quantities.set(size, quantity);
        }

        quantities
    }
}
