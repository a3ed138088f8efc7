//! Sort-order verification.
//!
//! The expected order is derived from a [`ProductSnapshot`] taken before
//! sorting, then compared element by element with what the page renders
//! after the sort option is applied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::locator::names;
use crate::result::{SwagError, SwagResult};

/// Fixed-point price with two fraction digits, stored in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    /// Create from a cent amount
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = SwagError;

    /// Parse `"$29.99"`, `"29.99"`, `"$7.9"` or `"$8"`
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| SwagError::InvalidPrice {
            text: text.to_string(),
            message: message.to_string(),
        };

        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected at most two fraction digits"));
        }

        let whole: u64 = whole.parse().map_err(|_| invalid("amount too large"))?;
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("bad fraction"))?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .map(Self)
            .ok_or_else(|| invalid("amount too large"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One product row as rendered on the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name
    pub name: String,
    /// Product price
    pub price: Price,
}

/// Point-in-time capture of the product listing, in DOM order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    products: Vec<Product>,
}

impl ProductSnapshot {
    /// Create from products
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Pair rendered name and price texts by position
    pub fn from_texts(names: &[String], prices: &[String]) -> SwagResult<Self> {
        if names.len() != prices.len() {
            return Err(SwagError::assertion(format!(
                "listing rendered {} names but {} prices",
                names.len(),
                prices.len()
            )));
        }
        let products = names
            .iter()
            .zip(prices)
            .map(|(name, price)| {
                Ok(Product {
                    name: name.clone(),
                    price: price.parse()?,
                })
            })
            .collect::<SwagResult<Vec<_>>>()?;
        Ok(Self { products })
    }

    /// Products in captured order
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the snapshot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Names in captured order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.products.iter().map(|p| p.name.clone()).collect()
    }
}

/// Sort options offered by the listing's dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Name (A to Z)
    NameAscending,
    /// Name (Z to A)
    NameDescending,
    /// Price (low to high)
    PriceAscending,
    /// Price (high to low)
    PriceDescending,
}

impl SortOrder {
    /// All orders, in dropdown order
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// Locator of the dropdown option
    #[must_use]
    pub const fn option_locator(self) -> &'static str {
        match self {
            Self::NameAscending => names::SORT_NAME_ASC,
            Self::NameDescending => names::SORT_NAME_DESC,
            Self::PriceAscending => names::SORT_PRICE_ASC,
            Self::PriceDescending => names::SORT_PRICE_DESC,
        }
    }

    /// Listing column the order applies to
    #[must_use]
    pub const fn column_locator(self) -> &'static str {
        match self {
            Self::NameAscending | Self::NameDescending => names::PRODUCT_NAME,
            Self::PriceAscending | Self::PriceDescending => names::PRODUCT_PRICE,
        }
    }

    /// Whether the order is ascending
    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::NameAscending | Self::PriceAscending)
    }

    /// Label shown in the dropdown
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAscending => "Name (A to Z)",
            Self::NameDescending => "Name (Z to A)",
            Self::PriceAscending => "Price (low to high)",
            Self::PriceDescending => "Price (high to low)",
        }
    }

    /// Expected rendering of the sorted column
    #[must_use]
    pub fn expected(self, snapshot: &ProductSnapshot) -> Vec<String> {
        match self {
            Self::NameAscending | Self::NameDescending => {
                expected_name_order(snapshot, self.is_ascending())
            }
            Self::PriceAscending | Self::PriceDescending => {
                expected_price_order(snapshot, self.is_ascending())
            }
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Names sorted lexicographically; descending is the ascending order reversed
#[must_use]
pub fn expected_name_order(snapshot: &ProductSnapshot, ascending: bool) -> Vec<String> {
    let mut names = snapshot.names();
    names.sort();
    if !ascending {
        names.reverse();
    }
    names
}

/// Prices sorted numerically and re-rendered as `$x.yy`; descending is the
/// ascending order reversed
#[must_use]
pub fn expected_price_order(snapshot: &ProductSnapshot, ascending: bool) -> Vec<String> {
    let mut prices: Vec<Price> = snapshot.products().iter().map(|p| p.price).collect();
    prices.sort();
    if !ascending {
        prices.reverse();
    }
    prices.iter().map(ToString::to_string).collect()
}

/// Compare expected and observed sequences element by element
pub fn verify_order<E, O>(expected: &[E], observed: &[O]) -> SwagResult<()>
where
    E: AsRef<str>,
    O: AsRef<str>,
{
    let longest = expected.len().max(observed.len());
    for index in 0..longest {
        let e = expected.get(index).map(AsRef::as_ref);
        let o = observed.get(index).map(AsRef::as_ref);
        if e != o {
            return Err(SwagError::OrderMismatch {
                index,
                expected: e.map(str::to_string),
                observed: o.map(str::to_string),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(rows: &[(&str, &str)]) -> ProductSnapshot {
        let names: Vec<String> = rows.iter().map(|(n, _)| (*n).to_string()).collect();
        let prices: Vec<String> = rows.iter().map(|(_, p)| (*p).to_string()).collect();
        ProductSnapshot::from_texts(&names, &prices).unwrap()
    }

    fn storefront_snapshot() -> ProductSnapshot {
        snapshot(&[
            ("Sauce Labs Backpack", "$29.99"),
            ("Sauce Labs Bike Light", "$9.99"),
            ("Sauce Labs Bolt T-Shirt", "$15.99"),
            ("Sauce Labs Fleece Jacket", "$49.99"),
            ("Sauce Labs Onesie", "$7.99"),
            ("Test.allTheThings() T-Shirt (Red)", "$15.99"),
        ])
    }

    mod price_tests {
        use super::*;

        #[test]
        fn test_parse_canonical() {
            assert_eq!("$29.99".parse::<Price>().unwrap(), Price::from_cents(2999));
            assert_eq!("$0.05".parse::<Price>().unwrap().cents(), 5);
        }

        #[test]
        fn test_parse_short_forms() {
            assert_eq!("$7.9".parse::<Price>().unwrap().cents(), 790);
            assert_eq!("$8".parse::<Price>().unwrap().cents(), 800);
            assert_eq!("12.50".parse::<Price>().unwrap().cents(), 1250);
            assert_eq!(" $1.00 ".parse::<Price>().unwrap().cents(), 100);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            for bad in ["", "$", "$.99", "$1.999", "$1,00", "abc", "$-1.00", "$1.x"] {
                let err = bad.parse::<Price>().unwrap_err();
                assert!(matches!(err, SwagError::InvalidPrice { .. }), "{bad}");
            }
        }

        #[test]
        fn test_format() {
            assert_eq!(Price::from_cents(790).to_string(), "$7.90");
            assert_eq!(Price::from_cents(5).to_string(), "$0.05");
            assert_eq!(Price::from_cents(4999).to_string(), "$49.99");
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_from_texts_length_mismatch() {
            let err = ProductSnapshot::from_texts(&["a".into()], &[]).unwrap_err();
            assert!(matches!(err, SwagError::AssertionFailed { .. }));
        }

        #[test]
        fn test_from_texts_bad_price() {
            let err = ProductSnapshot::from_texts(&["a".into()], &["free".into()]).unwrap_err();
            assert!(matches!(err, SwagError::InvalidPrice { .. }));
        }

        #[test]
        fn test_empty_snapshot() {
            let snap = ProductSnapshot::default();
            assert!(snap.is_empty());
            assert!(expected_name_order(&snap, true).is_empty());
            assert!(expected_price_order(&snap, false).is_empty());
        }
    }

    mod order_tests {
        use super::*;

        #[test]
        fn test_name_order() {
            let snap = snapshot(&[("b", "$1.00"), ("c", "$2.00"), ("a", "$3.00")]);
            assert_eq!(expected_name_order(&snap, true), vec!["a", "b", "c"]);
            assert_eq!(expected_name_order(&snap, false), vec!["c", "b", "a"]);
        }

        #[test]
        fn test_price_order_is_numeric_not_textual() {
            let snap = snapshot(&[("a", "$9.99"), ("b", "$15.99"), ("c", "$100")]);
            assert_eq!(
                expected_price_order(&snap, true),
                vec!["$9.99", "$15.99", "$100.00"]
            );
        }

        #[test]
        fn test_six_item_price_descending_is_reverse_of_ascending() {
            let snap = storefront_snapshot();
            assert_eq!(snap.len(), 6);
            let mut asc = expected_price_order(&snap, true);
            let desc = expected_price_order(&snap, false);
            asc.reverse();
            assert_eq!(asc, desc);
            assert_eq!(desc.first().map(String::as_str), Some("$49.99"));
        }

        #[test]
        fn test_sort_order_mapping() {
            assert_eq!(SortOrder::NameDescending.option_locator(), names::SORT_NAME_DESC);
            assert_eq!(SortOrder::PriceAscending.column_locator(), names::PRODUCT_PRICE);
            assert!(SortOrder::PriceAscending.is_ascending());
            assert!(!SortOrder::NameDescending.is_ascending());
            assert_eq!(SortOrder::PriceDescending.to_string(), "Price (high to low)");
            let snap = storefront_snapshot();
            assert_eq!(
                SortOrder::NameAscending.expected(&snap),
                expected_name_order(&snap, true)
            );
        }
    }

    mod verify_tests {
        use super::*;

        #[test]
        fn test_swapped_pair_fails_at_zero() {
            let err = verify_order(&["a", "b"], &["b", "a"]).unwrap_err();
            assert!(matches!(
                err,
                SwagError::OrderMismatch { index: 0, expected: Some(ref e), observed: Some(ref o) }
                    if e == "a" && o == "b"
            ));
        }

        #[test]
        fn test_length_difference_reports_first_missing() {
            let err = verify_order(&["a", "b", "c"], &["a", "b"]).unwrap_err();
            assert!(matches!(
                err,
                SwagError::OrderMismatch { index: 2, observed: None, .. }
            ));
        }

        #[test]
        fn test_mixed_string_types() {
            let expected = vec!["x".to_string()];
            assert!(verify_order(&expected, &["x"]).is_ok());
        }
    }

    proptest! {
        #[test]
        fn prop_name_desc_is_reverse_of_asc(names in prop::collection::vec("[a-zA-Z ]{0,12}", 0..12)) {
            let prices = vec!["$1.00".to_string(); names.len()];
            let snap = ProductSnapshot::from_texts(&names, &prices).unwrap();
            let mut asc = expected_name_order(&snap, true);
            asc.reverse();
            prop_assert_eq!(asc, expected_name_order(&snap, false));
        }

        #[test]
        fn prop_canonical_price_roundtrips(whole in 0u64..100_000, cents in 0u64..100) {
            let text = format!("${whole}.{cents:02}");
            let price: Price = text.parse().unwrap();
            prop_assert_eq!(price.to_string(), text);
        }

        #[test]
        fn prop_verify_order_reflexive(items in prop::collection::vec(".{0,8}", 0..10)) {
            prop_assert!(verify_order(&items, &items).is_ok());
        }

        #[test]
        fn prop_distinct_swap_fails_at_zero(a in "[a-z]{1,6}", b in "[A-Z]{1,6}") {
            let result = verify_order(&[a.clone(), b.clone()], &[b, a]);
            let index_is_zero = matches!(result, Err(SwagError::OrderMismatch { index: 0, .. }));
            prop_assert!(index_is_zero);
        }

        #[test]
        fn prop_price_order_is_sorted(cents in prop::collection::vec(0u64..1_000_000, 0..10)) {
            let names: Vec<String> = (0..cents.len()).map(|i| format!("p{i}")).collect();
            let prices: Vec<String> = cents.iter().map(|c| Price::from_cents(*c).to_string()).collect();
            let snap = ProductSnapshot::from_texts(&names, &prices).unwrap();
            let rendered = expected_price_order(&snap, true);
            let parsed: Vec<Price> = rendered.iter().map(|p| p.parse().unwrap()).collect();
            prop_assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(parsed.len(), snap.len());
        }
    }
}
