//! Sort keys and stable ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Listing order.
///
/// Parsing accepts both the `price-asc`/`price-desc` and the
/// `price-low`/`price-high` spellings. Unknown keys fall back to
/// [`SortKey::Featured`] rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[serde(alias = "price-low")]
    PriceAsc,
    #[serde(alias = "price-high")]
    PriceDesc,
    NameAsc,
    NameDesc,
    /// New arrivals first.
    Newest,
    /// Best sellers first.
    Bestseller,
    /// Highest rated first; unrated last.
    Rating,
    /// Preserve catalog order.
    #[default]
    #[serde(other)]
    Featured,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::Newest => "newest",
            Self::Bestseller => "bestseller",
            Self::Rating => "rating",
        }
    }

    /// Parse a sort key, accepting aliases.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-asc" | "price-low" => Self::PriceAsc,
            "price-desc" | "price-high" => Self::PriceDesc,
            "name-asc" => Self::NameAsc,
            "name-desc" => Self::NameDesc,
            "newest" => Self::Newest,
            "bestseller" => Self::Bestseller,
            "rating" => Self::Rating,
            _ => Self::Featured,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Stable sort of `products` by `key`.
///
/// Equal elements keep their relative input order for every key, so
/// [`SortKey::Featured`] is the identity.
pub fn sort_products(products: &mut [&Product], key: SortKey) {
    match key {
        SortKey::Featured => {}
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::NameAsc => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::NameDesc => products.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortKey::Newest => products.sort_by_key(|p| !p.is_new),
        SortKey::Bestseller => products.sort_by_key(|p| !p.is_bestseller),
        SortKey::Rating => products.sort_by(|a, b| compare_ratings(a.rating, b.rating)),
    }
}

/// Root-locale collator; `None` only if the compiled collation data fails to
/// load.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> =
    LazyLock::new(|| Collator::try_new(CollatorPreferences::default(), CollatorOptions::default()).ok());

/// Locale-aware comparison with a raw tie-break, so "Élan" sorts with the
/// E's and names that collate equal still order deterministically.
fn compare_names(a: &str, b: &str) -> Ordering {
    let collated = COLLATOR.as_ref().map_or_else(
        || {
            let folded_a = a.chars().flat_map(char::to_lowercase);
            let folded_b = b.chars().flat_map(char::to_lowercase);
            folded_a.cmp(folded_b)
        },
        |collator| collator.compare(a, b),
    );
    collated.then_with(|| a.cmp(b))
}

/// Descending by rating, with unrated products after all rated ones.
fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
