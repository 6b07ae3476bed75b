//! Catalog query engine.
//!
//! Pure, deterministic functions over a product slice already resident in
//! memory. A query runs in three stages:
//!
//! 1. [`filter`] - keep products matching every active criterion
//! 2. [`sort`] - stable reorder by a [`SortKey`]
//! 3. [`paginate`] - 1-indexed page slice plus totals
//!
//! # Example
//!
//! ```rust
//! use cozy_furniture_core::catalog::{self, FilterState, SortKey};
//! use cozy_furniture_core::Product;
//! use rust_decimal::Decimal;
//!
//! let products = vec![
//!     Product::new("1", "Loveseat", Decimal::new(899, 0)),
//!     Product::new("2", "Armchair", Decimal::new(799, 0)),
//! ];
//!
//! let filters = FilterState {
//!     sort: SortKey::PriceAsc,
//!     ..FilterState::default()
//! };
//! let page = catalog::query(&products, &filters, 12);
//! assert_eq!(page.items[0].name, "Armchair");
//! assert_eq!(page.total_pages, 1);
//! ```

pub mod filter;
pub mod paginate;
pub mod sort;

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Product;

pub use filter::{filter_products, matches};
pub use paginate::{Page, paginate};
pub use sort::{SortKey, sort_products};

/// Default number of products per listing page.
pub const DEFAULT_PER_PAGE: usize = 12;

/// Number of related products shown on a detail page.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    /// Unbounded range: every non-negative price passes.
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::MAX,
        }
    }
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `price` lies within the bounds (both ends inclusive).
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }

    /// Slider range covering a catalog: zero up to the highest price rounded
    /// up to the next thousand. An empty catalog yields `[0, 0]`.
    #[must_use]
    pub fn covering(products: &[Product]) -> Self {
        let thousand = Decimal::ONE_THOUSAND;
        let max = products
            .iter()
            .map(|p| p.price)
            .max()
            .map_or(Decimal::ZERO, |max| (max / thousand).ceil() * thousand);
        Self::new(Decimal::ZERO, max)
    }
}

/// Everything a shopper can tune on a listing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Free-text search over name and description.
    pub search: String,
    /// Selected category names; empty means all categories.
    pub categories: BTreeSet<String>,
    /// Selected color names; empty means any color.
    pub colors: BTreeSet<String>,
    /// Selected material names; empty means any material.
    pub materials: BTreeSet<String>,
    pub price_range: PriceRange,
    /// Hide out-of-stock products.
    pub in_stock_only: bool,
    pub sort: SortKey,
    /// 1-indexed page number.
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            categories: BTreeSet::new(),
            colors: BTreeSet::new(),
            materials: BTreeSet::new(),
            price_range: PriceRange::default(),
            in_stock_only: false,
            sort: SortKey::default(),
            page: 1,
        }
    }
}

impl FilterState {
    /// True when no criterion would exclude any product.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.search.trim().is_empty()
            && self.categories.is_empty()
            && self.colors.is_empty()
            && self.materials.is_empty()
            && self.price_range == PriceRange::default()
            && !self.in_stock_only
    }
}

/// Run filter, sort, and paginate in one pass.
///
/// Only the products on the requested page are cloned.
#[must_use]
pub fn query(products: &[Product], filters: &FilterState, per_page: usize) -> Page<Product> {
    let mut matching = filter_products(products, filters);
    sort_products(&mut matching, filters.sort);
    paginate(&matching, filters.page, per_page).map(|p| (*p).clone())
}

/// Product count per category name.
///
/// Products without a category are not counted.
#[must_use]
pub fn facet_counts(products: &[Product]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in products.iter().filter_map(Product::category_name) {
        *counts.entry(name.to_owned()).or_insert(0) += 1;
    }
    counts
}

/// Products sharing `product`'s category, excluding itself, in catalog order.
///
/// A product without a category has no related products.
#[must_use]
pub fn related_products<'a>(
    catalog: &'a [Product],
    product: &Product,
    limit: usize,
) -> Vec<&'a Product> {
    let Some(category) = product.category_name() else {
        return Vec::new();
    };

    catalog
        .iter()
        .filter(|p| p.id != product.id && p.category_name() == Some(category))
        .take(limit)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! The six-product furniture catalog used across engine tests.

    use rust_decimal::Decimal;

    use crate::types::{Category, Color, Material, Product};

    fn product(
        id: i64,
        name: &str,
        description: &str,
        price: i64,
        category: &str,
        colors: &[&str],
        materials: &[&str],
    ) -> Product {
        let mut p = Product::new(id, name, Decimal::new(price, 0));
        p.description = description.to_owned();
        p.category = Some(Category::new(category.to_lowercase().as_str(), category));
        p.colors = colors
            .iter()
            .map(|c| Color::new(c.to_lowercase().as_str(), *c))
            .collect();
        p.materials = materials
            .iter()
            .map(|m| Material::new(m.to_lowercase().as_str(), *m))
            .collect();
        p
    }

    pub fn catalog() -> Vec<Product> {
        let mut sectional = product(
            1,
            "Modern Sectional Sofa",
            "Spacious L-shaped sectional perfect for large families.",
            1299,
            "Sectional",
            &["Gray", "Navy", "Beige"],
            &["Fabric", "Foam", "Wood Frame"],
        );
        sectional.original_price = Some(Decimal::new(1599, 0));
        sectional.is_bestseller = true;
        sectional.rating = Some(4.8);

        let mut recliner = product(
            2,
            "Luxury Leather Recliner",
            "Premium Italian leather recliner with built-in massage function.",
            2199,
            "Recliner",
            &["Brown", "Black", "Cognac"],
            &["Genuine Leather", "Memory Foam", "Steel Frame"],
        );
        recliner.is_new = true;
        recliner.rating = Some(4.9);

        let mut loveseat = product(
            3,
            "Minimalist Fabric Loveseat",
            "Clean lines with sustainable materials. Perfect for small spaces.",
            899,
            "Loveseat",
            &["Light Gray", "Charcoal", "Cream"],
            &["Organic Cotton", "Recycled Foam", "Bamboo Frame"],
        );
        loveseat.rating = Some(4.6);

        let mut chesterfield = product(
            4,
            "Classic Chesterfield Sofa",
            "Timeless design with button-tufted leather and rolled arms.",
            1899,
            "Sofa",
            &["Dark Brown", "Black", "Burgundy"],
            &["Top Grain Leather", "High-Density Foam", "Hardwood Frame"],
        );
        chesterfield.is_bestseller = true;
        chesterfield.rating = Some(4.7);

        let mut modular = product(
            5,
            "Contemporary Modular Sofa",
            "Flexible modular design that adapts to your space.",
            1599,
            "Modular",
            &["White", "Light Gray", "Navy"],
            &["Performance Fabric", "CertiPUR Foam", "Kiln-Dried Wood"],
        );
        modular.in_stock = false;
        modular.is_new = true;

        let mut armchair = product(
            6,
            "Vintage Velvet Armchair",
            "Luxurious velvet upholstery with brass accents.",
            799,
            "Armchair",
            &["Emerald", "Navy", "Blush Pink"],
            &["Velvet", "Down Feathers", "Brass Legs"],
        );
        armchair.rating = Some(4.4);

        vec![sectional, recliner, loveseat, chesterfield, modular, armchair]
    }

    pub fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::catalog;
    use super::*;

    #[test]
    fn test_sofa_scenario() {
        let products = catalog();
        let filters = FilterState {
            categories: BTreeSet::from(["Sofa".to_string()]),
            price_range: PriceRange::new(Decimal::ZERO, Decimal::new(2000, 0)),
            sort: SortKey::PriceAsc,
            ..FilterState::default()
        };

        let page = query(&products, &filters, DEFAULT_PER_PAGE);
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Classic Chesterfield Sofa");
        assert_eq!(page.items[0].price, Decimal::new(1899, 0));
    }

    #[test]
    fn test_cleared_filters_return_full_catalog_in_order() {
        let products = catalog();
        let filters = FilterState::default();
        assert!(filters.is_cleared());

        let page = query(&products, &filters, DEFAULT_PER_PAGE);
        assert_eq!(page.items, products);
    }

    #[test]
    fn test_empty_catalog() {
        let page = query(&[], &FilterState::default(), DEFAULT_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_price_range_outside_catalog() {
        let products = catalog();
        let filters = FilterState {
            price_range: PriceRange::new(Decimal::new(5000, 0), Decimal::new(9000, 0)),
            ..FilterState::default()
        };
        assert!(query(&products, &filters, DEFAULT_PER_PAGE).items.is_empty());
    }

    #[test]
    fn test_covering_rounds_up_to_thousand() {
        let range = PriceRange::covering(&catalog());
        assert_eq!(range.min, Decimal::ZERO);
        assert_eq!(range.max, Decimal::new(3000, 0));

        assert_eq!(PriceRange::covering(&[]).max, Decimal::ZERO);
    }

    #[test]
    fn test_facet_counts() {
        let mut products = catalog();
        products.push(Product::new("7", "Uncategorized Ottoman", Decimal::new(99, 0)));

        let counts = facet_counts(&products);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts.get("Sofa"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 6);
    }

    #[test]
    fn test_related_products_share_category() {
        let mut products = catalog();
        let mut second_sofa = Product::new("8", "Camelback Sofa", Decimal::new(1499, 0));
        second_sofa.category = products[3].category.clone();
        products.push(second_sofa);

        let chesterfield = &products[3];
        let related = related_products(&products, chesterfield, RELATED_PRODUCTS_LIMIT);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].name, "Camelback Sofa");
    }

    #[test]
    fn test_related_products_without_category() {
        let products = catalog();
        let orphan = Product::new("9", "Mystery Bench", Decimal::new(10, 0));
        assert!(related_products(&products, &orphan, RELATED_PRODUCTS_LIMIT).is_empty());
    }

    #[test]
    fn test_filter_state_deserializes_with_defaults() {
        let filters: FilterState =
            serde_json::from_str(r#"{"search": "sofa", "sort": "price-high"}"#).unwrap();
        assert_eq!(filters.search, "sofa");
        assert_eq!(filters.sort, SortKey::PriceDesc);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.price_range, PriceRange::default());
    }

    #[test]
    fn test_filter_state_unknown_sort_is_featured() {
        let filters: FilterState =
            serde_json::from_str(r#"{"sort": "most-popular", "page": 0}"#).unwrap();
        assert_eq!(filters.sort, SortKey::Featured);
        assert_eq!(filters.page, 0);

        let page = query(&catalog(), &filters, DEFAULT_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 6);
    }
}
