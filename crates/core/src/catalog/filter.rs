//! Filter predicate.

use std::collections::BTreeSet;

use crate::types::Product;

use super::FilterState;

/// Whether `product` passes every active criterion of `filters`.
///
/// Search matches case-insensitively against the name or the description.
/// Category, color, and material selections match by name; an empty
/// selection matches everything.
#[must_use]
pub fn matches(product: &Product, filters: &FilterState) -> bool {
    let needle = filters.search.trim().to_lowercase();
    matches_with_needle(product, filters, &needle)
}

/// Products passing [`matches`], in input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
    let needle = filters.search.trim().to_lowercase();
    products
        .iter()
        .filter(|p| matches_with_needle(p, filters, &needle))
        .collect()
}

fn matches_with_needle(product: &Product, filters: &FilterState, needle: &str) -> bool {
    matches_search(product, needle)
        && matches_category(product, &filters.categories)
        && any_selected(product.colors.iter().map(|c| c.name.as_str()), &filters.colors)
        && any_selected(
            product.materials.iter().map(|m| m.name.as_str()),
            &filters.materials,
        )
        && filters.price_range.contains(product.price)
        && !(filters.in_stock_only && !product.in_stock)
}

fn matches_search(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

fn matches_category(product: &Product, selected: &BTreeSet<String>) -> bool {
    selected.is_empty()
        || product
            .category_name()
            .is_some_and(|name| selected.contains(name))
}

fn any_selected<'a>(mut names: impl Iterator<Item = &'a str>, selected: &BTreeSet<String>) -> bool {
    selected.is_empty() || names.any(|name| selected.contains(name))
}
