//! Catalog route handlers.
//!
//! Listings are answered from the in-memory catalog snapshot. A detail
//! request for a slug the snapshot does not know falls through to the CMS,
//! so products published since the last refresh are still reachable. The
//! related-products route does the same.

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cozy_furniture_core::catalog::{
    self, FilterState, Page, PriceRange, RELATED_PRODUCTS_LIMIT, SortKey,
};
use cozy_furniture_core::{Category, Color, Material, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: usize = 100;

/// Listing query parameters.
///
/// List-valued filters are comma-separated: `?colors=Gray,Navy`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub categories: Option<String>,
    pub colors: Option<String>,
    pub materials: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<usize>,
}

impl ProductListQuery {
    /// Translate the query string into engine filters.
    #[must_use]
    pub fn filter_state(&self) -> FilterState {
        let defaults = PriceRange::default();
        FilterState {
            search: self.search.clone().unwrap_or_default(),
            categories: split_list(self.categories.as_deref()),
            colors: split_list(self.colors.as_deref()),
            materials: split_list(self.materials.as_deref()),
            price_range: PriceRange::new(
                self.min_price.unwrap_or(defaults.min),
                self.max_price.unwrap_or(defaults.max),
            ),
            in_stock_only: self.in_stock.unwrap_or(false),
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page: self.page.unwrap_or(1),
        }
    }

    /// Requested page size, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self, default: usize) -> usize {
        self.per_page.unwrap_or(default).clamp(1, MAX_PER_PAGE)
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// One listing page plus the data needed to draw the filter controls.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    #[serde(flatten)]
    pub page: Page<Product>,
    /// Slider bounds covering the whole catalog.
    pub price_range: PriceRange,
    pub sort: SortKey,
}

/// List products matching the query.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Json<ProductListResponse> {
    let snapshot = state.catalog().snapshot();
    let filters = query.filter_state();
    let per_page = query.per_page(state.config().products_per_page);

    Json(ProductListResponse {
        page: catalog::query(&snapshot.products, &filters, per_page),
        price_range: snapshot.price_range(),
        sort: filters.sort,
    })
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Product>> {
    if let Some(product) = state.catalog().snapshot().product_by_slug(&slug) {
        return Ok(Json(product.clone()));
    }

    let product = state.cms().product_by_slug(&slug).await?;
    Ok(Json(product))
}

/// Other products from the same category.
///
/// Like [`show`], a slug missing from the snapshot is looked up in the CMS;
/// its neighbours still come from the snapshot.
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let snapshot = state.catalog().snapshot();
    let fetched;
    let product = match snapshot.product_by_slug(&slug) {
        Some(product) => product,
        None => {
            fetched = state.cms().product_by_slug(&slug).await?;
            &fetched
        }
    };

    let related = catalog::related_products(&snapshot.products, product, RELATED_PRODUCTS_LIMIT)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(related))
}

/// A category with the number of products filed under it.
#[derive(Debug, Serialize)]
pub struct CategoryCount {
    #[serde(flatten)]
    pub category: Category,
    pub count: usize,
}

/// Categories with product counts.
pub async fn categories(State(state): State<AppState>) -> Json<Vec<CategoryCount>> {
    let snapshot = state.catalog().snapshot();
    let counts: BTreeMap<String, usize> = catalog::facet_counts(&snapshot.products);

    Json(
        snapshot
            .categories
            .iter()
            .map(|category| CategoryCount {
                count: counts.get(&category.name).copied().unwrap_or(0),
                category: category.clone(),
            })
            .collect(),
    )
}

pub async fn colors(State(state): State<AppState>) -> Json<Vec<Color>> {
    Json(state.catalog().snapshot().colors.clone())
}

pub async fn materials(State(state): State<AppState>) -> Json<Vec<Material>> {
    Json(state.catalog().snapshot().materials.clone())
}
