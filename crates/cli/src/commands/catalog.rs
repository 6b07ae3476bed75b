//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # Query the bundled demo catalog
//! cozy-cli catalog query --fixture crates/cli/fixtures/catalog.yaml \
//!     --category Sofa --max-price 2000 --sort price-asc
//!
//! # Query the live CMS catalog
//! cozy-cli catalog query --search leather
//!
//! # Dump the live CMS catalog
//! cozy-cli catalog fetch
//! ```
//!
//! Output is JSON on stdout so it can be piped into `jq`.

use std::collections::BTreeSet;
use std::path::Path;

use cozy_furniture_core::Product;
use cozy_furniture_core::catalog::{self, FilterState, PriceRange, SortKey};
use cozy_furniture_storefront::catalog::CatalogHandle;
use cozy_furniture_storefront::cms::{CmsClient, CmsError};
use cozy_furniture_storefront::config::{ConfigError, StorefrontConfig};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture: {0}")]
    Fixture(#[from] serde_yaml::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filters accepted by `catalog query`.
#[derive(Debug, Default, Clone)]
pub struct QueryOptions {
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub materials: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: bool,
    pub sort: Option<String>,
    pub page: u32,
    pub per_page: usize,
}

impl QueryOptions {
    fn filter_state(&self) -> FilterState {
        let defaults = PriceRange::default();
        FilterState {
            search: self.search.clone().unwrap_or_default(),
            categories: self.categories.iter().cloned().collect::<BTreeSet<_>>(),
            colors: self.colors.iter().cloned().collect(),
            materials: self.materials.iter().cloned().collect(),
            price_range: PriceRange::new(
                self.min_price.unwrap_or(defaults.min),
                self.max_price.unwrap_or(defaults.max),
            ),
            in_stock_only: self.in_stock,
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page: self.page,
        }
    }
}

/// Parse a YAML list of products.
///
/// # Errors
///
/// Returns an error if the YAML is not a product list.
pub fn parse_fixture(yaml: &str) -> Result<Vec<Product>, CatalogCommandError> {
    Ok(serde_yaml::from_str(yaml)?)
}

async fn load_fixture(path: &Path) -> Result<Vec<Product>, CatalogCommandError> {
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_fixture(&content)?;
    tracing::info!(path = %path.display(), products = products.len(), "Loaded fixture");
    Ok(products)
}

fn cms_client() -> Result<CmsClient, CatalogCommandError> {
    let config = StorefrontConfig::from_env()?;
    Ok(CmsClient::new(&config.cms))
}

/// Run a listing query and render the page as JSON.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render_query(
    products: &[Product],
    options: &QueryOptions,
) -> Result<String, CatalogCommandError> {
    let page = catalog::query(products, &options.filter_state(), options.per_page.max(1));
    Ok(serde_json::to_string_pretty(&page)?)
}

/// Query a fixture file, or the live CMS catalog without one.
///
/// # Errors
///
/// Returns an error if the products cannot be loaded.
pub async fn query(
    fixture: Option<&Path>,
    options: &QueryOptions,
) -> Result<(), CatalogCommandError> {
    let products = match fixture {
        Some(path) => load_fixture(path).await?,
        None => cms_client()?.fetch_products().await?,
    };

    let output = render_query(&products, options)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Fetch the full catalog from the CMS and print it.
///
/// # Errors
///
/// Returns an error if configuration is missing or any CMS request fails.
pub async fn fetch() -> Result<(), CatalogCommandError> {
    let cms = cms_client()?;
    let handle = CatalogHandle::new();
    handle.refresh(&cms).await?;

    let output = serde_json::to_string_pretty(&*handle.snapshot())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DEMO_CATALOG: &str = include_str!("../../fixtures/catalog.yaml");

    fn options() -> QueryOptions {
        QueryOptions {
            page: 1,
            per_page: 12,
            ..QueryOptions::default()
        }
    }

    #[test]
    fn test_demo_fixture_parses() {
        let products = parse_fixture(DEMO_CATALOG).unwrap();
        assert_eq!(products.len(), 6);
        assert_eq!(products[0].id.as_str(), "1");
        assert_eq!(products[0].original_price, Some(Decimal::new(1599, 0)));
        assert!(!products[4].in_stock);
    }

    #[test]
    fn test_sofa_query() {
        let products = parse_fixture(DEMO_CATALOG).unwrap();
        let options = QueryOptions {
            categories: vec!["Sofa".to_string()],
            max_price: Some(Decimal::new(2000, 0)),
            sort: Some("price-asc".to_string()),
            ..options()
        };

        let json: serde_json::Value =
            serde_json::from_str(&render_query(&products, &options).unwrap()).unwrap();

        assert_eq!(json["total_items"], 1);
        assert_eq!(json["items"][0]["name"], "Classic Chesterfield Sofa");
    }

    #[test]
    fn test_in_stock_only() {
        let products = parse_fixture(DEMO_CATALOG).unwrap();
        let options = QueryOptions {
            in_stock: true,
            ..options()
        };

        let json: serde_json::Value =
            serde_json::from_str(&render_query(&products, &options).unwrap()).unwrap();
        assert_eq!(json["total_items"], 5);
    }

    #[test]
    fn test_page_zero_is_empty() {
        let products = parse_fixture(DEMO_CATALOG).unwrap();
        let options = QueryOptions {
            page: 0,
            ..options()
        };

        let json: serde_json::Value =
            serde_json::from_str(&render_query(&products, &options).unwrap()).unwrap();
        assert_eq!(json["page"], 0);
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["total_items"], 6);
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(matches!(
            parse_fixture("- name: missing price"),
            Err(CatalogCommandError::Fixture(_))
        ));
    }
}
