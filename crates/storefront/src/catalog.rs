//! In-memory catalog snapshot.
//!
//! The app starts with an empty catalog. A background task fetches the full
//! catalog from the CMS and swaps it in atomically; readers clone an
//! `Arc<Catalog>` and never see a partially updated snapshot.
//!
//! Every refresh takes a ticket before it starts fetching. A result is only
//! applied when its ticket is newer than the one already applied, so a slow
//! refresh can never overwrite data from a refresh that started later.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use cozy_furniture_core::catalog::PriceRange;
use cozy_furniture_core::{Category, Color, Material, Product, ProductId};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::cms::{CmsClient, CmsError};

/// Products plus the reference data used to build filters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub colors: Vec<Color>,
    pub materials: Vec<Material>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        products: Vec<Product>,
        categories: Vec<Category>,
        colors: Vec<Color>,
        materials: Vec<Material>,
    ) -> Self {
        Self {
            products,
            categories,
            colors,
            materials,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Catalog whose reference data is collected from the products
    /// themselves, in first-seen order.
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        let categories = distinct(products.iter().filter_map(|p| p.category.clone()), |c| {
            c.name.clone()
        });
        let colors = distinct(products.iter().flat_map(|p| p.colors.clone()), |c| {
            c.name.clone()
        });
        let materials = distinct(products.iter().flat_map(|p| p.materials.clone()), |m| {
            m.name.clone()
        });
        Self::new(products, categories, colors, materials)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Price slider bounds covering every product.
    #[must_use]
    pub fn price_range(&self) -> PriceRange {
        PriceRange::covering(&self.products)
    }
}

fn distinct<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(key(item))).collect()
}

/// Ordering token for one refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Default)]
struct Applied {
    ticket: u64,
    catalog: Arc<Catalog>,
}

#[derive(Default)]
struct CatalogInner {
    current: RwLock<Applied>,
    next_ticket: AtomicU64,
}

/// Shared handle to the current catalog snapshot.
#[derive(Clone, Default)]
pub struct CatalogHandle {
    inner: Arc<CatalogInner>,
}

impl CatalogHandle {
    /// Create a handle holding an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle holding `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        let handle = Self::new();
        handle.replace(catalog);
        handle
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current.catalog)
    }

    /// Take a ticket for a refresh that is about to start.
    #[must_use]
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.inner.next_ticket.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Install `catalog` unless a newer refresh has already been applied.
    ///
    /// Returns whether the catalog was installed.
    pub fn apply(&self, ticket: RefreshTicket, catalog: Catalog) -> bool {
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if ticket.0 <= current.ticket {
            debug!(
                ticket = ticket.0,
                applied = current.ticket,
                "Discarding stale catalog refresh"
            );
            return false;
        }

        *current = Applied {
            ticket: ticket.0,
            catalog: Arc::new(catalog),
        };
        true
    }

    /// Install `catalog` unconditionally.
    pub fn replace(&self, catalog: Catalog) {
        let ticket = self.begin_refresh();
        self.apply(ticket, catalog);
    }

    /// Fetch the full catalog and install it.
    ///
    /// Cached CMS responses are dropped first so edits show up within one
    /// refresh interval. On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns the first CMS error encountered.
    #[instrument(skip_all)]
    pub async fn refresh(&self, cms: &CmsClient) -> Result<bool, CmsError> {
        let ticket = self.begin_refresh();
        cms.invalidate_all();

        let (products, categories, colors, materials) = tokio::try_join!(
            cms.fetch_products(),
            cms.fetch_categories(),
            cms.fetch_colors(),
            cms.fetch_materials(),
        )?;

        let count = products.len();
        let applied = self.apply(
            ticket,
            Catalog::new(products, categories, colors, materials),
        );
        if applied {
            info!(products = count, "Catalog refreshed");
        }
        Ok(applied)
    }

    /// Spawn a background task refreshing the catalog every `interval`.
    ///
    /// The first refresh runs immediately.
    pub fn spawn_refresh_task(&self, cms: CmsClient, interval: Duration) -> JoinHandle<()> {
        let handle = self.clone();
        info!(interval_secs = interval.as_secs(), "Spawning catalog refresh task");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = handle.refresh(&cms).await {
                    error!(error = %e, "Failed to refresh catalog, keeping previous snapshot");
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, name: &str, category: &str) -> Product {
        let mut product = Product::new(id, name, Decimal::new(100, 0));
        product.category = Some(Category::new(category, category));
        product.colors = vec![Color::new("gray", "Gray")];
        product
    }

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_starts_empty() {
        let handle = CatalogHandle::new();
        assert!(handle.snapshot().is_empty());
        assert!(handle.snapshot().fetched_at.is_none());
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let handle = CatalogHandle::new();
        let slow = handle.begin_refresh();
        let fast = handle.begin_refresh();

        assert!(handle.apply(fast, Catalog::from_products(vec![product("2", "New", "Sofa")])));
        assert!(!handle.apply(slow, Catalog::from_products(vec![product("1", "Old", "Sofa")])));

        assert_eq!(names(&handle.snapshot()), vec!["New"]);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let handle = CatalogHandle::with_catalog(Catalog::from_products(vec![product(
            "1", "First", "Sofa",
        )]));
        let before = handle.snapshot();

        handle.replace(Catalog::from_products(vec![product("2", "Second", "Sofa")]));

        assert_eq!(names(&before), vec!["First"]);
        assert_eq!(names(&handle.snapshot()), vec!["Second"]);
    }

    #[test]
    fn test_from_products_collects_reference_data() {
        let catalog = Catalog::from_products(vec![
            product("1", "A", "Sofa"),
            product("2", "B", "Recliner"),
            product("3", "C", "Sofa"),
        ]);

        let categories: Vec<&str> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(categories, vec!["Sofa", "Recliner"]);
        assert_eq!(catalog.colors.len(), 1);
        assert!(catalog.materials.is_empty());
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::from_products(vec![product("1", "Velvet Armchair", "Chair")]);
        assert!(catalog.product(&ProductId::new("1")).is_some());
        assert!(catalog.product(&ProductId::new("2")).is_none());
        assert!(catalog.product_by_slug("velvet-armchair").is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        use url::Url;

        use crate::config::CmsConfig;

        let handle = CatalogHandle::with_catalog(Catalog::from_products(vec![product(
            "1", "Kept", "Sofa",
        )]));
        let cms = CmsClient::new(&CmsConfig::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            None,
        ));

        assert!(handle.refresh(&cms).await.is_err());
        assert_eq!(names(&handle.snapshot()), vec!["Kept"]);
    }
}
