//! Strapi REST client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Products are cached for 60 seconds and
//! reference data for an hour using `moka`.

use std::sync::Arc;
use std::time::Duration;

use cozy_furniture_core::{Category, Color, Material, Product};
use moka::future::Cache;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use super::CmsError;
use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_category, convert_color, convert_material, convert_product};
use super::types::{CmsProduct, CmsReference, Collection};
use crate::config::CmsConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Strapi REST API.
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<CmsClientInner>,
}

struct CmsClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    products_cache: Cache<CacheKey, CacheValue>,
    reference_cache: Cache<CacheKey, CacheValue>,
}

impl CmsClient {
    /// Create a new CMS client.
    #[must_use]
    pub fn new(config: &CmsConfig) -> Self {
        let products_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.products_ttl)
            .build();
        let reference_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.reference_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cozy-furniture-storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            inner: Arc::new(CmsClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                products_cache,
                reference_cache,
            }),
        }
    }

    /// CMS base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `{base}/api/{endpoint}`, keeping any path prefix of the base.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url, CmsError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/api/{}",
            endpoint.trim_start_matches('/')
        ))?)
    }

    /// Fetch and decode one endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status (404 maps to
    /// [`CmsError::NotFound`], 429 to [`CmsError::RateLimited`]), or an
    /// undecodable body.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Collection<T>, CmsError> {
        let url = self.endpoint_url(endpoint)?;

        let mut request = self
            .inner
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CmsError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CmsError::NotFound(format!("CMS resource not found: {endpoint}")));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "CMS returned non-success status"
            );
            return Err(CmsError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse CMS response"
            );
            CmsError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get all products, or an empty list if the CMS is unavailable.
    pub async fn products(&self) -> Vec<Product> {
        self.fetch_products().await.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching products");
            Vec::new()
        })
    }

    /// Get all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CmsError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.products_cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let collection = self
            .fetch_collection::<CmsProduct>("products?populate=*")
            .await?;
        let products: Vec<Product> = collection
            .data
            .into_iter()
            .map(|raw| convert_product(raw, &self.inner.base_url))
            .collect();

        self.inner
            .products_cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if the CMS has no such product, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, CmsError> {
        let cache_key = CacheKey::Product(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.products_cache.get(&cache_key).await
        {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let endpoint = format!("products/{}?populate=*", urlencoding::encode(slug));
        let raw = self
            .fetch_collection::<CmsProduct>(&endpoint)
            .await?
            .into_first()
            .ok_or_else(|| CmsError::NotFound(format!("Product not found: {slug}")))?;
        let product = convert_product(raw, &self.inner.base_url);

        self.inner
            .products_cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    /// Get all categories, or an empty list if the CMS is unavailable.
    pub async fn categories(&self) -> Vec<Category> {
        self.fetch_categories().await.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching categories");
            Vec::new()
        })
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, CmsError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.reference_cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.fetch_references("categories", convert_category).await?;
        self.inner
            .reference_cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get all colors, or an empty list if the CMS is unavailable.
    pub async fn colors(&self) -> Vec<Color> {
        self.fetch_colors().await.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching colors");
            Vec::new()
        })
    }

    /// Get all colors.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_colors(&self) -> Result<Vec<Color>, CmsError> {
        if let Some(CacheValue::Colors(colors)) =
            self.inner.reference_cache.get(&CacheKey::Colors).await
        {
            debug!("Cache hit for colors");
            return Ok(colors);
        }

        let colors = self.fetch_references("colors", convert_color).await?;
        self.inner
            .reference_cache
            .insert(CacheKey::Colors, CacheValue::Colors(colors.clone()))
            .await;

        Ok(colors)
    }

    /// Get all materials, or an empty list if the CMS is unavailable.
    pub async fn materials(&self) -> Vec<Material> {
        self.fetch_materials().await.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching materials");
            Vec::new()
        })
    }

    /// Get all materials.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn fetch_materials(&self) -> Result<Vec<Material>, CmsError> {
        if let Some(CacheValue::Materials(materials)) =
            self.inner.reference_cache.get(&CacheKey::Materials).await
        {
            debug!("Cache hit for materials");
            return Ok(materials);
        }

        let materials = self.fetch_references("materials", convert_material).await?;
        self.inner
            .reference_cache
            .insert(CacheKey::Materials, CacheValue::Materials(materials.clone()))
            .await;

        Ok(materials)
    }

    async fn fetch_references<T>(
        &self,
        endpoint: &str,
        convert: fn(CmsReference) -> T,
    ) -> Result<Vec<T>, CmsError> {
        let collection = self.fetch_collection::<CmsReference>(endpoint).await?;
        Ok(collection.data.into_iter().map(convert).collect())
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.products_cache.invalidate_all();
        self.inner.reference_cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CmsClient {
        CmsClient::new(&CmsConfig::new(Url::parse(base).unwrap(), None))
    }

    #[test]
    fn test_endpoint_url() {
        let client = client("http://localhost:1337");
        assert_eq!(
            client.endpoint_url("products?populate=*").unwrap().as_str(),
            "http://localhost:1337/api/products?populate=*"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = client("https://example.com/cms/");
        assert_eq!(
            client.endpoint_url("/colors").unwrap().as_str(),
            "https://example.com/cms/api/colors"
        );
    }

    #[tokio::test]
    async fn test_listing_returns_empty_when_unreachable() {
        // Port 9 (discard) refuses connections on loopback.
        let client = client("http://127.0.0.1:9");
        assert!(client.products().await.is_empty());
        assert!(client.categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_all_drops_cached_responses() {
        let client = client("http://127.0.0.1:9");
        client
            .inner
            .products_cache
            .insert(CacheKey::Products, CacheValue::Products(Vec::new()))
            .await;
        client
            .inner
            .reference_cache
            .insert(CacheKey::Colors, CacheValue::Colors(Vec::new()))
            .await;

        client.invalidate_all();

        assert!(client.inner.products_cache.get(&CacheKey::Products).await.is_none());
        assert!(client.inner.reference_cache.get(&CacheKey::Colors).await.is_none());
    }

    #[tokio::test]
    async fn test_detail_propagates_error_when_unreachable() {
        let client = client("http://127.0.0.1:9");
        let result = client.product_by_slug("sofa").await;
        assert!(matches!(result, Err(CmsError::Http(_))));
    }
}
