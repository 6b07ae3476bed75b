//! Strapi CMS client.
//!
//! # Architecture
//!
//! - The CMS is source of truth for products and reference data; the
//!   storefront keeps an in-memory snapshot (see [`crate::catalog`])
//! - REST endpoints under `{CMS_URL}/api/`, bearer-token auth
//! - In-memory caching via `moka`: 60 s for products, 1 h for categories,
//!   colors and materials
//!
//! # Failure policy
//!
//! Listing calls (`products`, `categories`, `colors`, `materials`) log and
//! return an empty collection on any failure. Their `fetch_*` counterparts
//! and the single-product lookup propagate [`CmsError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cozy_furniture_storefront::cms::CmsClient;
//!
//! let client = CmsClient::new(&config.cms);
//!
//! let products = client.products().await;
//! let sofa = client.product_by_slug("classic-chesterfield-sofa").await?;
//! ```

mod cache;
mod client;
mod conversions;
pub mod types;

pub use client::CmsClient;
pub use types::{Collection, Meta, Pagination};

use thiserror::Error;

/// Errors that can occur when talking to the CMS.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status.
    #[error("CMS returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Rate limited by the CMS.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}
