//! Catalog domain types.
//!
//! These types are the storefront's own representation of CMS content, kept
//! separate from the raw CMS wire format. Reference entities (category,
//! colors, materials) are copies held by value and matched by name.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ColorId, MaterialId, ProductId};

// =============================================================================
// Reference Entities
// =============================================================================

/// Product category (e.g., "Sofa", "Recliner").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Upholstery or finish color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
}

/// Construction material (e.g., "Top Grain Leather").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
}

impl Category {
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Color {
    #[must_use]
    pub fn new(id: impl Into<ColorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(id: impl Into<MaterialId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: Option<String>,
}

/// Outer dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Canonical product identifier.
    pub id: ProductId,
    /// URL handle used by the detail endpoint.
    #[serde(default)]
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Current price (non-negative).
    pub price: Decimal,
    /// Price before discount, if the product is on sale.
    #[serde(default)]
    pub original_price: Option<Decimal>,
    /// Average review rating.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Whether the product can be ordered now.
    #[serde(default)]
    pub in_stock: bool,
    /// Flagged "new arrival".
    #[serde(default)]
    pub is_new: bool,
    /// Flagged "best seller".
    #[serde(default)]
    pub is_bestseller: bool,
    /// Ordered gallery; the first image is the primary one.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    /// Marketing bullet points.
    #[serde(default)]
    pub features: Vec<String>,
}

impl Product {
    /// Create a product with the given identity and price.
    ///
    /// The product is in stock, unflagged, and has no reference entities.
    /// The slug is derived from the name.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: slugify(&name),
            name,
            description: String::new(),
            price,
            original_price: None,
            rating: None,
            in_stock: true,
            is_new: false,
            is_bestseller: false,
            images: Vec::new(),
            category: None,
            colors: Vec::new(),
            materials: Vec::new(),
            dimensions: None,
            features: Vec::new(),
        }
    }

    /// Name of the product's category, if it has one.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Amount saved against the original price.
    ///
    /// `None` when there is no original price or it is not above the current
    /// price.
    #[must_use]
    pub fn discount(&self) -> Option<Decimal> {
        self.original_price
            .filter(|original| *original > self.price)
            .map(|original| original - self.price)
    }
}

/// Lowercase, hyphen-separated handle for a product name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for word in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.extend(word.chars().flat_map(char::to_lowercase));
    }
    slug
}
