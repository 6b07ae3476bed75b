//! Cache types for CMS responses.

use cozy_furniture_core::{Category, Color, Material, Product};

/// Cache key for CMS responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products,
    Categories,
    Colors,
    Materials,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Colors(Vec<Color>),
    Materials(Vec<Material>),
}
