//! Wishlist entries.

use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId};

/// A saved product reference.
///
/// Serialized untagged: a snapshot is a JSON object, a bare id a JSON string
/// or integer. Both shapes can appear in one stored array, so wishlists
/// written by either the snapshot-based or the id-based storefront rehydrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WishlistEntry {
    /// Full product copy taken when the entry was added.
    Snapshot(Box<Product>),
    /// Identifier only; product details must be looked up in the catalog.
    Id(ProductId),
}

impl WishlistEntry {
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Snapshot(product) => &product.id,
            Self::Id(id) => id,
        }
    }

    /// Snapshot data, if this entry carries any.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Snapshot(product) => Some(product),
            Self::Id(_) => None,
        }
    }

    /// Name shown in notifications: the product name, or the id for bare
    /// entries.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Snapshot(product) => &product.name,
            Self::Id(id) => id.as_str(),
        }
    }
}

impl From<Product> for WishlistEntry {
    fn from(product: Product) -> Self {
        Self::Snapshot(Box::new(product))
    }
}

impl From<ProductId> for WishlistEntry {
    fn from(id: ProductId) -> Self {
        Self::Id(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_mixed_array_deserializes() {
        let json = r#"[
            "abc",
            12,
            {"id": 4, "name": "Classic Chesterfield Sofa", "price": 1899}
        ]"#;
        let entries: Vec<WishlistEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], WishlistEntry::Id(ProductId::new("abc")));
        assert_eq!(entries[1].id().as_str(), "12");
        assert_eq!(entries[2].display_name(), "Classic Chesterfield Sofa");
        assert_eq!(
            entries[2].product().map(|p| p.price),
            Some(Decimal::new(1899, 0))
        );
    }

    #[test]
    fn test_bare_id_serializes_as_string() {
        let entry = WishlistEntry::from(ProductId::from(3));
        assert_eq!(serde_json::to_string(&entry).unwrap(), "\"3\"");
    }
}
