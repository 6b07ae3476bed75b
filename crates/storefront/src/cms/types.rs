//! Strapi wire format.
//!
//! Responses are `{ "data": T | [T], "meta": { "pagination"?: ... } }`.
//! Entries are flat (Strapi 5 style). Relations and media are accepted either
//! as plain strings or as objects, since content types differ between CMS
//! setups.

use cozy_furniture_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

// =============================================================================
// Envelope
// =============================================================================

/// Decoded response envelope; `data` is normalized to a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

impl<T> Collection<T> {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            meta: Meta { pagination: None },
        }
    }

    /// First entry, used by single-entity endpoints.
    #[must_use]
    pub fn into_first(self) -> Option<T> {
        self.data.into_iter().next()
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Collection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCollection::<T>::deserialize(deserializer)?;
        let data = match raw.data {
            None => Vec::new(),
            Some(OneOrMany::One(item)) => vec![item],
            Some(OneOrMany::Many(items)) => items,
        };
        Ok(Self {
            data,
            meta: raw.meta,
        })
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct RawCollection<T> {
    #[serde(default)]
    data: Option<OneOrMany<T>>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Deserialize)]
#[serde(untagged, bound(deserialize = "T: DeserializeOwned"))]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Response metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Strapi pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

// =============================================================================
// Entries
// =============================================================================

/// Product entry as stored in the CMS.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsProduct {
    pub id: ProductId,
    #[serde(default)]
    pub document_id: Option<ProductId>,
    #[serde(default)]
    pub slug: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default, alias = "isBestseller")]
    pub is_best_seller: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<CmsMedia>,
    #[serde(default)]
    pub category: Option<CmsReference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<CmsReference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub materials: Vec<CmsReference>,
    #[serde(default)]
    pub dimensions: Option<CmsDimensions>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<CmsFeature>,
}

/// Uploaded media: a bare URL or a Strapi media object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CmsMedia {
    Url(String),
    #[serde(rename_all = "camelCase")]
    Asset {
        url: String,
        #[serde(default)]
        alternative_text: Option<String>,
    },
}

/// Category, color or material: a bare name or an entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CmsReference {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Entity {
        #[serde(default)]
        id: Option<serde_json::Value>,
        #[serde(default)]
        document_id: Option<String>,
        name: String,
    },
}

/// Outer dimensions component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CmsDimensions {
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
}

/// Feature bullet: a bare string or a repeatable component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CmsFeature {
    Text(String),
    Item {
        #[serde(alias = "feature", alias = "text", alias = "title")]
        name: String,
    },
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_envelope() {
        let body = json!({
            "data": [{"id": 1, "name": "Gray"}, {"id": 2, "name": "Navy"}],
            "meta": {"pagination": {"page": 1, "pageSize": 25, "pageCount": 1, "total": 2}}
        });
        let collection: Collection<CmsReference> = serde_json::from_value(body).unwrap();

        assert_eq!(collection.data.len(), 2);
        assert_eq!(collection.meta.pagination.map(|p| p.total), Some(2));
    }

    #[test]
    fn test_single_object_envelope() {
        let body = json!({"data": {"id": 7, "name": "Sofa"}, "meta": {}});
        let collection: Collection<CmsReference> = serde_json::from_value(body).unwrap();

        assert_eq!(collection.data.len(), 1);
        assert!(collection.meta.pagination.is_none());
    }

    #[test]
    fn test_null_data_is_empty() {
        let collection: Collection<CmsReference> =
            serde_json::from_value(json!({"data": null})).unwrap();
        assert!(collection.into_first().is_none());
    }

    #[test]
    fn test_product_with_nulls_and_mixed_shapes() {
        let body = json!({
            "id": 4,
            "documentId": "h8k2m1",
            "name": "Classic Chesterfield Sofa",
            "price": 1899,
            "originalPrice": null,
            "images": null,
            "category": "Sofa",
            "colors": [{"id": 3, "name": "Oxblood"}, "Green"],
            "features": ["Hand Tufted", {"feature": "Rolled Arms"}],
            "isBestSeller": true
        });
        let product: CmsProduct = serde_json::from_value(body).unwrap();

        assert_eq!(product.document_id.as_ref().map(ProductId::as_str), Some("h8k2m1"));
        assert!(product.images.is_empty());
        assert_eq!(product.category, Some(CmsReference::Name("Sofa".to_string())));
        assert_eq!(product.colors.len(), 2);
        assert_eq!(product.features.len(), 2);
        assert!(product.is_best_seller);
        assert!(product.in_stock.is_none());
    }
}
