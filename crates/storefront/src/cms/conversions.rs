//! Conversions from CMS wire types to catalog types.

use cozy_furniture_core::{Category, Color, Dimensions, Image, Material, Product};
use url::Url;

use super::types::{CmsDimensions, CmsFeature, CmsMedia, CmsProduct, CmsReference};

/// Convert a CMS product entry.
///
/// The `documentId` is preferred as canonical id; older entries only carry
/// the numeric id. Relative media URLs are resolved against `media_base`.
pub fn convert_product(raw: CmsProduct, media_base: &Url) -> Product {
    let id = raw.document_id.unwrap_or(raw.id);
    let mut product = Product::new(id, raw.name, raw.price);

    if let Some(slug) = raw.slug.filter(|s| !s.trim().is_empty()) {
        product.slug = slug;
    }
    product.description = raw.description.unwrap_or_default();
    product.original_price = raw.original_price;
    product.rating = raw.rating;
    product.in_stock = raw.in_stock.unwrap_or(true);
    product.is_new = raw.is_new;
    product.is_bestseller = raw.is_best_seller;
    product.images = raw
        .images
        .into_iter()
        .map(|media| convert_media(media, media_base))
        .collect();
    product.category = raw.category.map(|r| {
        let (id, name) = reference_parts(r);
        Category::new(id, name)
    });
    product.colors = raw.colors.into_iter().map(convert_color).collect();
    product.materials = raw.materials.into_iter().map(convert_material).collect();
    product.dimensions = raw.dimensions.map(convert_dimensions);
    product.features = raw.features.into_iter().map(convert_feature).collect();

    product
}

pub fn convert_category(raw: CmsReference) -> Category {
    let (id, name) = reference_parts(raw);
    Category::new(id, name)
}

pub fn convert_color(raw: CmsReference) -> Color {
    let (id, name) = reference_parts(raw);
    Color::new(id, name)
}

pub fn convert_material(raw: CmsReference) -> Material {
    let (id, name) = reference_parts(raw);
    Material::new(id, name)
}

/// Split a reference into `(id, name)`; bare names double as their id.
fn reference_parts(raw: CmsReference) -> (String, String) {
    match raw {
        CmsReference::Name(name) => (name.clone(), name),
        CmsReference::Entity {
            id,
            document_id,
            name,
        } => {
            let id = document_id
                .or_else(|| id.as_ref().and_then(json_id))
                .unwrap_or_else(|| name.clone());
            (id, name)
        }
    }
}

fn json_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_media(raw: CmsMedia, media_base: &Url) -> Image {
    let (url, alt) = match raw {
        CmsMedia::Url(url) => (url, None),
        CmsMedia::Asset {
            url,
            alternative_text,
        } => (url, alternative_text),
    };
    Image {
        url: resolve_media_url(&url, media_base),
        alt,
    }
}

/// Absolute URLs pass through; upload paths are joined onto the CMS host.
fn resolve_media_url(url: &str, media_base: &Url) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        return url.to_string();
    }
    media_base
        .join(url)
        .map_or_else(|_| url.to_string(), String::from)
}

const fn convert_dimensions(raw: CmsDimensions) -> Dimensions {
    Dimensions {
        width: raw.width,
        height: raw.height,
        depth: raw.depth,
    }
}

fn convert_feature(raw: CmsFeature) -> String {
    match raw {
        CmsFeature::Text(text) | CmsFeature::Item { name: text } => text,
    }
}
