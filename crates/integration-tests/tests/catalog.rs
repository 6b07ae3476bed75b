//! Product listing, detail, and reference data endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use cozy_furniture_core::{Category, Product};
use cozy_furniture_integration_tests::{TestApp, demo_products};
use rust_decimal::Decimal;
use serde_json::Value;

fn names(body: &Value) -> Vec<&str> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_default_listing() {
    let mut app = TestApp::new();
    let resp = app.get("/api/products").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["total_items"], 6);
    assert_eq!(resp.body["total_pages"], 1);
    assert_eq!(resp.body["page"], 1);
    assert_eq!(resp.body["per_page"], 12);
    assert_eq!(resp.body["sort"], "featured");
    assert_eq!(names(&resp.body)[0], "Modern Sectional Sofa");
    assert_eq!(resp.body["price_range"]["max"], "3000");
}

#[tokio::test]
async fn test_sofa_under_2000_by_price() {
    let mut app = TestApp::new();
    let resp = app
        .get("/api/products?categories=Sofa&min_price=0&max_price=2000&sort=price-asc")
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(names(&resp.body), vec!["Classic Chesterfield Sofa"]);
    assert_eq!(resp.body["items"][0]["price"], "1899");
}

#[tokio::test]
async fn test_search_and_stock_filters() {
    let mut app = TestApp::new();

    let resp = app.get("/api/products?search=leather&sort=name-asc").await;
    assert_eq!(
        names(&resp.body),
        vec!["Classic Chesterfield Sofa", "Luxury Leather Recliner"]
    );

    let resp = app.get("/api/products?in_stock=true").await;
    assert_eq!(resp.body["total_items"], 5);
    assert!(!names(&resp.body).contains(&"Contemporary Modular Sofa"));

    let resp = app.get("/api/products?colors=Navy,Emerald&sort=price-desc").await;
    assert_eq!(
        names(&resp.body),
        vec![
            "Contemporary Modular Sofa",
            "Modern Sectional Sofa",
            "Vintage Velvet Armchair"
        ]
    );
}

#[tokio::test]
async fn test_pagination() {
    let mut app = TestApp::new();

    let resp = app.get("/api/products?per_page=4&page=2").await;
    assert_eq!(resp.body["total_pages"], 2);
    assert_eq!(
        names(&resp.body),
        vec!["Contemporary Modular Sofa", "Vintage Velvet Armchair"]
    );

    let resp = app.get("/api/products?per_page=4&page=9").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(names(&resp.body).is_empty());
}

#[tokio::test]
async fn test_page_zero_is_empty() {
    let mut app = TestApp::new();
    let resp = app.get("/api/products?page=0&per_page=2").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["page"], 0);
    assert!(names(&resp.body).is_empty());
    assert_eq!(resp.body["total_items"], 6);
    assert_eq!(resp.body["total_pages"], 3);
}

#[tokio::test]
async fn test_unknown_sort_keeps_catalog_order() {
    let mut app = TestApp::new();
    let resp = app.get("/api/products?sort=cheapest-first").await;

    assert_eq!(resp.body["sort"], "featured");
    assert_eq!(names(&resp.body)[5], "Vintage Velvet Armchair");
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let mut app = TestApp::new();
    let resp = app.get("/api/products?min_price=cheap").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail() {
    let mut app = TestApp::new();
    let resp = app.get("/api/products/classic-chesterfield-sofa").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["id"], "4");
    assert_eq!(resp.body["category"]["name"], "Sofa");
}

#[tokio::test]
async fn test_unknown_slug_falls_through_to_cms() {
    // The CMS is unreachable in tests, so the lookup fails upstream.
    let mut app = TestApp::new();
    let resp = app.get("/api/products/floating-sofa").await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert!(resp.body["error"].as_str().unwrap().starts_with("CMS error"));
}

#[tokio::test]
async fn test_upstream_error_is_generic_in_production() {
    let config = cozy_furniture_integration_tests::test_config(&[("APP_ENV", "production")]);
    let mut app = TestApp::with_config(config, demo_products());
    let resp = app.get("/api/products/floating-sofa").await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.body["error"], "External service error");
}

#[tokio::test]
async fn test_related_products() {
    let sofa = |id: i64, name: &str| {
        let mut p = Product::new(id, name, Decimal::new(999, 0));
        p.category = Some(Category::new("sofa", "Sofa"));
        p
    };
    let mut chair = Product::new(9, "Reading Chair", Decimal::new(299, 0));
    chair.category = Some(Category::new("chair", "Chair"));

    let mut app = TestApp::with_products(vec![
        sofa(1, "Sofa One"),
        chair,
        sofa(2, "Sofa Two"),
        sofa(3, "Sofa Three"),
    ]);

    let resp = app.get("/api/products/sofa-one/related").await;
    assert_eq!(resp.status, StatusCode::OK);
    let related: Vec<&str> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(related, vec!["Sofa Two", "Sofa Three"]);

    // Unknown slugs are looked up in the CMS, which is unreachable here.
    let resp = app.get("/api/products/missing/related").await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_reference_data() {
    let mut app = TestApp::new();

    let resp = app.get("/api/categories").await;
    let categories = resp.body.as_array().unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0]["name"], "Sectional");
    assert_eq!(categories[0]["count"], 1);

    let resp = app.get("/api/colors").await;
    let colors: Vec<&str> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(&colors[..3], &["Gray", "Navy", "Beige"]);
    assert_eq!(colors.iter().filter(|c| **c == "Navy").count(), 1);

    let resp = app.get("/api/materials").await;
    assert_eq!(resp.body.as_array().unwrap().len(), 18);
}
