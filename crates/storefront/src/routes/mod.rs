//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness check
//! GET    /health/ready             - Readiness check (session database)
//! GET    /api                      - Greeting, echoes the query string
//!
//! # Catalog
//! GET    /api/products             - Filtered, sorted, paginated listing
//! GET    /api/products/{slug}      - Product detail
//! GET    /api/products/{slug}/related - Same-category products
//! GET    /api/categories           - Categories with product counts
//! GET    /api/colors               - Colors
//! GET    /api/materials            - Materials
//!
//! # Wishlist (session-backed, mutations rate limited)
//! GET    /api/wishlist             - Saved products and toast
//! POST   /api/wishlist             - Save a product
//! DELETE /api/wishlist             - Remove every product
//! DELETE /api/wishlist/toast       - Dismiss the toast
//! POST   /api/wishlist/inquiry     - WhatsApp deep link for the wishlist
//! GET    /api/wishlist/{id}        - Whether a product is saved
//! DELETE /api/wishlist/{id}        - Remove a product
//! ```
//!
//! Anything else answers 404 `{"error": "Route not found", "path": ...}`.

pub mod api;
pub mod health;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;
use crate::error::{expose_error_details, panic_response};
use crate::middleware::{
    inquiry_rate_limiter, request_id_middleware, security_headers_middleware,
    wishlist_rate_limiter,
};
use crate::state::AppState;

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/products/{slug}/related", get(products::related))
        .route("/categories", get(products::categories))
        .route("/colors", get(products::colors))
        .route("/materials", get(products::materials))
}

/// Create the wishlist routes router.
///
/// Reads are not rate limited. The inquiry route has its own, stricter
/// limiter.
pub fn wishlist_routes() -> Router<AppState> {
    let reads = Router::new()
        .route("/", get(wishlist::show))
        .route("/{id}", get(wishlist::contains));

    let mutations = Router::new()
        .route("/", post(wishlist::add).delete(wishlist::clear))
        .route("/toast", delete(wishlist::dismiss_toast))
        .route("/{id}", delete(wishlist::remove))
        .layer(wishlist_rate_limiter());

    let inquiry = Router::new()
        .route("/inquiry", post(wishlist::inquiry))
        .layer(inquiry_rate_limiter());

    reads.merge(mutations).merge(inquiry)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .nest("/health", health_routes())
        // API index, with and without the trailing slash
        .route("/api", get(api::index))
        .route("/api/", get(api::index))
        // Catalog
        .nest("/api", catalog_routes())
        // Wishlist
        .nest("/api/wishlist", wishlist_routes())
        .fallback(api::not_found)
}

/// CORS for the configured frontend origins.
///
/// Credentials are allowed so the session cookie reaches the API.
fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Assemble the full application: routes plus the middleware stack.
///
/// Sentry layers are added by the binary on top of this router.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let cors = cors_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(state.clone(), expose_error_details))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::db;
    use crate::middleware::session_layer;

    fn app_with_env(vars: &[(&str, &str)]) -> Router {
        let config = StorefrontConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
        .unwrap();
        let pool = db::create_lazy_pool(&config.database_url).unwrap();
        let sessions = session_layer(MemoryStore::default(), &config);
        app(AppState::new(config, pool), sessions)
    }

    fn test_app() -> Router {
        app_with_env(&[
            ("DATABASE_URL", "postgres://localhost:9/cozy"),
            ("CMS_URL", "http://127.0.0.1:9"),
            ("ALLOWED_ORIGINS", "http://localhost:5173,not a header\u{7f}"),
        ])
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_catalog_serves_empty_lists() {
        let (status, body) = get(test_app(), "/api/colors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (_, body) = get(test_app(), "/api/products").await;
        assert_eq!(body["total_items"], 0);
        assert_eq!(body["total_pages"], 0);
    }

    #[tokio::test]
    async fn test_fallback_reports_path() {
        let (status, body) = get(test_app(), "/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/api/unknown");
    }
}
