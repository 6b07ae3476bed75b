//! Wishlist route handlers.
//!
//! The wishlist lives in the visitor's session. Every mutation answers
//! with the full wishlist so the client can redraw without a second
//! request.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use cozy_furniture_core::wishlist::{Toast, WishlistStore};
use cozy_furniture_core::{Product, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::whatsapp::{self, ContactForm};
use crate::wishlist::{self as store, SessionStorage};

/// A saved product.
///
/// `product` is `None` for a bare id the catalog no longer knows.
#[derive(Debug, Serialize)]
pub struct WishlistItem {
    pub id: ProductId,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub items: Vec<WishlistItem>,
    pub count: usize,
    /// Notification still within its display window.
    pub toast: Option<Toast>,
}

impl WishlistResponse {
    fn new(wishlist: &WishlistStore<SessionStorage>, catalog: &Catalog) -> Self {
        let items: Vec<WishlistItem> = wishlist
            .entries()
            .iter()
            .map(|entry| WishlistItem {
                id: entry.id().clone(),
                product: entry
                    .product()
                    .or_else(|| catalog.product(entry.id()))
                    .cloned(),
            })
            .collect();

        Self {
            count: items.len(),
            items,
            toast: wishlist.visible_toast(Utc::now()).cloned(),
        }
    }

    fn products(&self) -> Vec<&Product> {
        self.items.iter().filter_map(|i| i.product.as_ref()).collect()
    }
}

/// Current wishlist, with snapshots refreshed from the catalog.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<WishlistResponse>> {
    let catalog = state.catalog().snapshot();
    let mut wishlist = store::load(session).await?;
    if !catalog.is_empty() {
        wishlist.refresh_snapshots(&catalog.products).await?;
    }
    Ok(Json(WishlistResponse::new(&wishlist, &catalog)))
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ProductId,
}

/// Save a catalog product.
///
/// Adding a product that is already saved changes nothing.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddRequest>,
) -> Result<Json<WishlistResponse>> {
    let catalog = state.catalog().snapshot();
    let product = catalog
        .product(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product '{}'", request.product_id)))?;

    let mut wishlist = store::load(session).await?;
    if wishlist.add(product.clone()).await?.is_some() {
        add_breadcrumb(
            "wishlist",
            "Added product",
            Some(&[("product_id", request.product_id.as_str())]),
        );
    }

    Ok(Json(WishlistResponse::new(&wishlist, &catalog)))
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub product_id: ProductId,
    pub present: bool,
}

/// Whether a product is saved.
pub async fn contains(session: Session, Path(id): Path<String>) -> Result<Json<MembershipResponse>> {
    let wishlist = store::load(session).await?;
    let product_id = ProductId::new(id);
    Ok(Json(MembershipResponse {
        present: wishlist.contains(&product_id),
        product_id,
    }))
}

/// Remove a saved product. Removing an absent product changes nothing.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<WishlistResponse>> {
    let product_id = ProductId::new(id);
    let mut wishlist = store::load(session).await?;
    if wishlist.remove(&product_id).await?.is_some() {
        add_breadcrumb(
            "wishlist",
            "Removed product",
            Some(&[("product_id", product_id.as_str())]),
        );
    }

    Ok(Json(WishlistResponse::new(
        &wishlist,
        &state.catalog().snapshot(),
    )))
}

/// Remove every saved product.
#[instrument(skip_all)]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<WishlistResponse>> {
    let mut wishlist = store::load(session).await?;
    wishlist.clear().await?;
    Ok(Json(WishlistResponse::new(
        &wishlist,
        &state.catalog().snapshot(),
    )))
}

/// Hide the current toast early.
pub async fn dismiss_toast(session: Session) -> Result<StatusCode> {
    let mut wishlist = store::load(session).await?;
    wishlist.dismiss_toast().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    /// `wa.me` deep link with the message pre-filled.
    pub url: String,
    pub message: String,
}

/// Turn the wishlist into a WhatsApp inquiry.
#[instrument(skip_all)]
pub async fn inquiry(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ContactForm>,
) -> Result<Json<InquiryResponse>> {
    let contact = form.validate()?;

    let wishlist = store::load(session).await?;
    let response = WishlistResponse::new(&wishlist, &state.catalog().snapshot());
    let products = response.products();
    if products.is_empty() {
        return Err(AppError::BadRequest("Your wishlist is empty".to_string()));
    }

    let message = whatsapp::format_inquiry(&products, &contact, Utc::now().date_naive())?;
    let url = whatsapp::deep_link(state.config().whatsapp_number.as_deref(), &message);

    add_breadcrumb("wishlist", "Sent inquiry", None);
    tracing::info!(items = products.len(), "Wishlist inquiry prepared");

    Ok(Json(InquiryResponse { url, message }))
}
