//! API index and fallback handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{OriginalUri, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub query: BTreeMap<String, String>,
}

/// Greeting that echoes the query string back.
pub async fn index(Query(query): Query<BTreeMap<String, String>>) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Hello from index route!",
        query,
    })
}

#[derive(Debug, Serialize)]
struct NotFoundBody<'a> {
    error: &'static str,
    path: &'a str,
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Route not found",
            path,
        }),
    )
        .into_response()
}
