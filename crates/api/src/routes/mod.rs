//! HTTP route handlers.
//!
//! # Route structure
//!
//! Each resource lives at one path; the HTTP method selects the operation
//! class (GET read, POST create, PUT update/action, DELETE remove) and an
//! `action` query parameter selects sub-operations:
//!
//! ```text
//! /api/users             ?action=login|register|logout|profile|all|update
//! /api/products          ?action=single|category|search      (GET default: all)
//! /api/categories        ?action=single|with_products        (GET default: all)
//! /api/cart              ?action=clear                       (DELETE)
//! /api/orders            ?action=single|user|stats|status    (GET default: all)
//! /api/addresses         ?action=default                     (PUT)
//! /api/delivery-men      ?action=single                      (GET default: all)
//! /api/contact           ?action=single|read                 (GET default: all)
//! /api/product-requests  ?action=single|user                 (GET default: all)
//! ```
//!
//! Every response is a JSON envelope: `{"success": bool, "message"?, ...}`.

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod delivery_men;
pub mod orders;
pub mod product_requests;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::state::AppState;

/// Plain acknowledgement envelope for mutations that return no resource.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    /// A successful acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

impl IntoResponse for Ack {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(users::index).post(users::submit).put(users::update),
        )
        .route(
            "/api/products",
            get(products::index)
                .post(products::create)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/api/categories",
            get(categories::index)
                .post(categories::create)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route(
            "/api/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        .route(
            "/api/orders",
            get(orders::index).post(orders::create).put(orders::update),
        )
        .route(
            "/api/addresses",
            get(addresses::index)
                .post(addresses::create)
                .put(addresses::update)
                .delete(addresses::remove),
        )
        .route(
            "/api/delivery-men",
            get(delivery_men::index)
                .post(delivery_men::create)
                .put(delivery_men::update)
                .delete(delivery_men::remove),
        )
        .route(
            "/api/contact",
            get(contact::index)
                .post(contact::submit)
                .put(contact::update)
                .delete(contact::remove),
        )
        .route(
            "/api/product-requests",
            get(product_requests::index)
                .post(product_requests::create)
                .put(product_requests::update)
                .delete(product_requests::remove),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

/// JSON 404 for unknown paths.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"success": false, "message": "Not found"})),
    )
        .into_response()
}

/// JSON 405 for known paths with the wrong method.
async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({"success": false, "message": "Method not allowed"})),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_envelope_shape() {
        let json = serde_json::to_value(Ack::new("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
    }
}
