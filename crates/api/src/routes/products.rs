//! Product routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::{NewProduct, ProductChanges, ProductRepository};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::routes::Ack;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub id: i32,
    #[serde(flatten)]
    pub changes: ProductChanges,
}

#[derive(Debug, Serialize)]
struct ProductsResponse {
    success: bool,
    count: usize,
    total: i64,
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct ProductResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    product: Product,
}

#[derive(Debug, Serialize)]
struct CategoryProductsResponse {
    success: bool,
    category: String,
    count: usize,
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    query: String,
    count: usize,
    products: Vec<Product>,
}

/// GET /api/products - list, single, by category, or search.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response> {
    let repo = ProductRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let id = query
                .id
                .ok_or_else(|| AppError::Validation("Product ID required".to_owned()))?;
            let product = repo
                .get(ProductId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

            Ok(Json(ProductResponse {
                success: true,
                message: None,
                product,
            })
            .into_response())
        }
        "category" => {
            let slug = query
                .category
                .ok_or_else(|| AppError::Validation("Category required".to_owned()))?;
            let products = repo.list_by_category_slug(&slug).await?;

            Ok(Json(CategoryProductsResponse {
                success: true,
                category: slug,
                count: products.len(),
                products,
            })
            .into_response())
        }
        "search" => {
            let q = query
                .q
                .ok_or_else(|| AppError::Validation("Search query required".to_owned()))?;
            let products = repo.search(&q).await?;

            Ok(Json(SearchResponse {
                success: true,
                query: q,
                count: products.len(),
                products,
            })
            .into_response())
        }
        _ => {
            let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(0);
            let offset = query.offset.unwrap_or(0).max(0);
            let (products, total) = repo.list(limit, offset).await?;

            Ok(Json(ProductsResponse {
                success: true,
                count: products.len(),
                total,
                products,
            })
            .into_response())
        }
    }
}

/// POST /api/products - create a product (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<NewProduct>,
) -> Result<Response> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Name and price required".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            message: Some("Product created successfully".to_owned()),
            product,
        }),
    )
        .into_response())
}

/// PUT /api/products - partial update (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<UpdateProductInput>,
) -> Result<Response> {
    if input.changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_owned()));
    }

    ProductRepository::new(state.pool())
        .update(ProductId::new(input.id), &input.changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Ack::new("Product updated successfully").into_response())
}

/// DELETE /api/products?id= - soft delete (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ProductQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Product ID required".to_owned()))?;

    let deleted = ProductRepository::new(state.pool())
        .soft_delete(ProductId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(Ack::new("Product deleted successfully").into_response())
}
