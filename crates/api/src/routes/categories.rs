//! Category routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::{CategoryId, Slug};

use crate::db::RepositoryError;
use crate::db::categories::{CategoryChanges, CategoryRepository};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Product};
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryInput {
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub id: i32,
    #[serde(flatten)]
    pub changes: CategoryChanges,
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
struct CategoryBody {
    #[serde(flatten)]
    category: Category,
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct CategoryDetailResponse {
    success: bool,
    category: CategoryBody,
}

#[derive(Debug, Serialize)]
struct CategoryCreatedResponse {
    success: bool,
    message: String,
    category: Category,
}

/// GET /api/categories - list, single with products, or stock summary.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response> {
    let repo = CategoryRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let id = query
                .id
                .ok_or_else(|| AppError::Validation("Category ID required".to_owned()))?;
            let id = CategoryId::new(id);

            let category = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;
            let products = repo.active_products(id).await?;

            Ok(Json(CategoryDetailResponse {
                success: true,
                category: CategoryBody { category, products },
            })
            .into_response())
        }
        "with_products" => {
            let categories = repo.list_with_stock().await?;

            Ok(Json(CategoriesResponse {
                success: true,
                count: None,
                categories,
            })
            .into_response())
        }
        _ => {
            let categories = repo.list().await?;

            Ok(Json(CategoriesResponse {
                success: true,
                count: Some(categories.len()),
                categories,
            })
            .into_response())
        }
    }
}

/// POST /api/categories - create a category (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<NewCategoryInput>,
) -> Result<Response> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Category name required".to_owned()));
    }

    let repo = CategoryRepository::new(state.pool());

    let slug = Slug::from_name(&input.name);
    if repo.slug_exists(slug.as_str()).await? {
        return Err(AppError::Conflict("Category already exists".to_owned()));
    }

    let category = repo
        .create(
            &input.name,
            input.icon.as_deref(),
            input.description.as_deref(),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Category already exists".to_owned())
            }
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryCreatedResponse {
            success: true,
            message: "Category created successfully".to_owned(),
            category,
        }),
    )
        .into_response())
}

/// PUT /api/categories - partial update (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<UpdateCategoryInput>,
) -> Result<Response> {
    if input.changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_owned()));
    }

    CategoryRepository::new(state.pool())
        .update(CategoryId::new(input.id), &input.changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Category not found".to_owned()),
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Category already exists".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Ack::new("Category updated successfully").into_response())
}

/// DELETE /api/categories?id= - delete, refused while products reference
/// it (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<CategoryQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Category ID required".to_owned()))?;
    let id = CategoryId::new(id);

    let repo = CategoryRepository::new(state.pool());

    let product_count = repo.product_count(id).await?;
    if product_count > 0 {
        return Err(AppError::Validation(format!(
            "Cannot delete category. It has {product_count} products. Please reassign products first."
        )));
    }

    let deleted = repo.delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Category not found".to_owned()));
    }

    Ok(Ack::new("Category deleted successfully").into_response())
}
