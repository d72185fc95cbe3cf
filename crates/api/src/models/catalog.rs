//! Catalog domain types: categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mooncart_core::{CategoryId, ProductId};

/// A product category.
///
/// `product_count` and `total_stock` are aggregates computed by the list
/// queries; they are zero/absent on plain single-row reads.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub product_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_stock: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A catalog product, decorated with its category's name and slug.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub badge: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}
