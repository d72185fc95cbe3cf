//! Product repository.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};

use mooncart_core::{CategoryId, ProductId, Slug};

use super::RepositoryError;
use crate::models::Product;

/// Base select joining each product to its category's name and slug.
const PRODUCT_SELECT: &str = "SELECT p.*, c.name AS category_name, c.slug AS category_slug
     FROM products p
     LEFT JOIN categories c ON p.category_id = c.id";

/// Fields for creating a product. `name` and `price` are required at the
/// route layer; everything else is optional.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub badge: Option<String>,
    pub stock: Option<i32>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub badge: Option<String>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProductChanges {
    /// Whether any field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.original_price.is_none()
            && self.image.is_none()
            && self.category_id.is_none()
            && self.badge.is_none()
            && self.stock.is_none()
            && self.is_active.is_none()
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, with the active total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT}
             WHERE p.is_active
             ORDER BY p.created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active")
            .fetch_one(self.pool)
            .await?;

        Ok((products, total))
    }

    /// Get a product by id (active or not).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product =
            sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(product)
    }

    /// List active products in a category identified by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category_slug(
        &self,
        slug: &str,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT}
             WHERE c.slug = $1 AND p.is_active
             ORDER BY p.created_at DESC"
        ))
        .bind(slug)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Search active products by name, description, or category name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{query}%");
        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT}
             WHERE p.is_active
               AND (p.name ILIKE $1 OR p.description ILIKE $1 OR c.name ILIKE $1)
             ORDER BY p.name ASC"
        ))
        .bind(&pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a product, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let slug = Slug::from_name(&input.name);

        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO products
                 (name, slug, description, price, original_price, image, category_id, badge, stock)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 100))
             RETURNING id",
        )
        .bind(&input.name)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.original_price)
        .bind(&input.image)
        .bind(input.category_id)
        .bind(&input.badge)
        .bind(input.stock)
        .fetch_one(self.pool)
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| RepositoryError::DataCorruption("created product vanished".to_owned()))
    }

    /// Partially update a product; regenerates the slug when the name
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE products SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
            qb.push(", slug = ")
                .push_bind(Slug::from_name(name).into_inner());
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(price) = changes.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(original_price) = changes.original_price {
            qb.push(", original_price = ").push_bind(original_price);
        }
        if let Some(image) = &changes.image {
            qb.push(", image = ").push_bind(image);
        }
        if let Some(category_id) = changes.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        if let Some(badge) = &changes.badge {
            qb.push(", badge = ").push_bind(badge);
        }
        if let Some(stock) = changes.stock {
            qb.push(", stock = ").push_bind(stock);
        }
        if let Some(is_active) = changes.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Soft-delete a product by marking it inactive.
    ///
    /// Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_is_empty() {
        assert!(ProductChanges::default().is_empty());

        let changes = ProductChanges {
            stock: Some(5),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
