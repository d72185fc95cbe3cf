//! Category repository.

use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};

use mooncart_core::{CategoryId, Slug};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Category, Product};

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    /// Whether any field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.description.is_none()
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories alphabetically with their active-product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT c.*,
                    COUNT(p.id) AS product_count,
                    NULL::BIGINT AS total_stock
             FROM categories c
             LEFT JOIN products p ON c.id = p.category_id AND p.is_active
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// List categories with product counts and total stock, most stocked
    /// categories first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_stock(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT c.*,
                    COUNT(p.id) AS product_count,
                    SUM(p.stock) AS total_stock
             FROM categories c
             LEFT JOIN products p ON c.id = p.category_id AND p.is_active
             GROUP BY c.id
             ORDER BY product_count DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT c.*,
                    (SELECT COUNT(*) FROM products p
                     WHERE p.category_id = c.id AND p.is_active) AS product_count,
                    NULL::BIGINT AS total_stock
             FROM categories c
             WHERE c.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// The active products belonging to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_products(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT p.*, c.name AS category_name, c.slug AS category_slug
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.category_id = $1 AND p.is_active
             ORDER BY p.created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Whether a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a category, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        name: &str,
        icon: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, RepositoryError> {
        let slug = Slug::from_name(name);

        let id: CategoryId = sqlx::query_scalar(
            "INSERT INTO categories (name, slug, icon, description)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(name)
        .bind(slug.as_str())
        .bind(icon)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category slug already exists"))?;

        self.get(id)
            .await?
            .ok_or_else(|| RepositoryError::DataCorruption("created category vanished".to_owned()))
    }

    /// Partially update a category; the slug follows the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE categories SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
            qb.push(", slug = ")
                .push_bind(Slug::from_name(name).into_inner());
        }
        if let Some(icon) = &changes.icon {
            qb.push(", icon = ").push_bind(icon);
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "category slug already exists"))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count the products referencing a category, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_count(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Delete a category. Returns `true` if a row was removed.
    ///
    /// Callers must check [`Self::product_count`] first; the FK will reject
    /// the delete otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
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
        assert!(CategoryChanges::default().is_empty());

        let changes = CategoryChanges {
            icon: Some("leaf".to_owned()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
