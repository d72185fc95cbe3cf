//! Cart repository.
//!
//! Mutations run in short transactions that lock the product row first, so
//! two concurrent adds for the same product can never push a cart row past
//! the available stock.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use mooncart_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product missing or soft-deleted.
    #[error("product not found or unavailable")]
    ProductUnavailable,

    /// Product has zero stock.
    #[error("product is out of stock")]
    OutOfStock,

    /// Requested quantity exceeds the available stock.
    #[error("only {available} in stock")]
    InsufficientStock { available: i32 },

    /// No cart row for this (user, product).
    #[error("item not found in cart")]
    ItemNotFound,

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Result of an add: a fresh row or a merge into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Merged,
}

/// Result of a quantity update: changed, or dropped to zero and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    Removed,
}

/// Product fields needed for the add-time snapshot and stock check.
#[derive(Debug, sqlx::FromRow)]
struct ProductSnapshot {
    name: String,
    price: Decimal,
    image: Option<String>,
    stock: i32,
    is_active: bool,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user's cart rows, newest first, with live stock joined in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT c.*, p.stock AS available_stock
             FROM cart_items c
             LEFT JOIN products p ON c.product_id = p.id
             WHERE c.user_id = $1
             ORDER BY c.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Add a product to the cart, merging with an existing row.
    ///
    /// The product row is locked for the duration of the check-and-write.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductUnavailable` if the product is missing or
    /// inactive, `CartError::OutOfStock` / `CartError::InsufficientStock` on
    /// stock violations.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        category: Option<&str>,
    ) -> Result<AddOutcome, CartError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, ProductSnapshot>(
            "SELECT name, price, image, stock, is_active
             FROM products WHERE id = $1
             FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product) = product else {
            return Err(CartError::ProductUnavailable);
        };
        if !product.is_active {
            return Err(CartError::ProductUnavailable);
        }
        if product.stock <= 0 {
            return Err(CartError::OutOfStock);
        }

        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = if let Some(current) = existing {
            let merged = current + quantity;
            if merged > product.stock {
                return Err(CartError::InsufficientStock {
                    available: product.stock,
                });
            }

            sqlx::query(
                "UPDATE cart_items SET quantity = $1, updated_at = NOW()
                 WHERE user_id = $2 AND product_id = $3",
            )
            .bind(merged)
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

            AddOutcome::Merged
        } else {
            if quantity > product.stock {
                return Err(CartError::InsufficientStock {
                    available: product.stock,
                });
            }

            sqlx::query(
                "INSERT INTO cart_items
                     (user_id, product_id, product_name, price, image, category, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.image)
            .bind(category.unwrap_or("Product"))
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            AddOutcome::Inserted
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Set or adjust a row's quantity. A result of zero or below removes
    /// the row.
    ///
    /// Exactly one of `quantity` (absolute) or `change` (delta) must be
    /// supplied; the route validates that.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if there is no row, or
    /// `CartError::InsufficientStock` if the result exceeds current stock.
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Option<i32>,
        change: Option<i32>,
    ) -> Result<UpdateOutcome, CartError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i32, i32)> = sqlx::query_as(
            "SELECT c.quantity, p.stock
             FROM cart_items c
             JOIN products p ON c.product_id = p.id
             WHERE c.user_id = $1 AND c.product_id = $2
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current, stock)) = row else {
            return Err(CartError::ItemNotFound);
        };

        let next = quantity.unwrap_or_else(|| current + change.unwrap_or(0));

        if next <= 0 {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(UpdateOutcome::Removed);
        }

        if next > stock {
            return Err(CartError::InsufficientStock { available: stock });
        }

        sqlx::query(
            "UPDATE cart_items SET quantity = $1, updated_at = NOW()
             WHERE user_id = $2 AND product_id = $3",
        )
        .bind(next)
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove one product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if there was nothing to remove.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CartError::ItemNotFound);
        }

        Ok(())
    }

    /// Empty a user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
