//! Address repository.
//!
//! The single-default invariant is enforced twice: demote-then-promote
//! sequences run inside transactions here, and a partial unique index backs
//! them up at the schema level.

use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};

use mooncart_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

/// Fields for creating an address. `address_line` and `city` are required
/// at the route layer.
#[derive(Debug, Deserialize)]
pub struct NewAddress {
    pub label: Option<String>,
    pub address_line: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct AddressChanges {
    pub label: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
}

impl AddressChanges {
    /// Whether any field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.address_line.is_none()
            && self.city.is_none()
            && self.zip_code.is_none()
            && self.phone.is_none()
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's addresses, default first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Create an address.
    ///
    /// The first address a user saves becomes the default regardless of
    /// input; an explicit default demotes every other address first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let make_default = existing == 0 || input.is_default;
        if make_default && existing > 0 {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE, updated_at = NOW()
                 WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, Address>(
            "INSERT INTO addresses
                 (user_id, label, address_line, city, zip_code, phone, is_default)
             VALUES ($1, COALESCE($2, 'Home'), $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&input.label)
        .bind(&input.address_line)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.phone)
        .bind(make_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Partially update one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to someone else.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        changes: &AddressChanges,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE addresses SET updated_at = NOW()");
        if let Some(label) = &changes.label {
            qb.push(", label = ").push_bind(label);
        }
        if let Some(address_line) = &changes.address_line {
            qb.push(", address_line = ").push_bind(address_line);
        }
        if let Some(city) = &changes.city {
            qb.push(", city = ").push_bind(city);
        }
        if let Some(zip_code) = &changes.zip_code {
            qb.push(", zip_code = ").push_bind(zip_code);
        }
        if let Some(phone) = &changes.phone {
            qb.push(", phone = ").push_bind(phone);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(user_id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Make one of the user's addresses the default, demoting the rest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to someone else (the demotion is rolled back).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_default(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE addresses SET is_default = FALSE, updated_at = NOW()
             WHERE user_id = $1 AND is_default",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE addresses SET is_default = TRUE, updated_at = NOW()
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete one of the user's addresses.
    ///
    /// Deleting the default promotes the most recently created remaining
    /// address, so a user with addresses always has a default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to someone else.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "SELECT is_default FROM addresses WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if was_default {
            sqlx::query(
                "UPDATE addresses SET is_default = TRUE, updated_at = NOW()
                 WHERE id = (SELECT id FROM addresses
                             WHERE user_id = $1
                             ORDER BY created_at DESC, id DESC
                             LIMIT 1)",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_is_empty() {
        assert!(AddressChanges::default().is_empty());

        let changes = AddressChanges {
            city: Some("Dhaka".to_owned()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
