//! Delivery staff repository.

use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};

use mooncart_core::DeliveryManId;

use super::{RepositoryError, map_unique_violation};
use crate::models::DeliveryMan;

/// Fields for registering a delivery staff member. `name`, `phone`, and
/// `nid` are required at the route layer.
#[derive(Debug, Deserialize)]
pub struct NewDeliveryMan {
    pub name: String,
    pub phone: String,
    pub nid: String,
    pub profile_image: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct DeliveryManChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub nid: Option<String>,
    pub profile_image: Option<String>,
    pub is_active: Option<bool>,
}

impl DeliveryManChanges {
    /// Whether any field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.nid.is_none()
            && self.profile_image.is_none()
            && self.is_active.is_none()
    }
}

/// How a removal was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// No orders reference the staff member; the row is gone.
    Deleted,
    /// Referenced by orders, so deactivated instead.
    Deactivated,
}

const NID_CONFLICT: &str = "NID already exists";

/// Repository for delivery staff database operations.
pub struct DeliveryManRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DeliveryManRepository<'a> {
    /// Create a new delivery staff repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List delivery staff, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<DeliveryMan>, RepositoryError> {
        let staff = if active_only {
            sqlx::query_as::<_, DeliveryMan>(
                "SELECT * FROM delivery_men WHERE is_active ORDER BY created_at DESC",
            )
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, DeliveryMan>(
                "SELECT * FROM delivery_men ORDER BY created_at DESC",
            )
            .fetch_all(self.pool)
            .await?
        };

        Ok(staff)
    }

    /// Get a delivery staff member by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DeliveryManId) -> Result<Option<DeliveryMan>, RepositoryError> {
        let staff = sqlx::query_as::<_, DeliveryMan>("SELECT * FROM delivery_men WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(staff)
    }

    /// Register a delivery staff member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the national id is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewDeliveryMan) -> Result<DeliveryMan, RepositoryError> {
        let staff = sqlx::query_as::<_, DeliveryMan>(
            "INSERT INTO delivery_men (name, phone, nid, profile_image, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.nid)
        .bind(&input.profile_image)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, NID_CONFLICT))?;

        Ok(staff)
    }

    /// Partially update a delivery staff member, returning the new row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the staff member doesn't
    /// exist, `RepositoryError::Conflict` if the new national id is taken.
    pub async fn update(
        &self,
        id: DeliveryManId,
        changes: &DeliveryManChanges,
    ) -> Result<DeliveryMan, RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE delivery_men SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(phone) = &changes.phone {
            qb.push(", phone = ").push_bind(phone);
        }
        if let Some(nid) = &changes.nid {
            qb.push(", nid = ").push_bind(nid);
        }
        if let Some(profile_image) = &changes.profile_image {
            qb.push(", profile_image = ").push_bind(profile_image);
        }
        if let Some(is_active) = changes.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        let staff = qb
            .build_query_as::<DeliveryMan>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, NID_CONFLICT))?;

        staff.ok_or(RepositoryError::NotFound)
    }

    /// Remove a delivery staff member: hard-delete when unreferenced,
    /// deactivate when any order points at them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the staff member doesn't
    /// exist.
    pub async fn remove(&self, id: DeliveryManId) -> Result<Removal, RepositoryError> {
        let assigned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE delivery_man_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        if assigned > 0 {
            let result = sqlx::query(
                "UPDATE delivery_men SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .execute(self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            return Ok(Removal::Deactivated);
        }

        let result = sqlx::query("DELETE FROM delivery_men WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(Removal::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_is_empty() {
        assert!(DeliveryManChanges::default().is_empty());

        let changes = DeliveryManChanges {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
