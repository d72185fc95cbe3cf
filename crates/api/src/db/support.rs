//! Repositories for inbound submissions: contact messages and product
//! requests.

use sqlx::PgPool;

use mooncart_core::{ContactMessageId, DeliveryManId, ProductRequestId, RequestStatus, UserId};

use super::RepositoryError;
use crate::models::{ContactMessage, ProductRequest};

/// Repository for contact form messages.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List messages newest first, with the unread total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        unread_only: bool,
    ) -> Result<(Vec<ContactMessage>, i64), RepositoryError> {
        let messages = if unread_only {
            sqlx::query_as::<_, ContactMessage>(
                "SELECT * FROM contact_messages WHERE NOT is_read ORDER BY created_at DESC",
            )
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ContactMessage>(
                "SELECT * FROM contact_messages ORDER BY created_at DESC",
            )
            .fetch_all(self.pool)
            .await?
        };

        let unread_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE NOT is_read")
                .fetch_one(self.pool)
                .await?;

        Ok((messages, unread_count))
    }

    /// Get a message and mark it read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_and_mark_read(
        &self,
        id: ContactMessageId,
    ) -> Result<Option<ContactMessage>, RepositoryError> {
        let message =
            sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        if message.is_some() {
            sqlx::query("UPDATE contact_messages SET is_read = TRUE WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;
        }

        Ok(message)
    }

    /// Store a submitted message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO contact_messages (name, email, subject, message)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(email)
        .bind(subject)
        .bind(message)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Mark a message read. Returns `true` if a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(&self, id: ContactMessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a message. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ContactMessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Base select decorating each request with the requester's and assigned
/// courier's names.
const REQUEST_SELECT: &str = "SELECT pr.*,
            u.name AS user_name, u.email AS user_email,
            dm.name AS delivery_man_name
     FROM product_requests pr
     LEFT JOIN users u ON pr.user_id = u.id
     LEFT JOIN delivery_men dm ON pr.delivery_man_id = dm.id";

/// Repository for product requests.
pub struct ProductRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRequestRepository<'a> {
    /// Create a new product request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List requests newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ProductRequest>, RepositoryError> {
        let requests = if let Some(status) = status {
            sqlx::query_as::<_, ProductRequest>(&format!(
                "{REQUEST_SELECT} WHERE pr.status = $1 ORDER BY pr.created_at DESC"
            ))
            .bind(status)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ProductRequest>(&format!(
                "{REQUEST_SELECT} ORDER BY pr.created_at DESC"
            ))
            .fetch_all(self.pool)
            .await?
        };

        Ok(requests)
    }

    /// Get a request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ProductRequestId,
    ) -> Result<Option<ProductRequest>, RepositoryError> {
        let request =
            sqlx::query_as::<_, ProductRequest>(&format!("{REQUEST_SELECT} WHERE pr.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(request)
    }

    /// A user's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, ProductRequest>(&format!(
            "{REQUEST_SELECT} WHERE pr.user_id = $1 ORDER BY pr.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Submit a request. Works logged-out; `email` is the contact channel
    /// for anonymous requesters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        product_name: &str,
        category: Option<&str>,
        description: Option<&str>,
        email: Option<&str>,
    ) -> Result<ProductRequest, RepositoryError> {
        let id: ProductRequestId = sqlx::query_scalar(
            "INSERT INTO product_requests (user_id, product_name, category, description, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(product_name)
        .bind(category)
        .bind(description)
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| RepositoryError::DataCorruption("created request vanished".to_owned()))
    }

    /// Update a request's review status.
    ///
    /// Approval records the delivery plan and clears any rejection reason;
    /// rejection records the reason and clears the delivery plan.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: ProductRequestId,
        status: RequestStatus,
        admin_notes: Option<&str>,
        delivery_time: Option<&str>,
        delivery_man_id: Option<DeliveryManId>,
        rejection_reason: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = match status {
            RequestStatus::Approved => {
                sqlx::query(
                    "UPDATE product_requests
                     SET status = $1,
                         admin_notes = COALESCE($2, admin_notes),
                         delivery_time = COALESCE($3, delivery_time),
                         delivery_man_id = COALESCE($4, delivery_man_id),
                         rejection_reason = NULL,
                         updated_at = NOW()
                     WHERE id = $5",
                )
                .bind(status)
                .bind(admin_notes)
                .bind(delivery_time)
                .bind(delivery_man_id)
                .bind(id)
                .execute(self.pool)
                .await?
            }
            RequestStatus::Rejected => {
                sqlx::query(
                    "UPDATE product_requests
                     SET status = $1,
                         admin_notes = COALESCE($2, admin_notes),
                         rejection_reason = COALESCE($3, rejection_reason),
                         delivery_time = NULL,
                         delivery_man_id = NULL,
                         updated_at = NOW()
                     WHERE id = $4",
                )
                .bind(status)
                .bind(admin_notes)
                .bind(rejection_reason)
                .bind(id)
                .execute(self.pool)
                .await?
            }
            RequestStatus::Pending | RequestStatus::UnderReview => {
                sqlx::query(
                    "UPDATE product_requests
                     SET status = $1,
                         admin_notes = COALESCE($2, admin_notes),
                         updated_at = NOW()
                     WHERE id = $3",
                )
                .bind(status)
                .bind(admin_notes)
                .bind(id)
                .execute(self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a request. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductRequestId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_requests WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
