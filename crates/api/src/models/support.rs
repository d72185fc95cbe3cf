//! Inbound submission types: contact messages and product requests.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mooncart_core::{ContactMessageId, DeliveryManId, ProductRequestId, RequestStatus, UserId};

/// A message from the contact form.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A customer request for a product the store does not stock, decorated
/// with the requester's and assigned courier's names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRequest {
    pub id: ProductRequestId,
    pub user_id: Option<UserId>,
    pub product_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_man_id: Option<DeliveryManId>,
    pub rejection_reason: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub delivery_man_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
