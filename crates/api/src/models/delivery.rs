//! Delivery staff domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mooncart_core::DeliveryManId;

/// A delivery staff member.
///
/// Never hard-deleted while referenced by orders; deactivated instead.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DeliveryMan {
    pub id: DeliveryManId,
    pub name: String,
    pub phone: String,
    pub nid: String,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
