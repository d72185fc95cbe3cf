//! Address domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mooncart_core::{AddressId, UserId};

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub address_line: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
