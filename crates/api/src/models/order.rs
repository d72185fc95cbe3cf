//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mooncart_core::{DeliveryManId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// An order, decorated with the joined customer and courier details its
/// read paths attach.
///
/// `order_number` is coalesced in SQL to `ORD` + the zero-padded id for
/// legacy rows created before numbers were stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub delivery_slot: Option<String>,
    pub delivery_instructions: Option<String>,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub delivery_man_id: Option<DeliveryManId>,
    pub estimated_delivery_time: Option<String>,
    pub cancellation_reason: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub delivery_man_name: Option<String>,
    pub delivery_man_phone: Option<String>,
    pub delivery_man_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    #[sqlx(skip)]
    pub item_count: usize,
}

/// One line of an order.
///
/// `product_name`, `price`, and `total` are snapshots from order time;
/// `product_id` is nullable because orders outlive deleted products.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
    pub product_image: Option<String>,
}

/// Count of orders in one status, for the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Admin dashboard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub today_orders: i64,
    pub today_revenue: Decimal,
    pub status_breakdown: Vec<StatusCount>,
    pub recent_orders: Vec<Order>,
}
