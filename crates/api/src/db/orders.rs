//! Order repository.
//!
//! Order creation writes the order row, its line items, and the stock
//! decrements in one transaction; a partially written order is never
//! observable.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use mooncart_core::pricing::Totals;
use mooncart_core::{DeliveryManId, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderStats, StatusCount};

/// Base select decorating each order with the joined customer and courier
/// details. Legacy rows without a stored number get `ORD` + the zero-padded
/// id; an empty customer name falls back to the account name.
const ORDER_SELECT: &str = "SELECT o.id,
            COALESCE(o.order_number, 'ORD' || LPAD(o.id::TEXT, 8, '0')) AS order_number,
            o.user_id,
            COALESCE(NULLIF(o.customer_name, ''), u.name, o.customer_name) AS customer_name,
            o.email, o.phone, o.address, o.city, o.zip_code,
            o.delivery_slot, o.delivery_instructions, o.payment_method,
            o.subtotal, o.tax, o.shipping, o.total, o.status,
            o.delivery_man_id, o.estimated_delivery_time, o.cancellation_reason,
            u.name AS user_name, u.email AS user_email,
            dm.name AS delivery_man_name, dm.phone AS delivery_man_phone,
            dm.profile_image AS delivery_man_image,
            o.created_at, o.updated_at
     FROM orders o
     LEFT JOIN users u ON o.user_id = u.id
     LEFT JOIN delivery_men dm ON o.delivery_man_id = dm.id";

/// Checkout fields for creating an order. Required fields are enforced at
/// the route layer.
#[derive(Debug, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: Option<String>,
    pub delivery_slot: Option<String>,
    pub delivery_instructions: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// One line of an incoming order.
///
/// Clients send `product_id` as a number or a string (or not at all for
/// off-catalog lines), and name the product under either `product_name` or
/// `name`.
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Option<serde_json::Value>,
    pub product_name: Option<String>,
    pub name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItemInput {
    /// The numeric product reference, if one can be resolved.
    #[must_use]
    pub fn resolved_product_id(&self) -> Option<i32> {
        match &self.product_id {
            Some(serde_json::Value::Number(n)) => {
                n.as_i64().and_then(|v| i32::try_from(v).ok())
            }
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// The snapshot name for the line item.
    #[must_use]
    pub fn resolved_name(&self) -> &str {
        self.product_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown Product")
    }
}

/// Generate an order number: `ORD`, the current date, and a 6-character
/// random suffix. High-entropy enough that collisions under concurrent
/// checkout are not a practical concern.
#[must_use]
pub fn generate_order_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD{}{}", Utc::now().format("%Y%m%d"), suffix)
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first, optionally filtered by status, with the
    /// matching total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let (mut orders, total) = if let Some(status) = status {
            let orders = sqlx::query_as::<_, Order>(&format!(
                "{ORDER_SELECT}
                 WHERE o.status = $1
                 ORDER BY o.created_at DESC
                 LIMIT $2 OFFSET $3"
            ))
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
                .bind(status)
                .fetch_one(self.pool)
                .await?;

            (orders, total)
        } else {
            let orders = sqlx::query_as::<_, Order>(&format!(
                "{ORDER_SELECT}
                 ORDER BY o.created_at DESC
                 LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                .fetch_one(self.pool)
                .await?;

            (orders, total)
        };

        self.attach_items(&mut orders).await?;
        Ok((orders, total))
    }

    /// Get one order by numeric id or order number, with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, ident: &str) -> Result<Option<Order>, RepositoryError> {
        let numeric_id: Option<i32> = ident.parse().ok();

        let order = sqlx::query_as::<_, Order>(&format!(
            "{ORDER_SELECT}
             WHERE o.id = COALESCE($1, -1) OR o.order_number = $2"
        ))
        .bind(numeric_id)
        .bind(ident)
        .fetch_optional(self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        self.attach_items(std::slice::from_mut(&mut order)).await?;
        Ok(Some(order))
    }

    /// A user's orders, newest first, with items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "{ORDER_SELECT}
             WHERE o.user_id = $1
             ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// Create an order with its line items, decrementing stock for every
    /// resolvable product reference, all in one transaction.
    ///
    /// Totals are computed by the caller through the shared pricing
    /// calculator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back and nothing is written.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &NewOrder,
        totals: &Totals,
    ) -> Result<Order, RepositoryError> {
        let order_number = generate_order_number();

        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders
                 (order_number, user_id, customer_name, email, phone,
                  address, city, zip_code, delivery_slot, delivery_instructions,
                  payment_method, subtotal, tax, shipping, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     COALESCE($11, 'card'), $12, $13, $14, $15)
             RETURNING id",
        )
        .bind(&order_number)
        .bind(user_id)
        .bind(&input.customer_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.zip_code)
        .bind(&input.delivery_slot)
        .bind(&input.delivery_instructions)
        .bind(&input.payment_method)
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.shipping)
        .bind(totals.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            let line_total = item.price * Decimal::from(item.quantity);
            let product_id = item.resolved_product_id();

            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, product_name, price, quantity, total)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(item.resolved_name())
            .bind(item.price)
            .bind(item.quantity)
            .bind(line_total)
            .execute(&mut *tx)
            .await?;

            if let Some(product_id) = product_id {
                sqlx::query(
                    "UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(item.quantity)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get(&order_id.to_string())
            .await?
            .ok_or_else(|| RepositoryError::DataCorruption("created order vanished".to_owned()))
    }

    /// Update an order's status, identified by numeric id or order number.
    ///
    /// Entering `cancelled` stores the optional reason and clears the
    /// courier assignment and delivery estimate; leaving it clears the
    /// reason.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order matches.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        ident: &str,
        status: OrderStatus,
        cancellation_reason: Option<&str>,
        delivery_man_id: Option<DeliveryManId>,
        estimated_delivery_time: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let numeric_id: Option<i32> = ident.parse().ok();

        let result = if status == OrderStatus::Cancelled {
            sqlx::query(
                "UPDATE orders
                 SET status = $1,
                     cancellation_reason = COALESCE($2, cancellation_reason),
                     delivery_man_id = NULL,
                     estimated_delivery_time = NULL,
                     updated_at = NOW()
                 WHERE id = COALESCE($3, -1) OR order_number = $4",
            )
            .bind(status)
            .bind(cancellation_reason)
            .bind(numeric_id)
            .bind(ident)
            .execute(self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE orders
                 SET status = $1,
                     cancellation_reason = NULL,
                     delivery_man_id = COALESCE($2, delivery_man_id),
                     estimated_delivery_time = COALESCE($3, estimated_delivery_time),
                     updated_at = NOW()
                 WHERE id = COALESCE($4, -1) OR order_number = $5",
            )
            .bind(status)
            .bind(delivery_man_id)
            .bind(estimated_delivery_time)
            .bind(numeric_id)
            .bind(ident)
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Dashboard statistics: totals, per-status breakdown, today's volume,
    /// and the five most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let status_breakdown = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let total_revenue: Option<Decimal> =
            sqlx::query_scalar("SELECT SUM(total) FROM orders WHERE status <> 'cancelled'")
                .fetch_one(self.pool)
                .await?;

        let today_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at::DATE = CURRENT_DATE")
                .fetch_one(self.pool)
                .await?;

        let today_revenue: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(total) FROM orders
             WHERE created_at::DATE = CURRENT_DATE AND status <> 'cancelled'",
        )
        .fetch_one(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, Order>(&format!(
            "{ORDER_SELECT}
             ORDER BY o.created_at DESC
             LIMIT 5"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(OrderStats {
            total_orders,
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
            today_orders,
            today_revenue: today_revenue.unwrap_or(Decimal::ZERO),
            status_breakdown,
            recent_orders,
        })
    }

    /// Attach line items (with live product images) and item counts to a
    /// batch of orders.
    async fn attach_items(&self, orders: &mut [Order]) -> Result<(), RepositoryError> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT oi.*, p.image AS product_image
             FROM order_items oi
             LEFT JOIN products p ON oi.product_id = p.id
             WHERE oi.order_id = ANY($1)
             ORDER BY oi.id ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        for order in orders.iter_mut() {
            order.items = items
                .iter()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect();
            order.item_count = order.items.len();
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_order_number_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), "ORD".len() + 8 + 6);
        assert!(number.starts_with("ORD"));
        assert!(
            number
                .chars()
                .skip(3)
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_generate_order_number_entropy() {
        // Two consecutive numbers on the same day must differ in suffix.
        assert_ne!(generate_order_number(), generate_order_number());
    }

    #[test]
    fn test_item_input_product_id_number_or_string() {
        let from_number: OrderItemInput =
            serde_json::from_str(r#"{"product_id": 7, "price": "10", "quantity": 1}"#).unwrap();
        assert_eq!(from_number.resolved_product_id(), Some(7));

        let from_string: OrderItemInput =
            serde_json::from_str(r#"{"product_id": "12", "price": "10", "quantity": 1}"#).unwrap();
        assert_eq!(from_string.resolved_product_id(), Some(12));

        let garbage: OrderItemInput =
            serde_json::from_str(r#"{"product_id": "promo-sku", "price": "10", "quantity": 1}"#)
                .unwrap();
        assert_eq!(garbage.resolved_product_id(), None);

        let absent: OrderItemInput =
            serde_json::from_str(r#"{"price": "10", "quantity": 1}"#).unwrap();
        assert_eq!(absent.resolved_product_id(), None);
    }

    #[test]
    fn test_item_input_name_fallbacks() {
        let named: OrderItemInput =
            serde_json::from_str(r#"{"name": "Mangoes", "price": "10", "quantity": 1}"#).unwrap();
        assert_eq!(named.resolved_name(), "Mangoes");

        let snapshot: OrderItemInput = serde_json::from_str(
            r#"{"product_name": "Apples", "name": "ignored", "price": "10", "quantity": 1}"#,
        )
        .unwrap();
        assert_eq!(snapshot.resolved_name(), "Apples");

        let anonymous: OrderItemInput =
            serde_json::from_str(r#"{"price": "10", "quantity": 1}"#).unwrap();
        assert_eq!(anonymous.resolved_name(), "Unknown Product");
    }
}
