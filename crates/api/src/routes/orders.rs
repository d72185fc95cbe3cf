//! Order routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::pricing::{self, LineItem};
use mooncart_core::{DeliveryManId, OrderStatus, UserId};

use crate::db::orders::{NewOrder, OrderRepository};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::{Order, OrderStats};
use crate::routes::Ack;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub action: Option<String>,
    pub id: Option<String>,
    pub user_id: Option<i32>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    /// Numeric order id or order number; clients send either type.
    pub id: Option<serde_json::Value>,
    pub status: Option<String>,
    pub cancellation_reason: Option<String>,
    pub delivery_man_id: Option<i32>,
    pub estimated_delivery_time: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrdersResponse {
    success: bool,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<i64>,
    orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
struct OrderResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    order: Order,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    success: bool,
    stats: OrderStats,
}

/// GET /api/orders - list (admin), single, per-user, or stats (admin).
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<OrderQuery>,
) -> Result<Response> {
    let repo = OrderRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let ident = query
                .id
                .ok_or_else(|| AppError::Validation("Order ID required".to_owned()))?;
            let order = repo
                .get(&ident)
                .await?
                .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

            if order.user_id != user.id && !user.is_admin() {
                return Err(AppError::Forbidden(
                    "Cannot view another user's order".to_owned(),
                ));
            }

            Ok(Json(OrderResponse {
                success: true,
                message: None,
                order,
            })
            .into_response())
        }
        "user" => {
            // Admins may inspect any user's history; customers only their own.
            let target = match query.user_id {
                Some(id) if user.is_admin() => UserId::new(id),
                Some(id) if UserId::new(id) == user.id => user.id,
                Some(_) => {
                    return Err(AppError::Forbidden(
                        "Cannot view another user's orders".to_owned(),
                    ));
                }
                None => user.id,
            };

            let orders = repo.list_for_user(target).await?;

            Ok(Json(OrdersResponse {
                success: true,
                count: orders.len(),
                total: None,
                orders,
            })
            .into_response())
        }
        "stats" => {
            if !user.is_admin() {
                return Err(AppError::Forbidden("Admin access required".to_owned()));
            }

            let stats = repo.stats().await?;
            Ok(Json(StatsResponse {
                success: true,
                stats,
            })
            .into_response())
        }
        _ => {
            if !user.is_admin() {
                return Err(AppError::Forbidden("Admin access required".to_owned()));
            }

            let status = parse_status(query.status.as_deref())?;
            let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(0);
            let offset = query.offset.unwrap_or(0).max(0);

            let (orders, total) = repo.list(status, limit, offset).await?;

            Ok(Json(OrdersResponse {
                success: true,
                count: orders.len(),
                total: Some(total),
                orders,
            })
            .into_response())
        }
    }
}

/// POST /api/orders - place an order from an item list.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(input): AppJson<NewOrder>,
) -> Result<Response> {
    for (value, field) in [
        (&input.customer_name, "customer_name"),
        (&input.email, "email"),
        (&input.phone, "phone"),
        (&input.address, "address"),
        (&input.city, "city"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    if input.items.is_empty() {
        return Err(AppError::Validation(
            "Order must have at least one item".to_owned(),
        ));
    }
    if input.items.iter().any(|item| item.quantity < 1) {
        return Err(AppError::Validation(
            "Item quantity must be at least 1".to_owned(),
        ));
    }

    let lines: Vec<LineItem> = input
        .items
        .iter()
        .map(|item| LineItem::new(item.price, item.quantity))
        .collect();
    let totals = pricing::totals(&lines);

    let order = OrderRepository::new(state.pool())
        .create(user.id, &input, &totals)
        .await?;

    tracing::info!(order_number = %order.order_number, total = %order.total, "order placed");

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            message: Some("Order placed successfully".to_owned()),
            order,
        }),
    )
        .into_response())
}

/// PUT /api/orders?action=status - admin status transition.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<OrderQuery>,
    AppJson(input): AppJson<StatusUpdateInput>,
) -> Result<Response> {
    if query.action.as_deref() != Some("status") {
        return Err(AppError::Validation("Invalid action".to_owned()));
    }

    let ident = ident_from(input.id.as_ref())
        .ok_or_else(|| AppError::Validation("Order ID and status required".to_owned()))?;
    let status: OrderStatus = input
        .status
        .as_deref()
        .ok_or_else(|| AppError::Validation("Order ID and status required".to_owned()))?
        .parse()
        .map_err(|_| AppError::Validation("Invalid status".to_owned()))?;

    let repo = OrderRepository::new(state.pool());

    let current = repo
        .get(&ident)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if status == OrderStatus::Cancelled && !current.status.is_cancellable() {
        return Err(AppError::Validation(format!(
            "Cannot cancel an order that is already {}",
            current.status
        )));
    }

    repo.update_status(
        &ident,
        status,
        input.cancellation_reason.as_deref(),
        input.delivery_man_id.map(DeliveryManId::new),
        input.estimated_delivery_time.as_deref(),
    )
    .await?;

    tracing::info!(order = %ident, status = %status, "order status updated");

    Ok(Ack::new(format!("Order status updated to {status}")).into_response())
}

/// Accept the order identifier as a JSON number or string.
fn ident_from(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Parse an optional status filter.
fn parse_status(status: Option<&str>) -> Result<Option<OrderStatus>> {
    status
        .map(str::parse)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid status".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_accepts_number_and_string() {
        assert_eq!(
            ident_from(Some(&serde_json::json!(42))).as_deref(),
            Some("42")
        );
        assert_eq!(
            ident_from(Some(&serde_json::json!("ORD20260801ABCDEF"))).as_deref(),
            Some("ORD20260801ABCDEF")
        );
        assert_eq!(ident_from(Some(&serde_json::json!(""))), None);
        assert_eq!(ident_from(None), None);
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some("delivered")).unwrap(),
            Some(OrderStatus::Delivered)
        );
        assert!(parse_status(Some("shipped")).is_err());
    }
}
