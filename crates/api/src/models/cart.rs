//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mooncart_core::pricing::{self, LineItem, Totals};
use mooncart_core::{CartItemId, ProductId, UserId};

/// One row of a user's cart.
///
/// Carries the denormalized product snapshot taken at add-time;
/// `available_stock` is joined live from the products table so clients can
/// show availability.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub available_stock: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A fully priced cart: items plus the shared totals.
///
/// Every cart mutation returns one of these; clients replace their local
/// state wholesale rather than applying deltas.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    #[serde(rename = "itemCount")]
    pub item_count: i64,
}

impl Cart {
    /// Price a set of cart rows through the shared totals calculator.
    #[must_use]
    pub fn priced(items: Vec<CartItem>) -> Self {
        let lines: Vec<LineItem> = items
            .iter()
            .map(|item| LineItem::new(item.price, item.quantity))
            .collect();
        let totals = pricing::totals(&lines);
        Self::from_parts(items, totals)
    }

    /// An empty cart with zero totals.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Totals::empty())
    }

    fn from_parts(items: Vec<CartItem>, totals: Totals) -> Self {
        Self {
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            item_count: totals.item_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(price: &str, quantity: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(1),
            user_id: UserId::new(1),
            product_id: ProductId::new(1),
            product_name: "Test".to_string(),
            price: price.parse().unwrap(),
            image: None,
            category: None,
            quantity,
            available_stock: Some(10),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_priced_matches_shared_calculator() {
        let cart = Cart::priced(vec![item("1000", 2), item("500", 1)]);
        assert_eq!(cart.subtotal, "2500".parse().unwrap());
        assert_eq!(cart.tax, "250.00".parse().unwrap());
        assert_eq!(cart.shipping, "50".parse().unwrap());
        assert_eq!(cart.total, "2800.00".parse().unwrap());
        assert_eq!(cart.item_count, 3);
    }

    #[test]
    fn test_empty_cart_serializes_item_count_camel_case() {
        let json = serde_json::to_value(Cart::empty()).unwrap();
        assert_eq!(json["itemCount"], 0);
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
