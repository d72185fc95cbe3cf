//! Cart routes.
//!
//! Every mutation responds with the freshly recomputed cart so clients can
//! replace their local state wholesale.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::{ProductId, UserId};

use crate::db::cart::{AddOutcome, CartRepository, UpdateOutcome};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireUser;
use crate::models::Cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub action: Option<String>,
    pub product_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub product_id: i32,
    pub quantity: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartInput {
    pub product_id: i32,
    pub quantity: Option<i32>,
    pub change: Option<i32>,
}

#[derive(Debug, Serialize)]
struct CartResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    cart: Cart,
}

/// GET /api/cart - the current user's cart with totals.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response> {
    Ok(cart_response(&state, user.id, None).await?.into_response())
}

/// POST /api/cart - add a product, merging with an existing row.
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(input): AppJson<AddToCartInput>,
) -> Result<Response> {
    let quantity = input.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let outcome = CartRepository::new(state.pool())
        .add(
            user.id,
            ProductId::new(input.product_id),
            quantity,
            input.category.as_deref(),
        )
        .await?;

    let message = match outcome {
        AddOutcome::Inserted => "Item added to cart",
        AddOutcome::Merged => "Cart updated successfully",
    };

    Ok(cart_response(&state, user.id, Some(message))
        .await?
        .into_response())
}

/// PUT /api/cart - set (`quantity`) or adjust (`change`) a row; zero or
/// below removes it.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(input): AppJson<UpdateCartInput>,
) -> Result<Response> {
    if input.quantity.is_none() && input.change.is_none() {
        return Err(AppError::Validation(
            "Quantity or change value required".to_owned(),
        ));
    }

    let outcome = CartRepository::new(state.pool())
        .update(
            user.id,
            ProductId::new(input.product_id),
            input.quantity,
            input.change,
        )
        .await?;

    let message = match outcome {
        UpdateOutcome::Updated => "Cart updated",
        UpdateOutcome::Removed => "Item removed from cart",
    };

    Ok(cart_response(&state, user.id, Some(message))
        .await?
        .into_response())
}

/// DELETE /api/cart - remove one product (`?product_id=`) or everything
/// (`?action=clear`).
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<CartQuery>,
) -> Result<Response> {
    let repo = CartRepository::new(state.pool());

    if query.action.as_deref() == Some("clear") {
        repo.clear(user.id).await?;

        return Ok(Json(CartResponse {
            success: true,
            message: Some("Cart cleared successfully".to_owned()),
            cart: Cart::empty(),
        })
        .into_response());
    }

    let product_id = query
        .product_id
        .ok_or_else(|| AppError::Validation("Product ID required".to_owned()))?;

    repo.remove(user.id, ProductId::new(product_id)).await?;

    Ok(cart_response(&state, user.id, Some("Item removed from cart"))
        .await?
        .into_response())
}

/// Fetch and price the user's cart for a response.
async fn cart_response(
    state: &AppState,
    user_id: UserId,
    message: Option<&str>,
) -> Result<Json<CartResponse>> {
    let items = CartRepository::new(state.pool()).fetch(user_id).await?;

    Ok(Json(CartResponse {
        success: true,
        message: message.map(str::to_owned),
        cart: Cart::priced(items),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_omitted_when_absent() {
        let with = serde_json::to_value(CartResponse {
            success: true,
            message: Some("Cart updated".to_owned()),
            cart: Cart::empty(),
        })
        .unwrap();
        assert_eq!(with["message"], "Cart updated");

        let without = serde_json::to_value(CartResponse {
            success: true,
            message: None,
            cart: Cart::empty(),
        })
        .unwrap();
        assert!(without.get("message").is_none());
    }
}
