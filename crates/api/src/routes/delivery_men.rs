//! Delivery staff routes (admin only).

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::DeliveryManId;

use crate::db::RepositoryError;
use crate::db::delivery_men::{
    DeliveryManChanges, DeliveryManRepository, NewDeliveryMan, Removal,
};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::DeliveryMan;
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeliveryManQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryManInput {
    pub id: i32,
    #[serde(flatten)]
    pub changes: DeliveryManChanges,
}

#[derive(Debug, Serialize)]
struct DeliveryMenResponse {
    success: bool,
    count: usize,
    delivery_men: Vec<DeliveryMan>,
}

#[derive(Debug, Serialize)]
struct DeliveryManResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    delivery_man: DeliveryMan,
}

/// Conflicts on the national id are client errors, not 409s, matching the
/// admin frontend's expectations.
fn map_errors(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Delivery man not found".to_owned()),
        RepositoryError::Conflict(_) => AppError::Validation("NID already exists".to_owned()),
        other => other.into(),
    }
}

/// GET /api/delivery-men - list or single (admin).
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<DeliveryManQuery>,
) -> Result<Response> {
    let repo = DeliveryManRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let id = query
                .id
                .ok_or_else(|| AppError::Validation("ID required".to_owned()))?;
            let delivery_man = repo
                .get(DeliveryManId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Delivery man not found".to_owned()))?;

            Ok(Json(DeliveryManResponse {
                success: true,
                message: None,
                delivery_man,
            })
            .into_response())
        }
        _ => {
            let staff = repo.list(query.active_only.unwrap_or(false)).await?;

            Ok(Json(DeliveryMenResponse {
                success: true,
                count: staff.len(),
                delivery_men: staff,
            })
            .into_response())
        }
    }
}

/// POST /api/delivery-men - register a staff member (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<NewDeliveryMan>,
) -> Result<Response> {
    for (value, field) in [
        (&input.name, "name"),
        (&input.phone, "phone"),
        (&input.nid, "nid"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let delivery_man = DeliveryManRepository::new(state.pool())
        .create(&input)
        .await
        .map_err(map_errors)?;

    Ok((
        StatusCode::CREATED,
        Json(DeliveryManResponse {
            success: true,
            message: Some("Delivery man created successfully".to_owned()),
            delivery_man,
        }),
    )
        .into_response())
}

/// PUT /api/delivery-men - partial update (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<UpdateDeliveryManInput>,
) -> Result<Response> {
    if input.changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_owned()));
    }

    let delivery_man = DeliveryManRepository::new(state.pool())
        .update(DeliveryManId::new(input.id), &input.changes)
        .await
        .map_err(map_errors)?;

    Ok(Json(DeliveryManResponse {
        success: true,
        message: Some("Delivery man updated successfully".to_owned()),
        delivery_man,
    })
    .into_response())
}

/// DELETE /api/delivery-men?id= - delete, degrading to deactivation when
/// orders reference the staff member (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<DeliveryManQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("ID required".to_owned()))?;

    let removal = DeliveryManRepository::new(state.pool())
        .remove(DeliveryManId::new(id))
        .await
        .map_err(map_errors)?;

    let message = match removal {
        Removal::Deleted => "Delivery man deleted successfully",
        Removal::Deactivated => "Delivery man deactivated (has assigned orders)",
    };

    Ok(Ack::new(message).into_response())
}
