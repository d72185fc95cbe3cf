//! Product request routes.
//!
//! Anyone can ask for a product the store doesn't stock (logged-out
//! requesters leave a contact email); review is admin territory.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::{DeliveryManId, ProductRequestId, RequestStatus, UserId};

use crate::db::RepositoryError;
use crate::db::support::ProductRequestRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{OptionalUser, RequireAdmin, RequireUser};
use crate::models::ProductRequest;
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewRequestInput {
    pub product_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestInput {
    pub id: Option<i32>,
    pub status: Option<String>,
    pub admin_notes: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_man_id: Option<i32>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestsResponse {
    success: bool,
    count: usize,
    requests: Vec<ProductRequest>,
}

#[derive(Debug, Serialize)]
struct RequestResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    request: ProductRequest,
}

/// GET /api/product-requests - list (admin), single, or per-user.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<RequestQuery>,
) -> Result<Response> {
    let repo = ProductRequestRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let id = query
                .id
                .ok_or_else(|| AppError::Validation("Request ID required".to_owned()))?;
            let request = repo
                .get(ProductRequestId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Request not found".to_owned()))?;

            if request.user_id != Some(user.id) && !user.is_admin() {
                return Err(AppError::Forbidden(
                    "Cannot view another user's request".to_owned(),
                ));
            }

            Ok(Json(RequestResponse {
                success: true,
                message: None,
                request,
            })
            .into_response())
        }
        "user" => {
            let target = match query.user_id {
                Some(id) if user.is_admin() => UserId::new(id),
                Some(id) if UserId::new(id) == user.id => user.id,
                Some(_) => {
                    return Err(AppError::Forbidden(
                        "Cannot view another user's requests".to_owned(),
                    ));
                }
                None => user.id,
            };

            let requests = repo.list_for_user(target).await?;

            Ok(Json(RequestsResponse {
                success: true,
                count: requests.len(),
                requests,
            })
            .into_response())
        }
        _ => {
            if !user.is_admin() {
                return Err(AppError::Forbidden("Admin access required".to_owned()));
            }

            let status = query
                .status
                .as_deref()
                .map(str::parse::<RequestStatus>)
                .transpose()
                .map_err(|_| AppError::Validation("Invalid status".to_owned()))?;

            let requests = repo.list(status).await?;

            Ok(Json(RequestsResponse {
                success: true,
                count: requests.len(),
                requests,
            })
            .into_response())
        }
    }
}

/// POST /api/product-requests - submit a request; works logged-out.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    AppJson(input): AppJson<NewRequestInput>,
) -> Result<Response> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::Validation("Product name is required".to_owned()));
    }

    let request = ProductRequestRepository::new(state.pool())
        .create(
            user.map(|u| u.id),
            &input.product_name,
            input.category.as_deref(),
            input.description.as_deref(),
            input.email.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            success: true,
            message: Some("Product request submitted successfully".to_owned()),
            request,
        }),
    )
        .into_response())
}

/// PUT /api/product-requests - review a request (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppJson(input): AppJson<UpdateRequestInput>,
) -> Result<Response> {
    let (Some(id), Some(status)) = (input.id, input.status.as_deref()) else {
        return Err(AppError::Validation(
            "Request ID and status required".to_owned(),
        ));
    };

    let status: RequestStatus = status
        .parse()
        .map_err(|_| AppError::Validation("Invalid status".to_owned()))?;

    ProductRequestRepository::new(state.pool())
        .update_status(
            ProductRequestId::new(id),
            status,
            input.admin_notes.as_deref(),
            input.delivery_time.as_deref(),
            input.delivery_man_id.map(DeliveryManId::new),
            input.rejection_reason.as_deref(),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Request not found".to_owned()),
            other => other.into(),
        })?;

    Ok(Ack::new(format!("Request status updated to {status}")).into_response())
}

/// DELETE /api/product-requests?id= - delete a request (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<RequestQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Request ID required".to_owned()))?;

    let deleted = ProductRequestRepository::new(state.pool())
        .delete(ProductRequestId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Request not found".to_owned()));
    }

    Ok(Ack::new("Request deleted successfully").into_response())
}
