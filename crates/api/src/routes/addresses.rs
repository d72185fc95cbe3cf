//! Address routes. All operations are scoped to the logged-in user.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::AddressId;

use crate::db::RepositoryError;
use crate::db::addresses::{AddressChanges, AddressRepository, NewAddress};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireUser;
use crate::models::Address;
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAddressInput {
    pub id: i32,
    #[serde(flatten)]
    pub changes: AddressChanges,
}

#[derive(Debug, Serialize)]
struct AddressesResponse {
    success: bool,
    count: usize,
    addresses: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct AddressResponse {
    success: bool,
    message: String,
    address: Address,
}

fn map_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Address not found".to_owned()),
        other => other.into(),
    }
}

/// GET /api/addresses - the current user's addresses, default first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;

    Ok(Json(AddressesResponse {
        success: true,
        count: addresses.len(),
        addresses,
    })
    .into_response())
}

/// POST /api/addresses - create an address; the user's first becomes the
/// default automatically.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(input): AppJson<NewAddress>,
) -> Result<Response> {
    if input.address_line.trim().is_empty() || input.city.trim().is_empty() {
        return Err(AppError::Validation("Address and city required".to_owned()));
    }

    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddressResponse {
            success: true,
            message: "Address added successfully".to_owned(),
            address,
        }),
    )
        .into_response())
}

/// PUT /api/addresses - partial update, or `?action=default` to switch the
/// default.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<AddressQuery>,
    AppJson(input): AppJson<UpdateAddressInput>,
) -> Result<Response> {
    let repo = AddressRepository::new(state.pool());
    let id = AddressId::new(input.id);

    if query.action.as_deref() == Some("default") {
        repo.set_default(user.id, id).await.map_err(map_not_found)?;
        return Ok(Ack::new("Default address updated").into_response());
    }

    if input.changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_owned()));
    }

    repo.update(user.id, id, &input.changes)
        .await
        .map_err(map_not_found)?;

    Ok(Ack::new("Address updated successfully").into_response())
}

/// DELETE /api/addresses?id= - delete; removing the default promotes the
/// most recently created remaining address.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<AddressQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Address ID required".to_owned()))?;

    AddressRepository::new(state.pool())
        .delete(user.id, AddressId::new(id))
        .await
        .map_err(map_not_found)?;

    Ok(Ack::new("Address deleted successfully").into_response())
}
