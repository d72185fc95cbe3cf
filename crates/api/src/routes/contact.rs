//! Contact message routes. Submission is public; reading is admin only.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use mooncart_core::{ContactMessageId, Email};

use crate::db::support::ContactRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::ContactMessage;
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
    pub unread: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadInput {
    pub id: i32,
}

#[derive(Debug, Serialize)]
struct MessagesResponse {
    success: bool,
    count: usize,
    unread_count: i64,
    messages: Vec<ContactMessage>,
}

/// Single-message envelope; `message` is the record itself, as the
/// frontend expects.
#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: ContactMessage,
}

/// GET /api/contact - list or single-and-mark-read (admin).
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ContactQuery>,
) -> Result<Response> {
    let repo = ContactRepository::new(state.pool());

    match query.action.as_deref().unwrap_or("all") {
        "single" => {
            let id = query
                .id
                .ok_or_else(|| AppError::Validation("Message ID required".to_owned()))?;
            let message = repo
                .get_and_mark_read(ContactMessageId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Message not found".to_owned()))?;

            Ok(Json(MessageResponse {
                success: true,
                message,
            })
            .into_response())
        }
        _ => {
            let (messages, unread_count) = repo.list(query.unread.unwrap_or(false)).await?;

            Ok(Json(MessagesResponse {
                success: true,
                count: messages.len(),
                unread_count,
                messages,
            })
            .into_response())
        }
    }
}

/// POST /api/contact - submit a message (public).
pub async fn submit(
    State(state): State<AppState>,
    AppJson(input): AppJson<ContactInput>,
) -> Result<Response> {
    let (Some(name), Some(email), Some(message)) = (&input.name, &input.email, &input.message)
    else {
        return Err(AppError::Validation(
            "Name, email, and message required".to_owned(),
        ));
    };
    if name.trim().is_empty() || message.trim().is_empty() {
        return Err(AppError::Validation(
            "Name, email, and message required".to_owned(),
        ));
    }

    let email = Email::parse(email)
        .map_err(|_| AppError::Validation("Invalid email format".to_owned()))?;

    ContactRepository::new(state.pool())
        .insert(name, email.as_str(), input.subject.as_deref(), message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Ack::new(
            "Message sent successfully! We will get back to you soon.",
        )),
    )
        .into_response())
}

/// PUT /api/contact?action=read - mark a message read (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ContactQuery>,
    AppJson(input): AppJson<MarkReadInput>,
) -> Result<Response> {
    if query.action.as_deref() != Some("read") {
        return Err(AppError::Validation("Invalid action".to_owned()));
    }

    let updated = ContactRepository::new(state.pool())
        .mark_read(ContactMessageId::new(input.id))
        .await?;
    if !updated {
        return Err(AppError::NotFound("Message not found".to_owned()));
    }

    Ok(Ack::new("Marked as read").into_response())
}

/// DELETE /api/contact?id= - delete a message (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ContactQuery>,
) -> Result<Response> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Message ID required".to_owned()))?;

    let deleted = ContactRepository::new(state.pool())
        .delete(ContactMessageId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Message not found".to_owned()));
    }

    Ok(Ack::new("Message deleted successfully").into_response())
}
