//! User routes: login, registration, profiles.
//!
//! Login and registration establish a server-side session; from then on the
//! acting user comes from the session cookie, never from ids in payloads.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use mooncart_core::{UserId, UserRole};

use crate::db::addresses::AddressRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::{Address, CurrentUser, User};
use crate::routes::Ack;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub action: Option<String>,
    pub id: Option<i32>,
    pub role: Option<String>,
}

/// Body for login / registration. Each action validates the fields it
/// needs.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    success: bool,
    message: String,
    user: User,
}

#[derive(Debug, Serialize)]
struct ProfileBody {
    #[serde(flatten)]
    user: User,
    addresses: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    success: bool,
    user: ProfileBody,
}

#[derive(Debug, Serialize)]
struct UsersResponse {
    success: bool,
    count: usize,
    users: Vec<User>,
}

/// GET /api/users - profile and admin listing.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<UserQuery>,
) -> Result<Response> {
    match query.action.as_deref() {
        Some("profile") => profile(&state, &user, query.id).await,
        Some("all") => list(&state, &user, query.role.as_deref()).await,
        _ => Err(AppError::Validation("Invalid action".to_owned())),
    }
}

/// POST /api/users - login, register, logout.
///
/// The body is optional (logout sends none), so the JSON is parsed by hand
/// rather than through the `AppJson` extractor.
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<UserQuery>,
    body: axum::body::Bytes,
) -> Result<Response> {
    let input: CredentialsInput = if body.is_empty() {
        CredentialsInput::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
    };

    match query.action.as_deref() {
        Some("login") => login(&state, &session, &input).await,
        Some("register") => register(&state, &session, &input).await,
        Some("logout") => logout(&session).await,
        _ => Err(AppError::Validation("Invalid action".to_owned())),
    }
}

/// PUT /api/users?action=update - partial profile update.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<UserQuery>,
    AppJson(input): AppJson<UpdateProfileInput>,
) -> Result<Response> {
    if query.action.as_deref() != Some("update") {
        return Err(AppError::Validation("Invalid action".to_owned()));
    }

    // Admins may edit any profile; everyone else only their own.
    let target = input.id.map_or(user.id, UserId::new);
    if target != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot update another user's profile".to_owned(),
        ));
    }

    if input.name.is_none() && input.phone.is_none() && input.password.is_none() {
        return Err(AppError::Validation("No fields to update".to_owned()));
    }

    AuthService::new(state.pool())
        .update_profile(
            target,
            input.name.as_deref(),
            input.phone.as_deref(),
            input.password.as_deref(),
        )
        .await?;

    Ok(Ack::new("Profile updated successfully").into_response())
}

async fn login(state: &AppState, session: &Session, input: &CredentialsInput) -> Result<Response> {
    let (Some(email), Some(password)) = (&input.email, &input.password) else {
        return Err(AppError::Validation("Email and password required".to_owned()));
    };

    let user = AuthService::new(state.pool()).login(email, password).await?;

    set_current_user(session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(UserResponse {
        success: true,
        message: "Login successful".to_owned(),
        user,
    })
    .into_response())
}

async fn register(
    state: &AppState,
    session: &Session,
    input: &CredentialsInput,
) -> Result<Response> {
    let (Some(name), Some(email), Some(password)) = (&input.name, &input.email, &input.password)
    else {
        return Err(AppError::Validation(
            "Name, email, and password required".to_owned(),
        ));
    };
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Name, email, and password required".to_owned(),
        ));
    }

    let role = match input.role.as_deref() {
        Some(role) => role
            .parse::<UserRole>()
            .map_err(|_| AppError::Validation("Invalid role".to_owned()))?,
        None => UserRole::Customer,
    };
    // Admin accounts come from `mooncart-cli admin create`, never from the
    // public registration endpoint.
    if role == UserRole::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_owned(),
        ));
    }

    let user = AuthService::new(state.pool())
        .register(name, email, password, input.phone.as_deref(), role)
        .await?;

    set_current_user(session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            message: "Registration successful".to_owned(),
            user,
        }),
    )
        .into_response())
}

async fn logout(session: &Session) -> Result<Response> {
    clear_current_user(session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Ack::new("Logged out").into_response())
}

async fn profile(state: &AppState, user: &CurrentUser, id: Option<i32>) -> Result<Response> {
    let target = id.map_or(user.id, UserId::new);
    if target != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's profile".to_owned(),
        ));
    }

    let profile = UserRepository::new(state.pool())
        .get(target)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    let addresses = AddressRepository::new(state.pool()).list(target).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: ProfileBody {
            user: profile,
            addresses,
        },
    })
    .into_response())
}

async fn list(state: &AppState, user: &CurrentUser, role: Option<&str>) -> Result<Response> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_owned()));
    }

    let role = role
        .map(str::parse::<UserRole>)
        .transpose()
        .map_err(|_| AppError::Validation("Invalid role".to_owned()))?;

    let users = UserRepository::new(state.pool()).list(role).await?;

    Ok(Json(UsersResponse {
        success: true,
        count: users.len(),
        users,
    })
    .into_response())
}
