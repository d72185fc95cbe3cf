//! User domain types and the session identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mooncart_core::{Email, UserId, UserRole};

/// A user profile as returned by the API.
///
/// The password hash never appears here; it lives only in the repository's
/// internal row type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The identity stored in the server-side session after login.
///
/// Handlers derive the acting user from this, never from ids supplied in
/// request payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this session belongs to an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Keys used for session storage.
pub mod session_keys {
    /// The logged-in user (`CurrentUser`).
    pub const CURRENT_USER: &str = "current_user";
}
