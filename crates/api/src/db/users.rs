//! User repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use mooncart_core::{Email, UserId, UserRole};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Internal row carrying the password hash; never serialized.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    id: UserId,
    name: String,
    email: Email,
    phone: Option<String>,
    role: UserRole,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    password_hash: String,
}

impl UserAuthRow {
    fn split(self) -> (User, String) {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role,
            avatar: self.avatar,
            created_at: self.created_at,
        };
        (user, self.password_hash)
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, role, avatar, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_login(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            "SELECT id, name, email, phone, role, avatar, created_at, password_hash
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserAuthRow::split))
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        phone: Option<&str>,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, phone, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        Ok(user)
    }

    /// List all users, optionally filtered by role, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, RepositoryError> {
        let users = if let Some(role) = role {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC"
            ))
            .bind(role)
            .fetch_all(self.pool)
            .await?
        } else {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
            ))
            .fetch_all(self.pool)
            .await?
        };

        Ok(users)
    }

    /// Partially update a profile. Only supplied fields change; the password
    /// arrives pre-hashed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        phone: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
        if let Some(name) = name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(phone) = phone {
            qb.push(", phone = ").push_bind(phone);
        }
        if let Some(hash) = password_hash {
            qb.push(", password_hash = ").push_bind(hash);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
