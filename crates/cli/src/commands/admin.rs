//! Admin user management commands.

use thiserror::Error;

use mooncart_api::db;
use mooncart_api::services::AuthService;
use mooncart_core::UserRole;

/// Errors from admin commands.
#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Auth(#[from] mooncart_api::services::AuthError),
}

/// Create an admin user.
///
/// # Errors
///
/// Returns `AdminCommandError` if the database is unreachable, the email
/// is invalid or taken, or the password is too weak.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), AdminCommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MOONCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminCommandError::MissingEnvVar("MOONCART_DATABASE_URL"))?;

    let pool = db::create_pool(&secrecy::SecretString::from(database_url)).await?;

    let user = AuthService::new(&pool)
        .register(name, email, password, None, UserRole::Admin)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "admin user created");
    Ok(())
}
