//! Admin account creation.

use ecostore_core::{Email, Role};

use ecostore_api::db;
use ecostore_api::db::users::UserRepository;
use ecostore_api::services::auth::{hash_password, validate_password};

use super::{CliError, database_url};

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the email is invalid, the password is too weak, or an
/// account with this email already exists.
pub async fn create(username: &str, email: &str, password: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::Invalid(e.to_string()))?;
    validate_password(password)?;

    let url = database_url()?;
    let pool = db::create_pool(&url).await?;
    let users = UserRepository::new(&pool);

    if users.get_by_email(&email).await?.is_some() {
        return Err(CliError::Invalid(format!(
            "An account with email {email} already exists"
        )));
    }

    let password_hash = hash_password(password)?;
    let user = users
        .create(username, &email, &password_hash, Role::Admin)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "admin account created");
    Ok(())
}
