//! Authentication error types.

use thiserror::Error;

use ecostore_core::EmailError;

use crate::db::RepositoryError;
use crate::middleware::TokenError;

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination does not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The username or email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Username does not meet requirements.
    #[error("{0}")]
    InvalidUsername(String),

    /// Email failed structural validation.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    /// Bearer token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing or verification failed unexpectedly.
    #[error("hash error: {0}")]
    Hash(String),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
