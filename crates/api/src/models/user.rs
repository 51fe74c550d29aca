//! User domain types.

use chrono::{DateTime, Utc};

use ecostore_core::{Email, Role, UserId};

/// A store account (domain type).
///
/// The password hash lives in a separate table and never leaves the
/// repository layer except for verification.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique display name used at login.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// Authorization role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
