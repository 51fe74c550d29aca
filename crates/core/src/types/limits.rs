//! Validation bounds shared by the API and CLI seeding.

use rust_decimal::Decimal;

/// Maximum product name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum product description length.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Minimum product price (one cent).
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum product price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Stock at or below this (and above zero) counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Minimum quantity for a cart line.
pub const MIN_QUANTITY: i32 = 1;

/// Maximum quantity for a cart line.
pub const MAX_QUANTITY: i32 = 99;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;
