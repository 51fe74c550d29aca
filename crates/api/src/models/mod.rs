//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types and wire payloads.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine};
pub use order::{Order, OrderLine, OrderStatus};
pub use product::Product;
pub use user::User;
