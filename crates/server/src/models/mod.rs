//! API-facing domain models.
//!
//! All models serialize with camelCase field names, the wire contract the
//! marketplace SPA has always used. Derived fields (`approved`, `flagged`,
//! `hearts`) are computed at assembly time and never stored, so the
//! invariants `approved == (status == approved)`,
//! `flagged == !flagReasons.is_empty()` and `hearts == likedBy.len()` hold
//! by construction.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine};
pub use product::{Comment, Product};
pub use user::User;
