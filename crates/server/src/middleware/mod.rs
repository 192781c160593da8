//! HTTP middleware and extractors.

pub mod auth;

pub use auth::{AuthUser, CurrentUser, OptionalUser};
