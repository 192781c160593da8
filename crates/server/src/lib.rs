//! Tradepost Server - marketplace REST backend.
//!
//! This crate provides the backend functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `PostgreSQL` for users, products, comments, flags, and carts
//! - Stateless JWT bearer sessions (no server-side session storage)
//! - Authorization decisions centralized in `tradepost_core::policy`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
