//! HTTP route handlers for the marketplace backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/register                 - Create user, return token
//! POST /auth/login                    - Verify credentials, return token
//! POST /auth/google                   - Verify Google ID token, return token
//!
//! # Products
//! GET    /products                    - Approved products (all, for admins)
//! GET    /products/pending            - Moderation queue (admin)
//! GET    /products/flagged            - Flagged products (admin)
//! GET    /products/user/{userId}      - One user's products
//! GET    /products/{id}               - Fetch one product
//! POST   /products                    - Submit a listing (enters pending)
//! PATCH  /products/{id}               - Update fields (owner/admin); status (admin)
//! DELETE /products/{id}               - Delete (owner/admin)
//! PATCH  /products/{id}/approve       - Approve (admin)
//! POST   /products/{id}/flag          - Append a flag reason
//! DELETE /products/{id}/flag/{idx}    - Resolve one flag (admin)
//!
//! # Comments
//! POST   /products/{id}/comments                      - Add (authenticated)
//! PATCH  /products/{id}/comments/{commentId}          - Edit (author/admin)
//! DELETE /products/{id}/comments/{commentId}          - Delete (author/admin)
//! POST   /products/{id}/comments/{commentId}/react    - Toggle heart
//!
//! # Cart (authenticated)
//! POST   /api/cart/add                - Add item (merges quantities)
//! GET    /api/cart                    - Cart with live product details
//! DELETE /api/cart/remove/{productId} - Remove one line item
//! DELETE /api/cart                    - Clear the cart
//! ```

pub mod auth;
pub mod cart;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
}

/// Create the product routes router (moderation and comments included).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/pending", get(products::list_pending))
        .route("/flagged", get(products::list_flagged))
        .route("/user/{user_id}", get(products::list_by_user))
        .route(
            "/{id}",
            get(products::get)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/{id}/approve", patch(products::approve))
        .route("/{id}/flag", post(products::flag))
        .route("/{id}/flag/{idx}", delete(products::resolve_flag))
        .route("/{id}/comments", post(products::add_comment))
        .route(
            "/{id}/comments/{comment_id}",
            patch(products::edit_comment).delete(products::delete_comment),
        )
        .route("/{id}/comments/{comment_id}/react", post(products::react_comment))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove/{product_id}", delete(cart::remove))
}

/// Assemble all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/api", cart_routes())
}
