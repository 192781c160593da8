//! Cart route handlers.
//!
//! Every cart route requires authentication; the cart is addressed purely
//! by the verified caller identity. Input is validated before any storage
//! is touched.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use tradepost_core::ProductId;

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::CartLine;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_id: String,
    pub quantity: i32,
}

/// Cart contents response.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
}

/// `POST /api/cart/add` - add a product, merging with an existing line.
///
/// Adding the same product twice with quantities q1 and q2 yields one line
/// item with quantity q1+q2, never two lines.
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<serde_json::Value>> {
    let product_id = ProductId::parse(&body.product_id)
        .map_err(|_| AppError::Validation("invalid productId".to_owned()))?;

    if body.quantity < 1 {
        return Err(AppError::Validation("invalid quantity".to_owned()));
    }

    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound("product not found".to_owned()));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.add_item(cart.id, product_id, body.quantity).await?;

    Ok(Json(json!({ "success": true })))
}

/// `GET /api/cart` - the caller's cart with live product details.
///
/// A user with no cart yet simply has no items.
pub async fn show(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());

    let items = match carts.find(user.id).await? {
        Some(cart) => carts.items(cart.id).await?,
        None => Vec::new(),
    };

    Ok(Json(CartResponse { items }))
}

/// `DELETE /api/cart/remove/{productId}` - drop a line item.
///
/// Removing a product that was never in the cart is a no-op; a wholly
/// missing cart is 404.
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_owned()))?;

    carts.remove_item(cart.id, product_id).await?;

    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/cart` - empty the cart (checkout; no payment exists here).
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_owned()))?;

    carts.clear(cart.id).await?;

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_shape() {
        let body: AddToCartRequest =
            serde_json::from_str(r#"{"productId":"8c6f4f6e-8f0a-4f2e-9f5b-0a1b2c3d4e5f","quantity":2}"#)
                .unwrap();
        assert_eq!(body.quantity, 2);
        assert!(ProductId::parse(&body.product_id).is_ok());
    }

    #[test]
    fn test_fractional_quantity_is_rejected_by_deserialization() {
        // Quantity must be a positive integer; 1.5 never reaches the handler.
        assert!(serde_json::from_str::<AddToCartRequest>(
            r#"{"productId":"x","quantity":1.5}"#
        )
        .is_err());
    }
}
