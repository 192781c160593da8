//! Cart domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use tradepost_core::{CartId, ProductCategory, ProductId, UserId};

/// A user's cart. Exactly one exists per user, created lazily on the
/// first add and enforced by a storage-level uniqueness constraint.
#[derive(Debug, Clone, Copy)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

/// A cart line item joined with live product details.
///
/// Product fields are fetched at read time, not snapshotted at add time,
/// so price changes are reflected retroactively.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The product's id.
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image_url: String,
    pub category: ProductCategory,
    /// Aggregated quantity (always >= 1).
    pub quantity: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_wire_shape() {
        let line = CartLine {
            id: ProductId::new(),
            name: "Old bike".to_owned(),
            price: Decimal::new(99_99, 2),
            description: "Runs fine".to_owned(),
            image_url: "/uploads/bike.jpg".to_owned(),
            category: ProductCategory::Vehicle,
            quantity: 5,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert_eq!(json["quantity"], 5);
        assert_eq!(json["category"], "Vehicle");
    }
}
