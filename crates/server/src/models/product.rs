//! Product domain types: listings, comments, flags.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tradepost_core::{CommentId, ModerationStatus, ProductCategory, ProductId, UserId};

/// A product listing with its comments and flag reasons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    /// Opaque reference to the listing image; never inspected server-side.
    pub image_url: String,
    pub category: ProductCategory,
    /// Creator, when the submission was authenticated.
    #[serde(rename = "userId")]
    pub owner_id: Option<UserId>,
    /// Moderation lifecycle state.
    pub status: ModerationStatus,
    /// Derived: `status == approved`.
    pub approved: bool,
    /// Derived: at least one unresolved flag reason.
    pub flagged: bool,
    /// Unresolved flag reasons, oldest first. Multiple flags accumulate
    /// and are not deduplicated.
    pub flag_reasons: Vec<String>,
    /// Comments, newest first.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Assemble a product from its stored parts, computing the derived
    /// `approved` and `flagged` fields so they cannot disagree with their
    /// sources.
    #[must_use]
    pub fn assemble(
        row: ProductParts,
        flag_reasons: Vec<String>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            image_url: row.image_url,
            category: row.category,
            owner_id: row.owner_id,
            status: row.status,
            approved: row.status.is_approved(),
            flagged: !flag_reasons.is_empty(),
            flag_reasons,
            comments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The stored (non-derived) fields of a product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductParts {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image_url: String,
    pub category: ProductCategory,
    pub owner_id: Option<UserId>,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment ID.
    pub id: CommentId,
    /// Author's user id, taken from the verified session token.
    pub user_id: UserId,
    /// Author display name, denormalized at creation time.
    pub username: String,
    /// The comment text.
    pub comment: String,
    /// Derived: `liked_by.len()`.
    pub hearts: usize,
    /// Users who have hearted this comment (at most once each).
    pub liked_by: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Assemble a comment from its stored row and the set of users who
    /// hearted it; `hearts` is derived from that set.
    #[must_use]
    pub fn assemble(row: CommentParts, liked_by: Vec<UserId>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            comment: row.comment,
            hearts: liked_by.len(),
            liked_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The stored fields of a comment row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentParts {
    pub id: CommentId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub username: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parts(status: ModerationStatus) -> ProductParts {
        ProductParts {
            id: ProductId::new(),
            name: "Old bike".to_owned(),
            price: Decimal::new(12_50, 2),
            description: "Runs fine".to_owned(),
            image_url: "/uploads/bike.jpg".to_owned(),
            category: ProductCategory::Vehicle,
            owner_id: Some(UserId::new()),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment_parts() -> CommentParts {
        CommentParts {
            id: CommentId::new(),
            product_id: ProductId::new(),
            user_id: UserId::new(),
            username: "alice".to_owned(),
            comment: "nice".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approved_is_derived_from_status() {
        assert!(!Product::assemble(parts(ModerationStatus::Pending), vec![], vec![]).approved);
        assert!(!Product::assemble(parts(ModerationStatus::Denied), vec![], vec![]).approved);
        assert!(Product::assemble(parts(ModerationStatus::Approved), vec![], vec![]).approved);
    }

    #[test]
    fn test_flagged_iff_reasons_nonempty() {
        let clean = Product::assemble(parts(ModerationStatus::Approved), vec![], vec![]);
        assert!(!clean.flagged);

        let flagged = Product::assemble(
            parts(ModerationStatus::Approved),
            vec!["fake".to_owned(), "fake".to_owned()],
            vec![],
        );
        assert!(flagged.flagged);
        // Duplicates accumulate, not deduplicated.
        assert_eq!(flagged.flag_reasons.len(), 2);
    }

    #[test]
    fn test_hearts_equals_liked_by_len() {
        let nobody = Comment::assemble(comment_parts(), vec![]);
        assert_eq!(nobody.hearts, 0);

        let likes = vec![UserId::new(), UserId::new(), UserId::new()];
        let loved = Comment::assemble(comment_parts(), likes);
        assert_eq!(loved.hearts, 3);
        assert_eq!(loved.hearts, loved.liked_by.len());
    }

    #[test]
    fn test_product_wire_shape() {
        let p = Product::assemble(
            parts(ModerationStatus::Pending),
            vec!["spam".to_owned()],
            vec![Comment::assemble(comment_parts(), vec![])],
        );
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["approved"], false);
        assert_eq!(json["flagged"], true);
        assert_eq!(json["flagReasons"][0], "spam");
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("userId").is_some());
        assert!(json["comments"][0].get("likedBy").is_some());
    }
}
