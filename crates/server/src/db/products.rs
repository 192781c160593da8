//! Product repository: listings, comments, hearts, and flags.
//!
//! Flag rows carry stable uuid ids. The wire contract resolves flags by
//! position, so resolution orders flags the same way they are listed
//! (`created_at`, then id), picks the requested position inside a
//! transaction, and deletes by id — a concurrent resolution cannot shift
//! the target between the read and the delete.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use tradepost_core::{
    CommentId, FlagId, ModerationStatus, ProductCategory, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::product::{Comment, CommentParts, Product, ProductParts};

const PRODUCT_COLUMNS: &str =
    "id, name, price, description, image_url, category, owner_id, status, created_at, updated_at";

const COMMENT_COLUMNS: &str =
    "id, product_id, user_id, username, comment, created_at, updated_at";

/// Which moderation states a listing query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductVisibility {
    /// Public view: approved products only.
    ApprovedOnly,
    /// Admin view: everything, regardless of status.
    All,
}

/// A product submission.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub price: Decimal,
    pub description: &'a str,
    pub image_url: &'a str,
    pub category: ProductCategory,
    /// Creator, when the submission was authenticated.
    pub owner_id: Option<UserId>,
}

/// Partial update of a product's own fields. `None` leaves a field as-is.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<ProductCategory>,
    pub status: Option<ModerationStatus>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// List products according to the caller's visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, visibility: ProductVisibility) -> Result<Vec<Product>, RepositoryError> {
        let sql = match visibility {
            ProductVisibility::All => format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id"
            ),
            ProductVisibility::ApprovedOnly => format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE status = 'approved'
                 ORDER BY created_at DESC, id"
            ),
        };
        let rows = sqlx::query_as::<_, ProductParts>(&sql)
            .fetch_all(self.pool)
            .await?;

        self.assemble_many(rows).await
    }

    /// List the moderation queue (`status = 'pending'`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductParts>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE status = 'pending'
             ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble_many(rows).await
    }

    /// List products with at least one unresolved flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_flagged(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductParts>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             WHERE EXISTS (SELECT 1 FROM product_flags f WHERE f.product_id = p.id)
             ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble_many(rows).await
    }

    /// List all products created by `owner`, regardless of approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductParts>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = $1
             ORDER BY created_at DESC, id"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        self.assemble_many(rows).await
    }

    // =========================================================================
    // Single products
    // =========================================================================

    /// Fetch one product with its comments and flags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductParts>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(parts) => Ok(Some(self.assemble_one(parts).await?)),
            None => Ok(None),
        }
    }

    /// Fetch a product's recorded owner.
    ///
    /// Outer `None` means the product does not exist; inner `None` means an
    /// anonymous submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner(
        &self,
        id: ProductId,
    ) -> Result<Option<Option<UserId>>, RepositoryError> {
        let owner = sqlx::query_scalar::<_, Option<UserId>>(
            "SELECT owner_id FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner)
    }

    /// Whether a product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(found)
    }

    /// Create a product. Every submission enters pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: NewProduct<'_>) -> Result<Product, RepositoryError> {
        let parts = sqlx::query_as::<_, ProductParts>(&format!(
            "INSERT INTO products (name, price, description, image_url, category, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.price)
        .bind(new.description)
        .bind(new.image_url)
        .bind(new.category)
        .bind(new.owner_id)
        .fetch_one(self.pool)
        .await?;

        Ok(Product::assemble(parts, Vec::new(), Vec::new()))
    }

    /// Apply a partial update, returning the fresh product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let parts = sqlx::query_as::<_, ProductParts>(&format!(
            "UPDATE products SET
                 name        = COALESCE($2, name),
                 price       = COALESCE($3, price),
                 description = COALESCE($4, description),
                 image_url   = COALESCE($5, image_url),
                 category    = COALESCE($6, category),
                 status      = COALESCE($7, status),
                 updated_at  = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .bind(patch.description.as_deref())
        .bind(patch.image_url.as_deref())
        .bind(patch.category)
        .bind(patch.status)
        .fetch_optional(self.pool)
        .await?;

        match parts {
            Some(parts) => Ok(Some(self.assemble_one(parts).await?)),
            None => Ok(None),
        }
    }

    /// Move a product to a new moderation status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: ProductId,
        status: ModerationStatus,
    ) -> Result<Option<Product>, RepositoryError> {
        self.update(
            id,
            &ProductPatch {
                status: Some(status),
                ..ProductPatch::default()
            },
        )
        .await
    }

    /// Delete a product. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Add a comment. The author identity comes from the verified session
    /// token, never from the request body.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product vanished between
    /// the caller's existence check and the insert.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_comment(
        &self,
        product_id: ProductId,
        user_id: UserId,
        username: &str,
        text: &str,
    ) -> Result<Comment, RepositoryError> {
        let parts = sqlx::query_as::<_, CommentParts>(&format!(
            "INSERT INTO product_comments (product_id, user_id, username, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(username)
        .bind(text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(Comment::assemble(parts, Vec::new()))
    }

    /// Fetch one comment's stored fields, scoped to its product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_comment(
        &self,
        product_id: ProductId,
        comment_id: CommentId,
    ) -> Result<Option<CommentParts>, RepositoryError> {
        let row = sqlx::query_as::<_, CommentParts>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM product_comments
             WHERE id = $1 AND product_id = $2"
        ))
        .bind(comment_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Replace a comment's text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_comment(
        &self,
        comment_id: CommentId,
        text: &str,
    ) -> Result<Comment, RepositoryError> {
        let parts = sqlx::query_as::<_, CommentParts>(&format!(
            "UPDATE product_comments SET comment = $2, updated_at = now()
             WHERE id = $1
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .bind(text)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let liked_by = self.comment_likes(comment_id).await?;
        Ok(Comment::assemble(parts, liked_by))
    }

    /// Delete a comment. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_comments WHERE id = $1")
            .bind(comment_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Toggle `user_id`'s heart on a comment, idempotently per user.
    ///
    /// The toggle is decided by the primary key on `comment_likes`: an
    /// insert that conflicts means the heart existed, so it is removed.
    /// No read-modify-write of a counter is involved; the count is always
    /// derived from the rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_heart(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<Comment, RepositoryError> {
        let inserted = sqlx::query(
            "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        if inserted.rows_affected() == 0 {
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;
        }

        let parts = sqlx::query_as::<_, CommentParts>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM product_comments WHERE id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let liked_by = self.comment_likes(comment_id).await?;
        Ok(Comment::assemble(parts, liked_by))
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Append a flag reason. Reasons accumulate and are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_flag(
        &self,
        product_id: ProductId,
        reason: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO product_flags (product_id, reason) VALUES ($1, $2)")
            .bind(product_id)
            .bind(reason)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::Database(e)
            })?;

        Ok(())
    }

    /// Remove the flag at `index` in listing order. Returns `false` if the
    /// index is out of range.
    ///
    /// Runs in a transaction: the positional pick and the delete-by-id are
    /// atomic, so a concurrent resolution cannot shift the target.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn resolve_flag(
        &self,
        product_id: ProductId,
        index: usize,
    ) -> Result<bool, RepositoryError> {
        // An index that does not fit i64 cannot address a real row.
        let Ok(offset) = i64::try_from(index) else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;

        let flag_id = sqlx::query_scalar::<_, FlagId>(
            "SELECT id FROM product_flags WHERE product_id = $1
             ORDER BY created_at, id
             OFFSET $2 LIMIT 1
             FOR UPDATE",
        )
        .bind(product_id)
        .bind(offset)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(flag_id) = flag_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM product_flags WHERE id = $1")
            .bind(flag_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    async fn assemble_one(&self, parts: ProductParts) -> Result<Product, RepositoryError> {
        let mut products = self.assemble_many(vec![parts]).await?;
        products
            .pop()
            .ok_or_else(|| RepositoryError::DataCorruption("assembly dropped a product".to_owned()))
    }

    /// Attach comments (with hearts) and flag reasons to a batch of rows.
    async fn assemble_many(
        &self,
        rows: Vec<ProductParts>,
    ) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id.as_uuid()).collect();

        let mut flags_by_product = self.load_flags(&ids).await?;
        let mut comments_by_product = self.load_comments(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|parts| {
                let flags = flags_by_product.remove(&parts.id.as_uuid()).unwrap_or_default();
                let comments = comments_by_product
                    .remove(&parts.id.as_uuid())
                    .unwrap_or_default();
                Product::assemble(parts, flags, comments)
            })
            .collect())
    }

    /// Flag reasons per product, in resolution order (oldest first).
    async fn load_flags(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>, RepositoryError> {
        let rows = sqlx::query_as::<_, FlagRow>(
            "SELECT product_id, reason FROM product_flags
             WHERE product_id = ANY($1)
             ORDER BY created_at, id",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.product_id.as_uuid())
                .or_default()
                .push(row.reason);
        }
        Ok(grouped)
    }

    /// Comments per product, newest first, with their hearts attached.
    async fn load_comments(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Comment>>, RepositoryError> {
        let comment_rows = sqlx::query_as::<_, CommentParts>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM product_comments
             WHERE product_id = ANY($1)
             ORDER BY created_at DESC, id",
        ))
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let comment_ids: Vec<Uuid> = comment_rows.iter().map(|c| c.id.as_uuid()).collect();
        let mut likes_by_comment: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        if !comment_ids.is_empty() {
            let like_rows = sqlx::query_as::<_, LikeRow>(
                "SELECT comment_id, user_id FROM comment_likes WHERE comment_id = ANY($1)",
            )
            .bind(&comment_ids)
            .fetch_all(self.pool)
            .await?;

            for like in like_rows {
                likes_by_comment
                    .entry(like.comment_id.as_uuid())
                    .or_default()
                    .push(like.user_id);
            }
        }

        let mut grouped: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for parts in comment_rows {
            let liked_by = likes_by_comment
                .remove(&parts.id.as_uuid())
                .unwrap_or_default();
            grouped
                .entry(parts.product_id.as_uuid())
                .or_default()
                .push(Comment::assemble(parts, liked_by));
        }
        Ok(grouped)
    }

    /// All users who hearted one comment.
    async fn comment_likes(&self, comment_id: CommentId) -> Result<Vec<UserId>, RepositoryError> {
        let likes = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM comment_likes WHERE comment_id = $1",
        )
        .bind(comment_id)
        .fetch_all(self.pool)
        .await?;

        Ok(likes)
    }
}

#[derive(sqlx::FromRow)]
struct FlagRow {
    product_id: ProductId,
    reason: String,
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    comment_id: CommentId,
    user_id: UserId,
}
