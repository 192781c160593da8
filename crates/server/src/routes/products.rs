//! Product route handlers: listings, moderation, comments, and flags.
//!
//! Authorization is never decided here: handlers collect the resource
//! facts, build a `policy::Action`, and defer to `policy::authorize`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use tradepost_core::policy::{self, Action};
use tradepost_core::{CommentId, ModerationStatus, ProductCategory, ProductId, UserId};

use crate::db::products::{NewProduct, ProductPatch, ProductRepository, ProductVisibility};
use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, OptionalUser};
use crate::models::{Comment, Product};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Product submission body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
}

/// Partial product update body. Absent fields are left untouched.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    /// Moderation status; admin-only. The derived `approved` flag cannot
    /// be set directly.
    pub status: Option<String>,
}

/// Comment creation/edit body.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

/// Flag submission body.
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    #[serde(default)]
    pub reason: String,
}

// =============================================================================
// Listings
// =============================================================================

/// `GET /products` - approved products for everyone, everything for admins.
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Vec<Product>>> {
    let actor = user.as_ref().map(|u| u.actor());
    let visibility = if policy::can_view_unapproved(actor.as_ref()) {
        ProductVisibility::All
    } else {
        ProductVisibility::ApprovedOnly
    };

    let products = ProductRepository::new(state.pool()).list(visibility).await?;
    Ok(Json(products))
}

/// `GET /products/pending` - the moderation queue (admin only).
pub async fn list_pending(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Product>>> {
    policy::authorize(&user.actor(), &Action::ListPendingProducts)?;

    let products = ProductRepository::new(state.pool()).list_pending().await?;
    Ok(Json(products))
}

/// `GET /products/flagged` - products with unresolved flags (admin only).
pub async fn list_flagged(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Product>>> {
    policy::authorize(&user.actor(), &Action::ListFlaggedProducts)?;

    let products = ProductRepository::new(state.pool()).list_flagged().await?;
    Ok(Json(products))
}

/// `GET /products/user/{userId}` - one user's products, approval ignored.
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_owner(user_id)
        .await?;
    Ok(Json(products))
}

/// `GET /products/{id}` - fetch one product.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(product))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// `POST /products` - submit a listing; always enters pending.
///
/// The owner is recorded from the verified token when the caller is
/// authenticated, never from the body. Anonymous submissions are allowed
/// and enter ownerless.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    if body.name.is_empty() || body.description.is_empty() || body.image_url.is_empty() {
        return Err(AppError::Validation("all product fields required".to_owned()));
    }
    let category = parse_category(&body.category)?;

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name: &body.name,
            price: body.price,
            description: &body.description,
            image_url: &body.image_url,
            category,
            owner_id: user.map(|u| u.id),
        })
        .await?;

    tracing::info!(product_id = %product.id, "product submitted");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /products/{id}` - update fields (owner/admin); status (admin).
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let owner = repo
        .owner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let category = body.category.as_deref().map(parse_category).transpose()?;
    let status = body.status.as_deref().map(parse_status).transpose()?;

    let actor = user.actor();

    // Moderation transitions are role-gated regardless of ownership.
    if let Some(status) = status {
        let action = match status {
            ModerationStatus::Approved => Action::ApproveProduct,
            ModerationStatus::Denied | ModerationStatus::Pending => Action::DenyProduct,
        };
        policy::authorize(&actor, &action)?;
    }

    let edits_fields = body.name.is_some()
        || body.price.is_some()
        || body.description.is_some()
        || body.image_url.is_some()
        || category.is_some();
    if edits_fields {
        policy::authorize(&actor, &Action::EditProduct { owner })?;
    }

    let product = repo
        .update(
            id,
            &ProductPatch {
                name: body.name,
                price: body.price,
                description: body.description,
                image_url: body.image_url,
                category,
                status,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(product))
}

/// `DELETE /products/{id}` - delete a listing (owner/admin).
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.pool());
    let owner = repo
        .owner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    policy::authorize(&user.actor(), &Action::DeleteProduct { owner })?;

    repo.delete(id).await?;
    tracing::info!(product_id = %id, "product deleted");

    Ok(Json(json!({ "message": "product deleted" })))
}

/// `PATCH /products/{id}/approve` - approve a listing (admin only).
pub async fn approve(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    policy::authorize(&user.actor(), &Action::ApproveProduct)?;

    let product = ProductRepository::new(state.pool())
        .set_status(id, ModerationStatus::Approved)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    tracing::info!(product_id = %id, "product approved");
    Ok(Json(product))
}

// =============================================================================
// Flags
// =============================================================================

/// `POST /products/{id}/flag` - append a flag reason (any caller).
pub async fn flag(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<FlagRequest>,
) -> Result<Json<Product>> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("flag reason required".to_owned()));
    }

    let repo = ProductRepository::new(state.pool());
    repo.add_flag(id, reason).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => {
            AppError::NotFound("product not found".to_owned())
        }
        other => AppError::Database(other),
    })?;

    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    tracing::info!(product_id = %id, "product flagged");
    Ok(Json(product))
}

/// `DELETE /products/{id}/flag/{idx}` - resolve one flag (admin only).
///
/// Resolution is positional over the listed order; removing the last
/// reason clears the derived `flagged` bit.
pub async fn resolve_flag(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, index)): Path<(ProductId, usize)>,
) -> Result<Json<Product>> {
    policy::authorize(&user.actor(), &Action::ResolveFlag)?;

    let repo = ProductRepository::new(state.pool());
    if !repo.exists(id).await? {
        return Err(AppError::NotFound("product not found".to_owned()));
    }

    if !repo.resolve_flag(id, index).await? {
        return Err(AppError::Validation("invalid flag index".to_owned()));
    }

    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    tracing::info!(product_id = %id, index, "flag resolved");
    Ok(Json(product))
}

// =============================================================================
// Comments
// =============================================================================

/// `POST /products/{id}/comments` - add a comment (authenticated).
///
/// Author id and display name come from the verified token, never from the
/// body.
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<ProductId>,
    Json(body): Json<CommentRequest>,
) -> Result<impl IntoResponse> {
    let text = body.comment.trim();
    if text.is_empty() {
        return Err(AppError::Validation("comment text required".to_owned()));
    }

    let repo = ProductRepository::new(state.pool());
    if !repo.exists(id).await? {
        return Err(AppError::NotFound("product not found".to_owned()));
    }

    let comment = repo.add_comment(id, user.id, &user.name, text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `PATCH /products/{id}/comments/{commentId}` - edit (author/admin).
pub async fn edit_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, comment_id)): Path<(ProductId, CommentId)>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<Comment>> {
    let text = body.comment.trim();
    if text.is_empty() {
        return Err(AppError::Validation("comment text required".to_owned()));
    }

    let repo = ProductRepository::new(state.pool());
    let existing = repo
        .get_comment(id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment not found".to_owned()))?;

    policy::authorize(
        &user.actor(),
        &Action::EditComment {
            author: existing.user_id,
        },
    )
    .map_err(|_| AppError::Forbidden("not authorized to edit this comment".to_owned()))?;

    let comment = repo.update_comment(comment_id, text).await?;
    Ok(Json(comment))
}

/// `DELETE /products/{id}/comments/{commentId}` - delete (author/admin).
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, comment_id)): Path<(ProductId, CommentId)>,
) -> Result<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.pool());
    let existing = repo
        .get_comment(id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment not found".to_owned()))?;

    policy::authorize(
        &user.actor(),
        &Action::DeleteComment {
            author: existing.user_id,
        },
    )
    .map_err(|_| AppError::Forbidden("not authorized to delete this comment".to_owned()))?;

    repo.delete_comment(comment_id).await?;
    Ok(Json(json!({ "message": "comment deleted" })))
}

/// `POST /products/{id}/comments/{commentId}/react` - toggle a heart.
///
/// Idempotent per user: hearting twice returns to the original state.
pub async fn react_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, comment_id)): Path<(ProductId, CommentId)>,
) -> Result<Json<Comment>> {
    let repo = ProductRepository::new(state.pool());
    if repo.get_comment(id, comment_id).await?.is_none() {
        return Err(AppError::NotFound("comment not found".to_owned()));
    }

    let comment = repo.toggle_heart(comment_id, user.id).await?;
    Ok(Json(comment))
}

// =============================================================================
// Parsing Helpers
// =============================================================================

fn parse_category(s: &str) -> Result<ProductCategory> {
    s.parse::<ProductCategory>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn parse_status(s: &str) -> Result<ModerationStatus> {
    s.parse::<ModerationStatus>()
        .map_err(|_| AppError::Validation(format!("invalid status: {s}")))
}
