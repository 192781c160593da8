//! The authorization and ownership rule-set.
//!
//! Every mutation of a shared marketplace entity (product, comment, cart)
//! is decided here, in one pure function, instead of ad-hoc role checks
//! scattered across route handlers. Handlers build an [`Action`] describing
//! what the caller wants to do, pass the authenticated [`Actor`], and get an
//! allow/deny answer they must treat as terminal.
//!
//! The rules, in order of strength:
//!
//! - Moderation actions (approve, deny, resolve flags, list pending or
//!   flagged products) require the admin role.
//! - Ownership actions (edit/delete a product or comment) require the
//!   caller to be the recorded owner/author, or an admin.
//! - A product with no recorded owner (anonymous submission) can only be
//!   mutated by an admin.
//!
//! Carts need no entry here: a cart is addressed purely by the caller's own
//! verified identity, so there is nothing to cross-check.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// The authenticated caller, as established from a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Verified user id (the token's subject).
    pub id: UserId,
    /// Role carried by the token.
    pub role: Role,
}

impl Actor {
    /// Construct an actor from verified token claims.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// A requested mutation or privileged read, with the resource facts the
/// decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List the moderation queue.
    ListPendingProducts,
    /// List products with unresolved flags.
    ListFlaggedProducts,
    /// Move a product to `approved`.
    ApproveProduct,
    /// Move a product to `denied`.
    DenyProduct,
    /// Remove one flag reason from a product.
    ResolveFlag,
    /// Update a product's own fields (not its moderation status).
    EditProduct {
        /// Recorded creator, if the submission was authenticated.
        owner: Option<UserId>,
    },
    /// Delete a product.
    DeleteProduct {
        /// Recorded creator, if the submission was authenticated.
        owner: Option<UserId>,
    },
    /// Change a comment's text.
    EditComment {
        /// The comment's recorded author.
        author: UserId,
    },
    /// Delete a comment.
    DeleteComment {
        /// The comment's recorded author.
        author: UserId,
    },
}

/// A terminal denial. The request must fail with a permission error and no
/// partial effect.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// The action is reserved for admins.
    #[error("forbidden")]
    AdminOnly,
    /// The caller is neither the resource's owner nor an admin.
    #[error("not authorized to modify this resource")]
    NotOwner,
}

/// Decide whether `actor` may perform `action`.
///
/// Pure and state-free: all facts the decision needs travel in the
/// arguments. Fail-closed by construction — anything not explicitly
/// allowed is denied.
///
/// # Errors
///
/// Returns [`Denied`] when the actor lacks the required role or ownership.
pub fn authorize(actor: &Actor, action: &Action) -> Result<(), Denied> {
    match *action {
        Action::ListPendingProducts
        | Action::ListFlaggedProducts
        | Action::ApproveProduct
        | Action::DenyProduct
        | Action::ResolveFlag => {
            if actor.role.is_admin() {
                Ok(())
            } else {
                Err(Denied::AdminOnly)
            }
        }
        Action::EditProduct { owner } | Action::DeleteProduct { owner } => {
            allow_owner_or_admin(actor, owner)
        }
        Action::EditComment { author } | Action::DeleteComment { author } => {
            allow_owner_or_admin(actor, Some(author))
        }
    }
}

/// The content-visibility filter for product listings.
///
/// Admins see everything; everyone else (including anonymous callers) sees
/// only approved products. This is a presentation filter, not a security
/// boundary: ids remain enumerable and single-product fetches are public.
#[must_use]
pub fn can_view_unapproved(actor: Option<&Actor>) -> bool {
    actor.is_some_and(|a| a.role.is_admin())
}

fn allow_owner_or_admin(actor: &Actor, owner: Option<UserId>) -> Result<(), Denied> {
    if actor.role.is_admin() {
        return Ok(());
    }
    // An ownerless resource has no non-admin mutator.
    match owner {
        Some(owner) if owner == actor.id => Ok(()),
        _ => Err(Denied::NotOwner),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> Actor {
        Actor::new(UserId::new(), Role::User)
    }

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }

    const MODERATION_ACTIONS: [Action; 5] = [
        Action::ListPendingProducts,
        Action::ListFlaggedProducts,
        Action::ApproveProduct,
        Action::DenyProduct,
        Action::ResolveFlag,
    ];

    #[test]
    fn test_moderation_requires_admin() {
        let alice = user();
        let root = admin();
        for action in MODERATION_ACTIONS {
            assert_eq!(authorize(&alice, &action), Err(Denied::AdminOnly));
            assert_eq!(authorize(&root, &action), Ok(()));
        }
    }

    #[test]
    fn test_owner_may_edit_and_delete_own_product() {
        let alice = user();
        for action in [
            Action::EditProduct {
                owner: Some(alice.id),
            },
            Action::DeleteProduct {
                owner: Some(alice.id),
            },
        ] {
            assert_eq!(authorize(&alice, &action), Ok(()));
        }
    }

    #[test]
    fn test_non_owner_is_denied_product_mutation() {
        let alice = user();
        let bob = user();
        assert_eq!(
            authorize(&bob, &Action::DeleteProduct { owner: Some(alice.id) }),
            Err(Denied::NotOwner)
        );
        assert_eq!(
            authorize(&bob, &Action::EditProduct { owner: Some(alice.id) }),
            Err(Denied::NotOwner)
        );
    }

    #[test]
    fn test_ownerless_product_is_admin_only() {
        let alice = user();
        assert_eq!(
            authorize(&alice, &Action::DeleteProduct { owner: None }),
            Err(Denied::NotOwner)
        );
        assert_eq!(
            authorize(&admin(), &Action::DeleteProduct { owner: None }),
            Ok(())
        );
    }

    #[test]
    fn test_comment_author_or_admin_only() {
        let alice = user();
        let bob = user();
        let root = admin();

        let edit = Action::EditComment { author: alice.id };
        let delete = Action::DeleteComment { author: alice.id };

        assert_eq!(authorize(&alice, &edit), Ok(()));
        assert_eq!(authorize(&alice, &delete), Ok(()));
        assert_eq!(authorize(&root, &edit), Ok(()));
        assert_eq!(authorize(&root, &delete), Ok(()));
        assert_eq!(authorize(&bob, &edit), Err(Denied::NotOwner));
        assert_eq!(authorize(&bob, &delete), Err(Denied::NotOwner));
    }

    #[test]
    fn test_admin_overrides_ownership() {
        let alice = user();
        let root = admin();
        assert_eq!(
            authorize(&root, &Action::DeleteProduct { owner: Some(alice.id) }),
            Ok(())
        );
        assert_eq!(
            authorize(&root, &Action::EditComment { author: alice.id }),
            Ok(())
        );
    }

    #[test]
    fn test_visibility_filter() {
        assert!(!can_view_unapproved(None));
        assert!(!can_view_unapproved(Some(&user())));
        assert!(can_view_unapproved(Some(&admin())));
    }
}
