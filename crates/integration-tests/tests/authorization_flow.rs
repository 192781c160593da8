//! End-to-end rule-set scenarios over the pure seam: issue a session
//! token, verify it, extract the actor, and run policy decisions — exactly
//! the path a request takes, minus HTTP and storage.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use secrecy::SecretString;

use tradepost_core::policy::{self, Action, Denied};
use tradepost_core::{Email, Role, UserId};
use tradepost_integration_tests::test_token_service;
use tradepost_server::models::User;
use tradepost_server::services::token::TokenService;

fn make_user(name: &str, role: Role) -> User {
    User {
        id: UserId::new(),
        full_name: name.to_owned(),
        email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_user_token_cannot_moderate() {
    let tokens = test_token_service();
    let alice = make_user("Alice", Role::User);

    let token = tokens.issue(&alice).unwrap();
    let actor = tokens.verify(&token).unwrap().actor().unwrap();

    for action in [
        Action::ListPendingProducts,
        Action::ListFlaggedProducts,
        Action::ApproveProduct,
        Action::DenyProduct,
        Action::ResolveFlag,
    ] {
        assert_eq!(
            policy::authorize(&actor, &action),
            Err(Denied::AdminOnly),
            "non-admin must not pass {action:?}"
        );
    }
}

#[test]
fn test_admin_token_passes_moderation() {
    let tokens = test_token_service();
    let root = make_user("Root", Role::Admin);

    let token = tokens.issue(&root).unwrap();
    let actor = tokens.verify(&token).unwrap().actor().unwrap();

    assert!(policy::authorize(&actor, &Action::ApproveProduct).is_ok());
    assert!(policy::authorize(&actor, &Action::ResolveFlag).is_ok());
    // Admin overrides ownership everywhere.
    assert!(
        policy::authorize(
            &actor,
            &Action::DeleteComment {
                author: UserId::new()
            }
        )
        .is_ok()
    );
}

#[test]
fn test_ownership_travels_through_the_token() {
    let tokens = test_token_service();
    let alice = make_user("Alice", Role::User);
    let bob = make_user("Bob", Role::User);

    let alice_actor = tokens
        .verify(&tokens.issue(&alice).unwrap())
        .unwrap()
        .actor()
        .unwrap();
    let bob_actor = tokens
        .verify(&tokens.issue(&bob).unwrap())
        .unwrap()
        .actor()
        .unwrap();

    let edit_alices_comment = Action::EditComment { author: alice.id };

    assert!(policy::authorize(&alice_actor, &edit_alices_comment).is_ok());
    assert_eq!(
        policy::authorize(&bob_actor, &edit_alices_comment),
        Err(Denied::NotOwner)
    );

    let delete_alices_product = Action::DeleteProduct {
        owner: Some(alice.id),
    };
    assert!(policy::authorize(&alice_actor, &delete_alices_product).is_ok());
    assert_eq!(
        policy::authorize(&bob_actor, &delete_alices_product),
        Err(Denied::NotOwner)
    );
}

#[test]
fn test_tampered_token_is_rejected() {
    let tokens = test_token_service();
    let alice = make_user("Alice", Role::User);
    let token = tokens.issue(&alice).unwrap();

    // Flip a character in the signature segment.
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    assert!(tokens.verify(&tampered).is_err());
}

#[test]
fn test_token_from_another_deployment_is_rejected() {
    let ours = test_token_service();
    let theirs = TokenService::new(&SecretString::from(
        "0th3r!dEpl0ym3nt#kEy$qW8^zU2&vB5*",
    ));

    let alice = make_user("Alice", Role::Admin);
    let foreign_token = theirs.issue(&alice).unwrap();

    // An admin token signed elsewhere buys nothing here.
    assert!(ours.verify(&foreign_token).is_err());
}

#[test]
fn test_role_cannot_be_smuggled_via_claims_alone() {
    // The role in the token is whatever was true at issue time; the
    // visibility filter only honors it after signature verification.
    let tokens = test_token_service();
    let alice = make_user("Alice", Role::User);
    let claims = tokens.verify(&tokens.issue(&alice).unwrap()).unwrap();
    let actor = claims.actor().unwrap();

    assert!(!policy::can_view_unapproved(Some(&actor)));
    assert!(!policy::can_view_unapproved(None));

    let root = make_user("Root", Role::Admin);
    let admin_actor = tokens
        .verify(&tokens.issue(&root).unwrap())
        .unwrap()
        .actor()
        .unwrap();
    assert!(policy::can_view_unapproved(Some(&admin_actor)));
}
