//! Repository scenarios against a real `PostgreSQL`.
//!
//! All tests here are `#[ignore]`d; see the crate docs for how to run them
//! against a migrated test database.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use tradepost_core::{ModerationStatus, ProductCategory};
use tradepost_integration_tests::{test_pool, unique_email};
use tradepost_server::db::carts::CartRepository;
use tradepost_server::db::products::{NewProduct, ProductRepository, ProductVisibility};
use tradepost_server::models::User;
use tradepost_server::services::AuthService;

async fn register(pool: &sqlx::PgPool, tag: &str) -> User {
    AuthService::new(pool)
        .register(tag, &unique_email(tag), "integration-pass")
        .await
        .unwrap()
}

fn listing<'a>(name: &'a str, owner: &User) -> NewProduct<'a> {
    NewProduct {
        name,
        price: Decimal::new(10_00, 2),
        description: "integration test listing",
        image_url: "/uploads/test.jpg",
        category: ProductCategory::Miscellaneous,
        owner_id: Some(owner.id),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (TRADEPOST_TEST_DATABASE_URL)"]
async fn test_register_then_login_roundtrip() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let email = unique_email("login");
    let user = auth.register("Login Test", &email, "s3cure-enough").await.unwrap();

    let again = auth.login(&email, "s3cure-enough").await.unwrap();
    assert_eq!(again.id, user.id);

    // Any other password fails, indistinguishably from an unknown email.
    assert!(auth.login(&email, "wrong-password").await.is_err());
    assert!(auth.login(&unique_email("ghost"), "s3cure-enough").await.is_err());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (TRADEPOST_TEST_DATABASE_URL)"]
async fn test_cart_add_merges_quantities() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);
    let carts = CartRepository::new(&pool);

    let buyer = register(&pool, "buyer").await;
    let seller = register(&pool, "seller").await;
    let product = products.create(listing("merge-target", &seller)).await.unwrap();

    let cart = carts.get_or_create(buyer.id).await.unwrap();
    carts.add_item(cart.id, product.id, 2).await.unwrap();
    carts.add_item(cart.id, product.id, 3).await.unwrap();

    let items = carts.items(cart.id).await.unwrap();
    let line: Vec<_> = items.iter().filter(|l| l.id == product.id).collect();
    assert_eq!(line.len(), 1, "same product must never occupy two lines");
    assert_eq!(line.first().unwrap().quantity, 5);

    // get_or_create is stable: same cart comes back.
    let same = carts.get_or_create(buyer.id).await.unwrap();
    assert_eq!(same.id, cart.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (TRADEPOST_TEST_DATABASE_URL)"]
async fn test_flag_lifecycle_and_derived_flagged() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);

    let seller = register(&pool, "flagged-seller").await;
    let product = products.create(listing("flag-target", &seller)).await.unwrap();
    assert!(!product.flagged);

    products.add_flag(product.id, "fake").await.unwrap();
    let flagged = products.get(product.id).await.unwrap().unwrap();
    assert!(flagged.flagged);
    assert_eq!(flagged.flag_reasons, vec!["fake".to_owned()]);

    // Out-of-range resolution is rejected without touching anything.
    assert!(!products.resolve_flag(product.id, 5).await.unwrap());

    // Resolving the only flag clears the derived bit.
    assert!(products.resolve_flag(product.id, 0).await.unwrap());
    let clean = products.get(product.id).await.unwrap().unwrap();
    assert!(!clean.flagged);
    assert!(clean.flag_reasons.is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (TRADEPOST_TEST_DATABASE_URL)"]
async fn test_heart_double_toggle_is_identity() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);

    let seller = register(&pool, "comment-seller").await;
    let commenter = register(&pool, "commenter").await;
    let reactor = register(&pool, "reactor").await;

    let product = products.create(listing("react-target", &seller)).await.unwrap();
    let comment = products
        .add_comment(product.id, commenter.id, &commenter.full_name, "nice")
        .await
        .unwrap();
    assert_eq!(comment.hearts, 0);

    let hearted = products.toggle_heart(comment.id, reactor.id).await.unwrap();
    assert_eq!(hearted.hearts, 1);
    assert!(hearted.liked_by.contains(&reactor.id));

    // Toggling again returns to the original state; never below zero.
    let unhearted = products.toggle_heart(comment.id, reactor.id).await.unwrap();
    assert_eq!(unhearted.hearts, 0);
    assert!(unhearted.liked_by.is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (TRADEPOST_TEST_DATABASE_URL)"]
async fn test_pending_product_hidden_until_approved() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);

    let seller = register(&pool, "visibility-seller").await;
    let product = products.create(listing("visibility-target", &seller)).await.unwrap();
    assert_eq!(product.status, ModerationStatus::Pending);
    assert!(!product.approved);

    // Hidden from the public listing, visible in the owner's own query.
    let public = products.list(ProductVisibility::ApprovedOnly).await.unwrap();
    assert!(!public.iter().any(|p| p.id == product.id));
    let mine = products.list_by_owner(seller.id).await.unwrap();
    assert!(mine.iter().any(|p| p.id == product.id));

    // Admin approval flips both status and the derived flag, and the
    // product enters the public listing.
    let approved = products
        .set_status(product.id, ModerationStatus::Approved)
        .await
        .unwrap()
        .unwrap();
    assert!(approved.approved);

    let public = products.list(ProductVisibility::ApprovedOnly).await.unwrap();
    assert!(public.iter().any(|p| p.id == product.id));

    // The moderation queue no longer contains it.
    let pending = products.list_pending().await.unwrap();
    assert!(!pending.iter().any(|p| p.id == product.id));
}
