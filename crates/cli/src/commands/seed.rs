//! Seed the database with demo data.
//!
//! Creates a demo seller plus a handful of pending products across every
//! category, so a fresh deployment has something to moderate and browse.

use rust_decimal::Decimal;
use tradepost_core::ProductCategory;
use tradepost_server::db::products::{NewProduct, ProductRepository};
use tradepost_server::services::AuthService;

use super::CliError;

const DEMO_EMAIL: &str = "seller@tradepost.test";

/// Insert demo data. Safe to re-run: bails out if the demo seller exists.
///
/// # Errors
///
/// Returns `CliError` if a database operation fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    let auth = AuthService::new(&pool);
    let seller = match auth
        .register("Demo Seller", DEMO_EMAIL, "demo-seller-pass")
        .await
    {
        Ok(user) => user,
        Err(tradepost_server::services::AuthError::EmailTaken) => {
            tracing::info!("demo data already present, nothing to do");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let products = ProductRepository::new(&pool);
    let listings = [
        (
            "1987 station wagon",
            Decimal::new(3_450_00, 2),
            "Runs, mostly. Sold as seen.",
            ProductCategory::Vehicle,
        ),
        (
            "Allotment shed",
            Decimal::new(900_00, 2),
            "Buyer dismantles and collects.",
            ProductCategory::Property,
        ),
        (
            "Box of assorted cables",
            Decimal::new(15_00, 2),
            "At least one of everything.",
            ProductCategory::Miscellaneous,
        ),
    ];

    for (name, price, description, category) in listings {
        let product = products
            .create(NewProduct {
                name,
                price,
                description,
                image_url: "/uploads/placeholder.jpg",
                category,
                owner_id: Some(seller.id),
            })
            .await?;
        tracing::info!(product_id = %product.id, name, "seeded product");
    }

    tracing::info!("Seed complete: products are pending approval");
    Ok(())
}
