//! Demo catalog seeding.

use rust_decimal::Decimal;
use rust_decimal::dec;

use ecostore_core::Category;

use ecostore_api::db;
use ecostore_api::db::products::{ProductFilter, ProductInput, ProductRepository};

use super::{CliError, database_url};

/// The demo catalog.
fn demo_products() -> Vec<ProductInput> {
    fn product(
        name: &str,
        description: &str,
        price: Decimal,
        category: Category,
        stock: i32,
    ) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            category,
            stock,
            image_url: None,
        }
    }

    vec![
        product(
            "Organic Cotton Tote",
            "Reusable shopping bag made from certified organic cotton.",
            dec!(12.99),
            Category::EcoBags,
            120,
        ),
        product(
            "Jute Market Bag",
            "Sturdy woven jute bag for groceries and produce.",
            dec!(9.50),
            Category::EcoBags,
            80,
        ),
        product(
            "Insulated Steel Bottle",
            "Double-walled stainless bottle, keeps drinks cold for 24h.",
            dec!(24.00),
            Category::WaterBottles,
            60,
        ),
        product(
            "Glass Water Bottle",
            "Borosilicate glass bottle with a silicone sleeve.",
            dec!(18.75),
            Category::WaterBottles,
            45,
        ),
        product(
            "Beeswax Food Wraps",
            "Washable, compostable alternative to cling film. Set of three.",
            dec!(15.00),
            Category::ReusableItems,
            200,
        ),
        product(
            "Solar Phone Charger",
            "Portable 10W solar panel with dual USB output.",
            dec!(39.99),
            Category::SolarProducts,
            25,
        ),
        product(
            "Organic Green Tea",
            "Loose-leaf green tea from certified organic farms.",
            dec!(8.25),
            Category::Organic,
            150,
        ),
        product(
            "Bamboo Cutlery Set",
            "Travel cutlery set with carrying pouch.",
            dec!(11.00),
            Category::BambooProducts,
            90,
        ),
        product(
            "Recycled Paper Notebook",
            "A5 notebook, 100% post-consumer recycled paper.",
            dec!(6.50),
            Category::RecycledMaterials,
            300,
        ),
    ]
}

/// Insert the demo catalog into an empty product table.
///
/// Refuses to run when products already exist, so repeated seeding never
/// duplicates the catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the catalog is not
/// empty.
pub async fn run() -> Result<(), CliError> {
    let url = database_url()?;
    let pool = db::create_pool(&url).await?;
    let products = ProductRepository::new(&pool);

    let existing = products
        .list(&ProductFilter {
            limit: 1,
            ..ProductFilter::default()
        })
        .await?;
    if !existing.is_empty() {
        return Err(CliError::Invalid(
            "Catalog is not empty; refusing to seed".to_owned(),
        ));
    }

    let catalog = demo_products();
    let count = catalog.len();
    for input in catalog {
        let created = products.create(&input).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "seeded");
    }

    tracing::info!("Seeded {count} products");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_products_are_within_bounds() {
        use ecostore_core::limits;

        let catalog = demo_products();
        assert!(!catalog.is_empty());

        for p in catalog {
            assert!(!p.name.is_empty() && p.name.len() <= limits::MAX_NAME_LENGTH);
            assert!(
                !p.description.is_empty() && p.description.len() <= limits::MAX_DESCRIPTION_LENGTH
            );
            assert!(p.price >= limits::MIN_PRICE && p.price <= limits::MAX_PRICE);
            assert!(p.stock >= 0);
        }
    }
}
