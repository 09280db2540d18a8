//! Database seeder for Rentbook development and testing.
//!
//! Seeds a demo company with three properties, their tenants, a few payables and one
//! vacant property marked unoccupied for the current month.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};

use rentbook_db::entities::{companies, payables, properties, tenants, unoccupied_markers};
use rentbook_shared::AppConfig;

/// Name of the demo company; seeding is skipped if it already exists.
const DEMO_COMPANY: &str = "Demo Rentals";

/// `(first_name, last_name, rent in cents, due day)` per tenant.
type TenantSeed = (&'static str, &'static str, i64, i32);

const ELM_TENANTS: &[TenantSeed] = &[
    ("Ann", "Lee", 90_000, 1),
    ("Bo", "Diaz", 75_000, 15),
];
const OAK_TENANTS: &[TenantSeed] = &[("Cy", "Park", 120_000, 31)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = rentbook_db::connect(&config.database).await?;

    if companies::Entity::find()
        .filter(companies::Column::Name.eq(DEMO_COMPANY))
        .one(&db)
        .await?
        .is_some()
    {
        println!("  Demo company already exists, skipping...");
        return Ok(());
    }

    println!("Seeding demo company...");
    let company = companies::ActiveModel {
        id: NotSet,
        name: Set(DEMO_COMPANY.to_string()),
    }
    .insert(&db)
    .await?;

    println!("Seeding properties and tenants...");
    let elm = seed_property(&db, company.id, "12 Elm Street", ELM_TENANTS).await?;
    let oak = seed_property(&db, company.id, "48 Oak Avenue", OAK_TENANTS).await?;
    let pine = seed_property(&db, company.id, "7 Pine Road", &[]).await?;

    let today = Utc::now().date_naive();
    let month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

    println!("Seeding payables...");
    seed_payable(&db, elm, "Water", 8_250, month, "check").await?;
    seed_payable(&db, oak, "Insurance", 12_000, month, "card").await?;

    println!("Marking vacant property unoccupied...");
    unoccupied_markers::ActiveModel {
        id: NotSet,
        property_id: Set(pine),
        month: Set(month),
    }
    .insert(&db)
    .await?;

    println!("Seeding complete!");
    Ok(())
}

/// Seeds one active property with its tenants.
async fn seed_property(
    db: &DatabaseConnection,
    company_id: i64,
    name: &str,
    seeds: &[TenantSeed],
) -> anyhow::Result<i64> {
    let property = properties::ActiveModel {
        id: NotSet,
        company_id: Set(company_id),
        name: Set(name.to_string()),
        active: Set(true),
    }
    .insert(db)
    .await?;

    for &(first_name, last_name, rent_cents, due_day) in seeds {
        tenants::ActiveModel {
            id: NotSet,
            property_id: Set(property.id),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            rent_amount: Set(Decimal::new(rent_cents, 2)),
            rent_due_day: Set(due_day),
        }
        .insert(db)
        .await?;
    }
    println!("  {name}: {} tenant(s)", seeds.len());

    Ok(property.id)
}

/// Seeds one payable dated in the given month.
async fn seed_payable(
    db: &DatabaseConnection,
    property_id: i64,
    name: &str,
    amount_cents: i64,
    date: NaiveDate,
    payment_method: &str,
) -> anyhow::Result<()> {
    payables::ActiveModel {
        id: NotSet,
        property_id: Set(property_id),
        name: Set(name.to_string()),
        amount: Set(Decimal::new(amount_cents, 2)),
        date: Set(date),
        payment_method: Set(payment_method.to_string()),
        detail: Set(None),
    }
    .insert(db)
    .await?;

    Ok(())
}
