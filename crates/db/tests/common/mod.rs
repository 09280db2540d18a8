//! Shared setup for db integration tests: an in-memory SQLite database with the schema applied.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, NotSet, Set};
use sea_orm_migration::MigratorTrait;

use rentbook_db::entities::{companies, properties, tenants};
use rentbook_db::migration::Migrator;
use rentbook_shared::config::DatabaseConfig;

/// Connect to a fresh in-memory database and run migrations.
///
/// The pool holds a single connection so every query sees the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let db = rentbook_db::connect(&config)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Create a company.
pub async fn create_company(db: &DatabaseConnection, name: &str) -> i64 {
    companies::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to create company")
    .id
}

/// Create a property.
pub async fn create_property(db: &DatabaseConnection, company_id: i64, name: &str, active: bool) -> i64 {
    properties::ActiveModel {
        id: NotSet,
        company_id: Set(company_id),
        name: Set(name.to_string()),
        active: Set(active),
    }
    .insert(db)
    .await
    .expect("Failed to create property")
    .id
}

/// Create a tenant.
pub async fn create_tenant(
    db: &DatabaseConnection,
    property_id: i64,
    first_name: &str,
    last_name: &str,
    rent_amount: Decimal,
    rent_due_day: i32,
) -> i64 {
    tenants::ActiveModel {
        id: NotSet,
        property_id: Set(property_id),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        rent_amount: Set(rent_amount),
        rent_due_day: Set(rent_due_day),
    }
    .insert(db)
    .await
    .expect("Failed to create tenant")
    .id
}
