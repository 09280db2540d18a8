//! Initial schema: companies, properties, tenants and the monthly rent tables.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let statements = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => SQLITE_UP,
            _ => POSTGRES_UP,
        };
        for sql in statements {
            db.execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            "unoccupied_markers",
            "payables",
            "receivables",
            "tenants",
            "properties",
            "companies",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table};"))
                .await?;
        }
        Ok(())
    }
}

const POSTGRES_UP: &[&str] = &[
    r"
CREATE TABLE companies (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL
);",
    r"
CREATE TABLE properties (
    id BIGSERIAL PRIMARY KEY,
    company_id BIGINT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE
);",
    r"CREATE INDEX idx_properties_company ON properties(company_id) WHERE active;",
    r"
CREATE TABLE tenants (
    id BIGSERIAL PRIMARY KEY,
    property_id BIGINT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    rent_amount NUMERIC(12, 2) NOT NULL CHECK (rent_amount >= 0),
    rent_due_day INTEGER NOT NULL CHECK (rent_due_day BETWEEN 1 AND 31)
);",
    r"CREATE INDEX idx_tenants_property ON tenants(property_id);",
    r"
CREATE TABLE receivables (
    id BIGSERIAL PRIMARY KEY,
    property_id BIGINT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    amount_paid NUMERIC(12, 2) NOT NULL DEFAULT 0,
    amount_due NUMERIC(12, 2) NOT NULL,
    due_date DATE NOT NULL,
    paid_by DATE,
    name VARCHAR(255) NOT NULL
);",
    r"CREATE INDEX idx_receivables_property_due ON receivables(property_id, due_date);",
    r"
CREATE TABLE payables (
    id BIGSERIAL PRIMARY KEY,
    property_id BIGINT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    date DATE NOT NULL,
    payment_method VARCHAR(50) NOT NULL,
    detail TEXT
);",
    r"CREATE INDEX idx_payables_property_date ON payables(property_id, date);",
    r"
CREATE TABLE unoccupied_markers (
    id BIGSERIAL PRIMARY KEY,
    property_id BIGINT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    month DATE NOT NULL,
    CONSTRAINT chk_month_first_day CHECK (EXTRACT(DAY FROM month) = 1),
    CONSTRAINT uq_unoccupied_property_month UNIQUE (property_id, month)
);",
];

const SQLITE_UP: &[&str] = &[
    r"
CREATE TABLE companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);",
    r"
CREATE TABLE properties (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1
);",
    r"
CREATE TABLE tenants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    rent_amount REAL NOT NULL,
    rent_due_day INTEGER NOT NULL
);",
    r"
CREATE TABLE receivables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    amount_paid REAL NOT NULL DEFAULT 0,
    amount_due REAL NOT NULL,
    due_date TEXT NOT NULL,
    paid_by TEXT,
    name TEXT NOT NULL
);",
    r"
CREATE TABLE payables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    detail TEXT
);",
    r"
CREATE TABLE unoccupied_markers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    month TEXT NOT NULL,
    UNIQUE (property_id, month)
);",
];
