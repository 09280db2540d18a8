//! Property repository for database operations.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use rentbook_core::rents::PropertyRef;
use rentbook_shared::types::{CompanyId, PropertyId};

use crate::entities::{companies, properties};

/// Property repository for company lookups.
#[derive(Debug, Clone)]
pub struct PropertyRepository {
    db: DatabaseConnection,
}

impl PropertyRepository {
    /// Creates a new property repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Checks if a company exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn company_exists(&self, company_id: CompanyId) -> Result<bool, DbErr> {
        let count = companies::Entity::find_by_id(company_id.into_inner())
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Lists the active properties of a company, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self, company_id: CompanyId) -> Result<Vec<PropertyRef>, DbErr> {
        let models = properties::Entity::find()
            .filter(properties::Column::CompanyId.eq(company_id.into_inner()))
            .filter(properties::Column::Active.eq(true))
            .order_by_asc(properties::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| PropertyRef {
                id: PropertyId::new(m.id),
                name: m.name,
            })
            .collect())
    }
}
