//! Tenant repository: the current tenants used to sync rents.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use rentbook_core::rents::{Tenant, TenantRoster};
use rentbook_shared::types::{PropertyId, TenantId};

use crate::entities::tenants;

/// Tenant repository.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the tenants of the given properties, grouped by property.
    ///
    /// Properties without tenants have no entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn roster(&self, property_ids: &[PropertyId]) -> Result<TenantRoster, DbErr> {
        let models = tenants::Entity::find()
            .filter(tenants::Column::PropertyId.is_in(property_ids.iter().map(|id| id.into_inner())))
            .order_by_asc(tenants::Column::PropertyId)
            .order_by_asc(tenants::Column::Id)
            .all(&self.db)
            .await?;

        let mut roster = TenantRoster::new();
        for model in models {
            let tenant = to_domain(model);
            roster.entry(tenant.property_id).or_default().push(tenant);
        }
        Ok(roster)
    }

    /// Counts the current tenants of a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_for_property(&self, property_id: PropertyId) -> Result<u64, DbErr> {
        tenants::Entity::find()
            .filter(tenants::Column::PropertyId.eq(property_id.into_inner()))
            .count(&self.db)
            .await
    }
}

fn to_domain(model: tenants::Model) -> Tenant {
    Tenant {
        id: TenantId::new(model.id),
        property_id: PropertyId::new(model.property_id),
        first_name: model.first_name,
        last_name: model.last_name,
        rent_amount: model.rent_amount,
        rent_due_day: model.rent_due_day.unsigned_abs().max(1),
    }
}
