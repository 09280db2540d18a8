//! Rents repository for database operations.
//!
//! Implements the core rent data source using SeaORM. Batch writes run inside a single
//! transaction, so a batch either persists completely or not at all.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use rentbook_core::rents::{
    NewPayable, NewReceivable, NewUnoccupied, Payable, PeriodQuery, Receivable, RentsError,
    RentsRepository as RentsRepoTrait, Unoccupied,
};
use rentbook_shared::types::{PayableId, PropertyId, ReceivableId, UnoccupiedId};

use crate::entities::{payables, receivables, unoccupied_markers};

/// Rents repository implementation.
#[derive(Debug, Clone)]
pub struct RentsRepository {
    db: DatabaseConnection,
}

impl RentsRepository {
    /// Create a new rents repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RentsRepoTrait for RentsRepository {
    async fn list_receivables(&self, query: &PeriodQuery) -> Result<Vec<Receivable>, RentsError> {
        let models = receivables::Entity::find()
            .filter(receivables::Column::PropertyId.is_in(raw_ids(query)))
            .filter(receivables::Column::DueDate.gte(query.window.start))
            .filter(receivables::Column::DueDate.lt(query.window.end))
            .order_by_asc(receivables::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(receivable_to_domain).collect())
    }

    async fn list_payables(&self, query: &PeriodQuery) -> Result<Vec<Payable>, RentsError> {
        let models = payables::Entity::find()
            .filter(payables::Column::PropertyId.is_in(raw_ids(query)))
            .filter(payables::Column::Date.gte(query.window.start))
            .filter(payables::Column::Date.lt(query.window.end))
            .order_by_asc(payables::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(payable_to_domain).collect())
    }

    async fn list_unoccupied(&self, query: &PeriodQuery) -> Result<Vec<Unoccupied>, RentsError> {
        let models = unoccupied_markers::Entity::find()
            .filter(unoccupied_markers::Column::PropertyId.is_in(raw_ids(query)))
            .filter(unoccupied_markers::Column::Month.gte(query.window.start))
            .filter(unoccupied_markers::Column::Month.lt(query.window.end))
            .order_by_asc(unoccupied_markers::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(models.into_iter().map(unoccupied_to_domain).collect())
    }

    async fn create_receivables(
        &self,
        rows: Vec<NewReceivable>,
    ) -> Result<Vec<Receivable>, RentsError> {
        let txn = self.db.begin().await.map_err(command_error)?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let model = receivables::ActiveModel {
                id: NotSet,
                property_id: Set(row.property_id.into_inner()),
                amount_paid: Set(row.amount_paid),
                amount_due: Set(row.amount_due),
                due_date: Set(row.due_date),
                paid_by: Set(row.paid_by),
                name: Set(row.name),
            }
            .insert(&txn)
            .await
            .map_err(command_error)?;
            created.push(receivable_to_domain(model));
        }
        txn.commit().await.map_err(command_error)?;

        debug!(count = created.len(), "Created receivables");
        Ok(created)
    }

    async fn update_receivables(
        &self,
        rows: Vec<Receivable>,
    ) -> Result<Vec<Receivable>, RentsError> {
        let txn = self.db.begin().await.map_err(command_error)?;
        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(id) = row.id else {
                return Err(RentsError::command(format!(
                    "receivable '{}' has no id to update",
                    row.name
                )));
            };
            let model = receivables::ActiveModel {
                id: Set(id.into_inner()),
                property_id: Set(row.property_id.into_inner()),
                amount_paid: Set(row.amount_paid),
                amount_due: Set(row.amount_due),
                due_date: Set(row.due_date),
                paid_by: Set(row.paid_by),
                name: Set(row.name),
            }
            .update(&txn)
            .await
            .map_err(command_error)?;
            updated.push(receivable_to_domain(model));
        }
        txn.commit().await.map_err(command_error)?;

        debug!(count = updated.len(), "Updated receivables");
        Ok(updated)
    }

    async fn delete_receivable(&self, id: ReceivableId) -> Result<bool, RentsError> {
        let result = receivables::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(command_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn create_payables(&self, rows: Vec<NewPayable>) -> Result<Vec<Payable>, RentsError> {
        let txn = self.db.begin().await.map_err(command_error)?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let model = payable_active_model(row.with_id(None))
                .insert(&txn)
                .await
                .map_err(command_error)?;
            created.push(payable_to_domain(model));
        }
        txn.commit().await.map_err(command_error)?;

        debug!(count = created.len(), "Created payables");
        Ok(created)
    }

    async fn upsert_payables(&self, rows: Vec<Payable>) -> Result<Vec<Payable>, RentsError> {
        let txn = self.db.begin().await.map_err(command_error)?;
        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            let persisted = row.id.is_some();
            let active = payable_active_model(row);
            let result = if persisted {
                active.update(&txn).await
            } else {
                active.insert(&txn).await
            };
            let model = result.map_err(command_error)?;
            saved.push(payable_to_domain(model));
        }
        txn.commit().await.map_err(command_error)?;

        debug!(count = saved.len(), "Upserted payables");
        Ok(saved)
    }

    async fn delete_payable(&self, id: PayableId) -> Result<bool, RentsError> {
        let result = payables::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(command_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn create_unoccupied(&self, marker: NewUnoccupied) -> Result<Unoccupied, RentsError> {
        let model = unoccupied_markers::ActiveModel {
            id: NotSet,
            property_id: Set(marker.property_id.into_inner()),
            month: Set(marker.month),
        }
        .insert(&self.db)
        .await
        .map_err(command_error)?;

        Ok(unoccupied_to_domain(model))
    }

    async fn delete_unoccupied(&self, id: UnoccupiedId) -> Result<bool, RentsError> {
        let result = unoccupied_markers::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(command_error)?;

        Ok(result.rows_affected > 0)
    }
}

fn raw_ids(query: &PeriodQuery) -> Vec<i64> {
    query
        .property_ids
        .iter()
        .map(|id| id.into_inner())
        .collect()
}

#[allow(clippy::needless_pass_by_value)]
fn query_error(e: DbErr) -> RentsError {
    RentsError::query(e.to_string())
}

#[allow(clippy::needless_pass_by_value)]
fn command_error(e: DbErr) -> RentsError {
    RentsError::command(e.to_string())
}

fn payable_active_model(payable: Payable) -> payables::ActiveModel {
    payables::ActiveModel {
        id: payable.id.map_or(NotSet, |id| Set(id.into_inner())),
        property_id: Set(payable.property_id.into_inner()),
        name: Set(payable.name),
        amount: Set(payable.amount),
        date: Set(payable.date),
        payment_method: Set(payable.payment_method),
        detail: Set(payable.detail),
    }
}

/// Convert database model to domain receivable.
fn receivable_to_domain(model: receivables::Model) -> Receivable {
    Receivable {
        id: Some(ReceivableId::new(model.id)),
        property_id: PropertyId::new(model.property_id),
        amount_paid: model.amount_paid,
        amount_due: model.amount_due,
        due_date: model.due_date,
        paid_by: model.paid_by,
        name: model.name,
    }
}

/// Convert database model to domain payable.
fn payable_to_domain(model: payables::Model) -> Payable {
    Payable {
        id: Some(PayableId::new(model.id)),
        property_id: PropertyId::new(model.property_id),
        name: model.name,
        amount: model.amount,
        date: model.date,
        payment_method: model.payment_method,
        detail: model.detail,
    }
}

fn unoccupied_to_domain(model: unoccupied_markers::Model) -> Unoccupied {
    Unoccupied {
        id: Some(UnoccupiedId::new(model.id)),
        property_id: PropertyId::new(model.property_id),
        month: model.month,
    }
}
