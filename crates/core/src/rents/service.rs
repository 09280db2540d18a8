//! Rent reconciliation service: fetch, save and immediate writes against a data source.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use rentbook_shared::types::{PayableId, PropertyId, ReceivableId, UnoccupiedId};

use super::error::RentsError;
use super::save::{
    PropertySavePlan, RowKind, RowOutcome, RowResult, SavePlan, SavedRows, SaveReport,
};
use super::snapshot::AccountingSnapshot;
use super::types::{
    NewPayable, NewReceivable, NewUnoccupied, Payable, PeriodQuery, Receivable, RentScope,
    Unoccupied,
};
use super::workbench::RentWorkbench;

/// Repository trait for rent persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait RentsRepository: Send + Sync {
    /// Receivables due inside the window for the given properties.
    fn list_receivables(
        &self,
        query: &PeriodQuery,
    ) -> impl Future<Output = Result<Vec<Receivable>, RentsError>> + Send;

    /// Payables dated inside the window for the given properties.
    fn list_payables(
        &self,
        query: &PeriodQuery,
    ) -> impl Future<Output = Result<Vec<Payable>, RentsError>> + Send;

    /// Unoccupied markers whose month falls inside the window for the given properties.
    fn list_unoccupied(
        &self,
        query: &PeriodQuery,
    ) -> impl Future<Output = Result<Vec<Unoccupied>, RentsError>> + Send;

    /// Insert receivables, returning them with assigned ids in input order.
    fn create_receivables(
        &self,
        rows: Vec<NewReceivable>,
    ) -> impl Future<Output = Result<Vec<Receivable>, RentsError>> + Send;

    /// Overwrite receivables by id.
    fn update_receivables(
        &self,
        rows: Vec<Receivable>,
    ) -> impl Future<Output = Result<Vec<Receivable>, RentsError>> + Send;

    /// Delete a receivable. Returns false if it did not exist.
    fn delete_receivable(
        &self,
        id: ReceivableId,
    ) -> impl Future<Output = Result<bool, RentsError>> + Send;

    /// Insert payables, returning them with assigned ids in input order.
    fn create_payables(
        &self,
        rows: Vec<NewPayable>,
    ) -> impl Future<Output = Result<Vec<Payable>, RentsError>> + Send;

    /// Insert id-less payables and overwrite the rest by id.
    fn upsert_payables(
        &self,
        rows: Vec<Payable>,
    ) -> impl Future<Output = Result<Vec<Payable>, RentsError>> + Send;

    /// Delete a payable. Returns false if it did not exist.
    fn delete_payable(&self, id: PayableId)
    -> impl Future<Output = Result<bool, RentsError>> + Send;

    /// Insert an unoccupied marker.
    fn create_unoccupied(
        &self,
        marker: NewUnoccupied,
    ) -> impl Future<Output = Result<Unoccupied, RentsError>> + Send;

    /// Delete an unoccupied marker. Returns false if it did not exist.
    fn delete_unoccupied(
        &self,
        id: UnoccupiedId,
    ) -> impl Future<Output = Result<bool, RentsError>> + Send;
}

/// Result of toggling a property's vacancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new marker was persisted.
    Marked(Unoccupied),
    /// Existing markers were removed.
    Cleared,
    /// The property has tenants; nothing changed.
    Refused,
}

/// Rent reconciliation service.
pub struct RentsService<R: RentsRepository> {
    repo: Arc<R>,
}

impl<R: RentsRepository> Clone for RentsService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: RentsRepository> RentsService<R> {
    /// Create a new rents service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Fetch the snapshot for a scope.
    ///
    /// The three range queries run concurrently. If any fails, nothing is returned.
    pub async fn fetch_snapshot(&self, scope: &RentScope) -> Result<AccountingSnapshot, RentsError> {
        let query = scope.query();
        let (receivables, payables, unoccupied) = futures::try_join!(
            self.repo.list_receivables(&query),
            self.repo.list_payables(&query),
            self.repo.list_unoccupied(&query),
        )
        .inspect_err(|e| {
            error!(
                company_id = %scope.company_id,
                period = %scope.period,
                error = %e,
                "Failed to fetch rent snapshot"
            );
        })?;

        debug!(
            company_id = %scope.company_id,
            period = %scope.period,
            receivables = receivables.len(),
            payables = payables.len(),
            unoccupied = unoccupied.len(),
            "Fetched rent snapshot"
        );

        Ok(AccountingSnapshot::group(
            &scope.properties,
            receivables,
            payables,
            unoccupied,
        ))
    }

    /// Fetch a scope and open a workbench on it.
    pub async fn open(&self, scope: RentScope) -> Result<RentWorkbench, RentsError> {
        let snapshot = self.fetch_snapshot(&scope).await?;
        Ok(RentWorkbench::new(scope, snapshot))
    }

    /// Re-fetch and replace both snapshots, discarding edits.
    pub async fn refresh(&self, workbench: &mut RentWorkbench) -> Result<(), RentsError> {
        let snapshot = self.fetch_snapshot(workbench.scope()).await?;
        workbench.reset(snapshot);
        Ok(())
    }

    /// Persist the working snapshot.
    ///
    /// New receivables are created, every persisted receivable is updated, and payables that
    /// differ from the baseline are upserted. All batches run concurrently. Afterwards the
    /// snapshot is re-fetched whatever the outcome. If that re-fetch fails, the rows that were
    /// written are folded into the workbench with their new ids and the report says the refresh
    /// did not happen.
    pub async fn save(&self, workbench: &mut RentWorkbench) -> SaveReport {
        let plan = SavePlan::build(workbench.working(), workbench.baseline());
        let row_count = plan.row_count();

        let mut creates = Vec::new();
        let mut updates = Vec::new();
        let mut upserts = Vec::new();
        for PropertySavePlan {
            property_id,
            receivable_creates,
            receivable_updates,
            payable_upserts,
        } in plan.properties
        {
            if !receivable_creates.is_empty() {
                creates.push(self.create_batch(property_id, receivable_creates));
            }
            if !receivable_updates.is_empty() {
                updates.push(self.update_batch(property_id, receivable_updates));
            }
            if !payable_upserts.is_empty() {
                upserts.push(self.upsert_batch(property_id, payable_upserts));
            }
        }

        let (created, updated, upserted) =
            futures::join!(join_all(creates), join_all(updates), join_all(upserts));

        let mut report = SaveReport::default();
        let mut saved = SavedRows::default();
        for (rows, written) in created.into_iter().chain(updated).chain(upserted) {
            report.rows.extend(rows);
            saved.absorb(written);
        }

        for row in report.failures() {
            if let RowOutcome::Failed { reason } = &row.outcome {
                warn!(
                    property_id = %row.property_id,
                    kind = ?row.kind,
                    name = %row.name,
                    reason = %reason,
                    "Row was not saved"
                );
            }
        }

        match self.fetch_snapshot(workbench.scope()).await {
            Ok(snapshot) => {
                workbench.reset(snapshot);
                report.refreshed = true;
            }
            Err(e) => {
                workbench.adopt_saved(&saved);
                report.refresh_error = Some(e.to_string());
            }
        }

        info!(
            company_id = %workbench.scope().company_id,
            period = %workbench.period(),
            rows = row_count,
            failed = report.failures().count(),
            refreshed = report.refreshed,
            "Saved rents"
        );

        report
    }

    /// Toggle the vacancy marker of a property for the workbench month.
    ///
    /// Clearing always succeeds. Marking is refused while the property has tenants.
    pub async fn toggle_unoccupied(
        &self,
        workbench: &mut RentWorkbench,
        property_id: PropertyId,
        tenant_count: usize,
    ) -> Result<ToggleOutcome, RentsError> {
        let markers = workbench
            .working()
            .get(property_id)
            .ok_or(RentsError::PropertyNotInScope(property_id))?
            .unoccupied
            .clone();

        if !markers.is_empty() {
            for id in markers.iter().filter_map(|m| m.id) {
                self.repo.delete_unoccupied(id).await?;
            }
            workbench.commit(|s| s.with_property(property_id, |a| a.unoccupied.clear()));
            info!(property_id = %property_id, period = %workbench.period(), "Cleared unoccupied");
            return Ok(ToggleOutcome::Cleared);
        }

        if tenant_count > 0 {
            debug!(property_id = %property_id, tenant_count, "Refused to mark occupied property");
            return Ok(ToggleOutcome::Refused);
        }

        let marker = self
            .repo
            .create_unoccupied(NewUnoccupied {
                property_id,
                month: workbench.period().month_start(),
            })
            .await?;
        workbench.commit(|s| s.with_property(property_id, |a| a.unoccupied.push(marker.clone())));
        info!(property_id = %property_id, period = %workbench.period(), "Marked unoccupied");
        Ok(ToggleOutcome::Marked(marker))
    }

    /// Persist new payables immediately.
    ///
    /// Every row must belong to a property of the workbench, carry a valid amount and be dated
    /// inside its month.
    pub async fn create_payables(
        &self,
        workbench: &mut RentWorkbench,
        rows: Vec<NewPayable>,
    ) -> Result<Vec<Payable>, RentsError> {
        let window = workbench.period().window();
        for row in &rows {
            if !workbench.working().contains(row.property_id) {
                return Err(RentsError::PropertyNotInScope(row.property_id));
            }
            row.validate()?;
            if !window.contains(row.date) {
                return Err(RentsError::Validation(format!(
                    "payable '{}' is dated {} outside {}",
                    row.name,
                    row.date,
                    workbench.period()
                )));
            }
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.repo.create_payables(rows).await?;
        for payable in &created {
            workbench.commit(|s| {
                s.with_property(payable.property_id, |a| a.payables.push(payable.clone()))
            });
        }
        info!(count = created.len(), period = %workbench.period(), "Created payables");
        Ok(created)
    }

    /// Delete a payable immediately.
    ///
    /// Only payables shown in the workbench can be deleted. Returns false, without touching the
    /// backend, for any other id, and false if the backend had no such row.
    pub async fn delete_payable(
        &self,
        workbench: &mut RentWorkbench,
        id: PayableId,
    ) -> Result<bool, RentsError> {
        let in_scope = [workbench.working(), workbench.baseline()]
            .iter()
            .any(|snapshot| snapshot.iter().any(|(_, a)| a.payable(id).is_some()));
        if !in_scope {
            debug!(payable_id = %id, period = %workbench.period(), "Payable is not in this workbench");
            return Ok(false);
        }
        let deleted = self.repo.delete_payable(id).await?;
        workbench.commit(|s| Ok(s.without_payable(id)));
        Ok(deleted)
    }

    /// Remove a receivable by position.
    ///
    /// Persisted rows are deleted in the backend and dropped from both snapshots. Unsaved rows
    /// are only dropped from the working snapshot.
    pub async fn remove_receivable(
        &self,
        workbench: &mut RentWorkbench,
        property_id: PropertyId,
        index: usize,
    ) -> Result<Receivable, RentsError> {
        let receivable = workbench.receivable(property_id, index)?.clone();
        match receivable.id {
            Some(id) => {
                self.repo.delete_receivable(id).await?;
                workbench.commit(|s| Ok(s.without_receivable(id)));
            }
            None => {
                workbench.remove_receivable(property_id, index)?;
            }
        }
        Ok(receivable)
    }

    async fn create_batch(
        &self,
        property_id: PropertyId,
        rows: Vec<NewReceivable>,
    ) -> (Vec<RowResult>, SavedRows) {
        let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        match self.repo.create_receivables(rows).await {
            Ok(created) => {
                let results: Vec<RowResult> = names
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| RowResult {
                        kind: RowKind::ReceivableCreate,
                        property_id,
                        id: created.get(i).and_then(|r| r.id).map(ReceivableId::into_inner),
                        name,
                        outcome: RowOutcome::Ok,
                    })
                    .collect();
                let saved = SavedRows {
                    created_receivables: created,
                    ..SavedRows::default()
                };
                (results, saved)
            }
            Err(e) => (
                failed_rows(
                    RowKind::ReceivableCreate,
                    property_id,
                    names.into_iter().map(|name| (None, name)),
                    &e,
                ),
                SavedRows::default(),
            ),
        }
    }

    async fn update_batch(
        &self,
        property_id: PropertyId,
        rows: Vec<Receivable>,
    ) -> (Vec<RowResult>, SavedRows) {
        let keys: Vec<(Option<i64>, String)> = rows
            .iter()
            .map(|r| (r.id.map(ReceivableId::into_inner), r.name.clone()))
            .collect();
        match self.repo.update_receivables(rows).await {
            Ok(updated) => (
                ok_rows(RowKind::ReceivableUpdate, property_id, keys),
                SavedRows {
                    updated_receivables: updated,
                    ..SavedRows::default()
                },
            ),
            Err(e) => (
                failed_rows(RowKind::ReceivableUpdate, property_id, keys, &e),
                SavedRows::default(),
            ),
        }
    }

    async fn upsert_batch(
        &self,
        property_id: PropertyId,
        rows: Vec<Payable>,
    ) -> (Vec<RowResult>, SavedRows) {
        let names: Vec<(Option<i64>, String)> = rows
            .iter()
            .map(|p| (p.id.map(PayableId::into_inner), p.name.clone()))
            .collect();
        match self.repo.upsert_payables(rows).await {
            Ok(upserted) => {
                let mut saved = SavedRows::default();
                let results: Vec<RowResult> = names
                    .into_iter()
                    .zip(upserted)
                    .map(|((id, name), payable)| {
                        let result = RowResult {
                            kind: RowKind::PayableUpsert,
                            property_id,
                            id: id.or_else(|| payable.id.map(PayableId::into_inner)),
                            name,
                            outcome: RowOutcome::Ok,
                        };
                        if id.is_some() {
                            saved.updated_payables.push(payable);
                        } else {
                            saved.created_payables.push(payable);
                        }
                        result
                    })
                    .collect();
                (results, saved)
            }
            Err(e) => (
                failed_rows(RowKind::PayableUpsert, property_id, names, &e),
                SavedRows::default(),
            ),
        }
    }
}

fn ok_rows(
    kind: RowKind,
    property_id: PropertyId,
    keys: impl IntoIterator<Item = (Option<i64>, String)>,
) -> Vec<RowResult> {
    keys.into_iter()
        .map(|(id, name)| RowResult {
            kind,
            property_id,
            id,
            name,
            outcome: RowOutcome::Ok,
        })
        .collect()
}

fn failed_rows(
    kind: RowKind,
    property_id: PropertyId,
    keys: impl IntoIterator<Item = (Option<i64>, String)>,
    error: &RentsError,
) -> Vec<RowResult> {
    keys.into_iter()
        .map(|(id, name)| RowResult {
            kind,
            property_id,
            id,
            name,
            outcome: RowOutcome::Failed {
                reason: error.to_string(),
            },
        })
        .collect()
}
