//! The editable state for one company and month.

use serde::Serialize;
use tracing::info;

use rentbook_shared::types::PropertyId;

use super::edits::has_edits;
use super::error::RentsError;
use super::period::RentPeriod;
use super::rollup::{PortfolioRollup, RollupService};
use super::save::SavedRows;
use super::snapshot::{AccountingSnapshot, PropertyAccounts};
use super::sync::sync_from_tenants;
use super::types::{
    NewReceivable, Payable, PayableEdit, Receivable, ReceivableEdit, RentScope, TenantRoster,
};

/// Working snapshot plus the last-saved baseline it is diffed against.
///
/// Local edits touch only the working snapshot. Writes that are persisted immediately
/// (deletes, unoccupied toggles, bulk payable creation) are applied to both.
#[derive(Debug, Clone)]
pub struct RentWorkbench {
    scope: RentScope,
    working: AccountingSnapshot,
    baseline: AccountingSnapshot,
}

/// What the UI renders.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchView {
    /// Month shown.
    pub period: RentPeriod,
    /// Working snapshot.
    pub snapshot: AccountingSnapshot,
    /// Whether the working snapshot has unsaved edits.
    pub has_edits: bool,
    /// Totals over the working snapshot.
    pub rollup: PortfolioRollup,
}

impl RentWorkbench {
    /// Opens a workbench on a freshly fetched snapshot.
    #[must_use]
    pub fn new(scope: RentScope, snapshot: AccountingSnapshot) -> Self {
        Self {
            scope,
            baseline: snapshot.clone(),
            working: snapshot,
        }
    }

    /// Company, month and properties covered.
    #[must_use]
    pub const fn scope(&self) -> &RentScope {
        &self.scope
    }

    /// Month covered.
    #[must_use]
    pub const fn period(&self) -> RentPeriod {
        self.scope.period
    }

    /// The editable snapshot.
    #[must_use]
    pub const fn working(&self) -> &AccountingSnapshot {
        &self.working
    }

    /// The snapshot as of the last fetch or save.
    #[must_use]
    pub const fn baseline(&self) -> &AccountingSnapshot {
        &self.baseline
    }

    /// Returns true if the working snapshot differs from the baseline.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        has_edits(&self.working, &self.baseline)
    }

    /// Totals over the working snapshot.
    #[must_use]
    pub fn rollup(&self) -> PortfolioRollup {
        RollupService::portfolio(&self.working)
    }

    /// Renderable state.
    #[must_use]
    pub fn view(&self) -> WorkbenchView {
        WorkbenchView {
            period: self.period(),
            snapshot: self.working.clone(),
            has_edits: self.has_edits(),
            rollup: self.rollup(),
        }
    }

    /// Replaces both snapshots with fresh server state.
    pub fn reset(&mut self, snapshot: AccountingSnapshot) {
        self.baseline = snapshot.clone();
        self.working = snapshot;
    }

    /// Drops every unsaved edit.
    pub fn discard_edits(&mut self) {
        self.working = self.baseline.clone();
    }

    /// Rebuilds the working snapshot from the current tenants.
    pub fn sync(&mut self, tenants: &TenantRoster) {
        self.working = sync_from_tenants(&self.working, &self.baseline, tenants, self.period());
        info!(
            company_id = %self.scope.company_id,
            period = %self.period(),
            has_edits = self.has_edits(),
            "Synced rents from tenants"
        );
    }

    /// Edits one receivable of the working snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the property or row does not exist, or if the edited amounts are
    /// invalid. The snapshot is unchanged on error.
    pub fn edit_receivable(
        &mut self,
        property_id: PropertyId,
        index: usize,
        edit: &ReceivableEdit,
    ) -> Result<&Receivable, RentsError> {
        let next = self
            .working
            .with_receivable(property_id, index, |r| edit.apply(r))?;
        next.get(property_id)
            .and_then(|a| a.receivables.get(index))
            .ok_or_else(|| RentsError::receivable_not_found(property_id, index))?
            .validate()?;
        self.working = next;
        self.working
            .get(property_id)
            .and_then(|a| a.receivables.get(index))
            .ok_or_else(|| RentsError::receivable_not_found(property_id, index))
    }

    /// Edits one payable of the working snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the property or row does not exist, or if the edited amount is
    /// invalid. The snapshot is unchanged on error.
    pub fn edit_payable(
        &mut self,
        property_id: PropertyId,
        index: usize,
        edit: &PayableEdit,
    ) -> Result<&Payable, RentsError> {
        let next = self
            .working
            .with_payable(property_id, index, |p| edit.apply(p))?;
        next.get(property_id)
            .and_then(|a| a.payables.get(index))
            .ok_or_else(|| RentsError::payable_not_found(property_id, index))?
            .validate()?;
        self.working = next;
        self.working
            .get(property_id)
            .and_then(|a| a.payables.get(index))
            .ok_or_else(|| RentsError::payable_not_found(property_id, index))
    }

    /// Adds a manual receivable to the working snapshot, returning its index.
    ///
    /// The next sync drops it unless its name matches a current tenant.
    ///
    /// # Errors
    ///
    /// Returns `RentsError::PropertyNotInScope` if the property is not in the snapshot, or
    /// `RentsError::Validation` if an amount is invalid.
    pub fn add_receivable(&mut self, receivable: NewReceivable) -> Result<usize, RentsError> {
        let property_id = receivable.property_id;
        let receivable = receivable.with_id(None);
        receivable.validate()?;
        self.working = self
            .working
            .with_property(property_id, |a| a.receivables.push(receivable))?;
        Ok(self
            .working
            .get(property_id)
            .map_or(0, |a| a.receivables.len().saturating_sub(1)))
    }

    /// Returns the working receivable at a position.
    ///
    /// # Errors
    ///
    /// Returns an error if the property or row does not exist.
    pub fn receivable(&self, property_id: PropertyId, index: usize) -> Result<&Receivable, RentsError> {
        self.working
            .get(property_id)
            .ok_or(RentsError::PropertyNotInScope(property_id))?
            .receivables
            .get(index)
            .ok_or_else(|| RentsError::receivable_not_found(property_id, index))
    }

    /// Removes a working receivable by position without touching the baseline.
    pub(crate) fn remove_receivable(
        &mut self,
        property_id: PropertyId,
        index: usize,
    ) -> Result<Receivable, RentsError> {
        let removed = self.receivable(property_id, index)?.clone();
        self.working = self.working.with_property(property_id, |a| {
            a.receivables.remove(index);
        })?;
        Ok(removed)
    }

    /// Records what a save wrote when the follow-up fetch failed.
    ///
    /// Unsaved working rows take the identities the data source assigned and the baseline takes
    /// every written row, so only rows that failed still count as edits and nothing is created
    /// twice by the next save.
    pub(crate) fn adopt_saved(&mut self, saved: &SavedRows) {
        for created in &saved.created_receivables {
            let Some(id) = created.id else { continue };
            let unsaved = Receivable {
                id: None,
                ..created.clone()
            };
            self.update_working(created.property_id, |a| {
                if let Some(row) = a.receivables.iter_mut().find(|r| **r == unsaved) {
                    row.id = Some(id);
                }
            });
        }
        for created in &saved.created_payables {
            let Some(id) = created.id else { continue };
            let unsaved = Payable {
                id: None,
                ..created.clone()
            };
            self.update_working(created.property_id, |a| {
                if let Some(row) = a.payables.iter_mut().find(|p| **p == unsaved) {
                    row.id = Some(id);
                }
            });
        }

        for row in saved
            .created_receivables
            .iter()
            .chain(&saved.updated_receivables)
        {
            self.commit_baseline(row.property_id, |a| {
                put_by_id(&mut a.receivables, row, |r| r.id);
            });
        }
        for row in saved.created_payables.iter().chain(&saved.updated_payables) {
            self.commit_baseline(row.property_id, |a| {
                put_by_id(&mut a.payables, row, |p| p.id);
            });
        }
    }

    fn update_working<F>(&mut self, property_id: PropertyId, update: F)
    where
        F: FnOnce(&mut PropertyAccounts),
    {
        if let Ok(next) = self.working.with_property(property_id, update) {
            self.working = next;
        }
    }

    fn commit_baseline<F>(&mut self, property_id: PropertyId, update: F)
    where
        F: FnOnce(&mut PropertyAccounts),
    {
        if let Ok(next) = self.baseline.with_property(property_id, update) {
            self.baseline = next;
        }
    }

    /// Applies a persisted change to both snapshots.
    ///
    /// Properties missing from the baseline only change in the working snapshot.
    pub(crate) fn commit<F>(&mut self, change: F)
    where
        F: Fn(&AccountingSnapshot) -> Result<AccountingSnapshot, RentsError>,
    {
        if let Ok(next) = change(&self.working) {
            self.working = next;
        }
        if let Ok(next) = change(&self.baseline) {
            self.baseline = next;
        }
    }
}

/// Replaces the row with the same identity, or appends it.
fn put_by_id<T: Clone, I: PartialEq>(rows: &mut Vec<T>, row: &T, id: impl Fn(&T) -> Option<I>) {
    let key = id(row);
    match rows
        .iter_mut()
        .find(|existing| key.is_some() && id(&**existing) == key)
    {
        Some(existing) => existing.clone_from(row),
        None => rows.push(row.clone()),
    }
}
