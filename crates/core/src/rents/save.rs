//! Save planning and per-row save results.

use serde::{Deserialize, Serialize};

use rentbook_shared::types::PropertyId;

use super::snapshot::{AccountingSnapshot, PropertyAccounts};
use super::types::{NewReceivable, Payable, Receivable};

/// Writes needed to persist one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySavePlan {
    /// Owning property.
    pub property_id: PropertyId,
    /// Receivables without identity, to be created.
    pub receivable_creates: Vec<NewReceivable>,
    /// Persisted receivables, always re-submitted.
    pub receivable_updates: Vec<Receivable>,
    /// Payables that are new or changed since the last save.
    pub payable_upserts: Vec<Payable>,
}

impl PropertySavePlan {
    /// Partitions one property's working rows against its baseline.
    ///
    /// Persisted receivables are updated whether or not they changed. Payables are filtered:
    /// when the property has a baseline, only rows with no identical baseline row (same id)
    /// are kept; without a baseline every payable is submitted.
    #[must_use]
    pub fn build(
        property_id: PropertyId,
        working: &PropertyAccounts,
        baseline: Option<&PropertyAccounts>,
    ) -> Self {
        let (persisted, unsaved): (Vec<&Receivable>, Vec<&Receivable>) =
            working.receivables.iter().partition(|r| r.is_persisted());

        let payable_upserts = match baseline {
            Some(saved) => working
                .payables
                .iter()
                .filter(|p| {
                    p.id
                        .and_then(|id| saved.payable(id))
                        .is_none_or(|previous| previous != *p)
                })
                .cloned()
                .collect(),
            None => working.payables.clone(),
        };

        Self {
            property_id,
            receivable_creates: unsaved.into_iter().map(Receivable::without_identity).collect(),
            receivable_updates: persisted.into_iter().cloned().collect(),
            payable_upserts,
        }
    }

    /// Returns true if nothing needs writing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receivable_creates.is_empty()
            && self.receivable_updates.is_empty()
            && self.payable_upserts.is_empty()
    }
}

/// Writes needed to persist a whole working snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePlan {
    /// Per-property writes, only for properties with something to write.
    pub properties: Vec<PropertySavePlan>,
}

impl SavePlan {
    /// Builds the plan for every property of the working snapshot.
    #[must_use]
    pub fn build(working: &AccountingSnapshot, baseline: &AccountingSnapshot) -> Self {
        Self {
            properties: working
                .iter()
                .map(|(id, accounts)| PropertySavePlan::build(id, accounts, baseline.get(id)))
                .filter(|plan| !plan.is_empty())
                .collect(),
        }
    }

    /// Returns true if nothing needs writing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of rows the plan submits.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.properties
            .iter()
            .map(|p| p.receivable_creates.len() + p.receivable_updates.len() + p.payable_upserts.len())
            .sum()
    }
}

/// Rows a save wrote, as returned by the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SavedRows {
    pub(crate) created_receivables: Vec<Receivable>,
    pub(crate) updated_receivables: Vec<Receivable>,
    pub(crate) created_payables: Vec<Payable>,
    pub(crate) updated_payables: Vec<Payable>,
}

impl SavedRows {
    pub(crate) fn absorb(&mut self, other: Self) {
        self.created_receivables.extend(other.created_receivables);
        self.updated_receivables.extend(other.updated_receivables);
        self.created_payables.extend(other.created_payables);
        self.updated_payables.extend(other.updated_payables);
    }
}

/// Which write a row went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// New receivable.
    ReceivableCreate,
    /// Existing receivable.
    ReceivableUpdate,
    /// New or changed payable.
    PayableUpsert,
}

/// Result of writing one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    /// Persisted.
    Ok,
    /// Not persisted; the row will be missing or stale after the re-fetch.
    Failed {
        /// Backend message.
        reason: String,
    },
}

/// One row's save result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    /// Write path.
    pub kind: RowKind,
    /// Owning property.
    pub property_id: PropertyId,
    /// Row identity: the existing id for updates, the assigned id for successful creates.
    pub id: Option<i64>,
    /// Tenant or expense name, to tell the user which edit was lost.
    pub name: String,
    /// Outcome.
    pub outcome: RowOutcome,
}

impl RowResult {
    /// Returns true if the row failed to persist.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RowOutcome::Failed { .. })
    }
}

/// Result of a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    /// Every submitted row.
    pub rows: Vec<RowResult>,
    /// Whether the post-save re-fetch replaced both snapshots.
    pub refreshed: bool,
    /// Why the re-fetch failed, if it did.
    pub refresh_error: Option<String>,
}

impl SaveReport {
    /// Rows that persisted.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_failed()).count()
    }

    /// Successful rows of one kind.
    #[must_use]
    pub fn succeeded_of(&self, kind: RowKind) -> usize {
        self.rows
            .iter()
            .filter(|r| r.kind == kind && !r.is_failed())
            .count()
    }

    /// Rows that failed.
    pub fn failures(&self) -> impl Iterator<Item = &RowResult> {
        self.rows.iter().filter(|r| r.is_failed())
    }

    /// Returns true if every row persisted and the snapshots were refreshed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.refreshed && self.failures().next().is_none()
    }
}
