//! Rent reconciliation: monthly snapshots of receivables, payables and vacancy markers,
//! synced from tenants, diffed against the last save, and persisted in batches.

pub mod edits;
pub mod error;
pub mod period;
pub mod rollup;
pub mod save;
pub mod service;
pub mod snapshot;
pub mod sync;
pub mod types;
pub mod workbench;

#[cfg(test)]
mod tests;

pub use edits::has_edits;
pub use error::RentsError;
pub use period::{DateWindow, RentPeriod};
pub use rollup::{PortfolioRollup, PropertyRollup, RollupService};
pub use save::{PropertySavePlan, RowKind, RowOutcome, RowResult, SavePlan, SaveReport};
pub use service::{RentsRepository, RentsService, ToggleOutcome};
pub use snapshot::{AccountingSnapshot, PropertyAccounts};
pub use sync::sync_from_tenants;
pub use types::{
    NOT_FOUND_NAME, NewPayable, NewReceivable, NewUnoccupied, Payable, PayableEdit, PeriodQuery,
    PropertyRef, Receivable, ReceivableEdit, RentScope, Tenant, TenantKey, TenantRoster,
    Unoccupied,
};
pub use workbench::{RentWorkbench, WorkbenchView};
