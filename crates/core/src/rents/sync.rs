//! Rebuilds receivables from the current tenant roster.

use rust_decimal::Decimal;
use tracing::debug;

use super::period::RentPeriod;
use super::snapshot::{AccountingSnapshot, PropertyAccounts};
use super::types::{Receivable, Tenant, TenantKey, TenantRoster};

/// Produces a fresh snapshot from the current tenants.
///
/// For every property in `current`:
/// - payables and unoccupied markers are carried forward from `baseline`;
/// - each tenant reuses the baseline receivable whose name matches its [`TenantKey`], so
///   persisted rows keep their id, amounts and dates;
/// - a tenant without a match gets a new unsaved receivable for the tenant's rent, unless the
///   property is marked unoccupied.
///
/// Receivables that match no current tenant are dropped. Each baseline receivable is reused by
/// at most one tenant; a second tenant with the same name gets a fresh row.
#[must_use]
pub fn sync_from_tenants(
    current: &AccountingSnapshot,
    baseline: &AccountingSnapshot,
    tenants: &TenantRoster,
    period: RentPeriod,
) -> AccountingSnapshot {
    let mut next = AccountingSnapshot::new();

    for (property_id, accounts) in current.iter() {
        let saved = baseline.get(property_id);
        let payables = saved.map(|s| s.payables.clone()).unwrap_or_default();
        let unoccupied = saved.map(|s| s.unoccupied.clone()).unwrap_or_default();
        let vacant = !unoccupied.is_empty();

        let mut available: Vec<&Receivable> =
            saved.map(|s| s.receivables.iter().collect()).unwrap_or_default();
        let mut receivables = Vec::new();

        for tenant in tenants.get(&property_id).map_or(&[][..], Vec::as_slice) {
            let key = tenant.key();
            let position = available
                .iter()
                .position(|r| TenantKey::from_display_name(&r.name) == key);
            let matched = position.map(|index| available.remove(index));

            match matched {
                Some(existing) => receivables.push(existing.clone()),
                None if vacant => {}
                None => receivables.push(synthesize(tenant, period)),
            }
        }

        debug!(
            property_id = %property_id,
            receivables = receivables.len(),
            vacant,
            "Synced property receivables"
        );

        next.insert(
            property_id,
            PropertyAccounts {
                property_name: accounts.property_name.clone(),
                receivables,
                payables,
                unoccupied,
            },
        );
    }

    next
}

/// New unsaved receivable for a tenant's monthly rent.
fn synthesize(tenant: &Tenant, period: RentPeriod) -> Receivable {
    Receivable {
        id: None,
        property_id: tenant.property_id,
        amount_paid: Decimal::ZERO,
        amount_due: tenant.rent_amount,
        due_date: period.due_date(tenant.rent_due_day),
        paid_by: None,
        name: tenant.display_name(),
    }
}
