//! Property tests for the rent reconciliation engine.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use rentbook_shared::types::{CompanyId, PropertyId, ReceivableId, TenantId};

use super::edits::has_edits;
use super::period::RentPeriod;
use super::snapshot::AccountingSnapshot;
use super::sync::sync_from_tenants;
use super::types::{PropertyRef, Receivable, RentScope, Tenant, TenantKey, TenantRoster};

fn receivable_strategy(property_id: i64) -> impl Strategy<Value = Receivable> {
    (
        proptest::option::of(1i64..10_000),
        0i64..500_000,
        0i64..500_000,
        1u32..=28,
        proptest::option::of(1u32..=28),
        "[A-Za-z]{1,8} [A-Za-z]{1,8}",
    )
        .prop_map(move |(id, paid, due, day, paid_day, name)| Receivable {
            id: id.map(ReceivableId::new),
            property_id: PropertyId::new(property_id),
            amount_paid: Decimal::new(paid, 2),
            amount_due: Decimal::new(due, 2),
            due_date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap_or_default(),
            paid_by: paid_day.and_then(|d| NaiveDate::from_ymd_opt(2026, 2, d)),
            name,
        })
}

fn snapshot_strategy() -> impl Strategy<Value = AccountingSnapshot> {
    (
        proptest::collection::vec(receivable_strategy(1), 0..6),
        proptest::collection::vec(receivable_strategy(2), 1..6),
    )
        .prop_map(|(first, second)| {
            let properties = [1, 2]
                .map(|id| PropertyRef {
                    id: PropertyId::new(id),
                    name: format!("Property {id}"),
                })
                .to_vec();
            let receivables = first.into_iter().chain(second).collect();
            AccountingSnapshot::group(&properties, receivables, vec![], vec![])
        })
}

proptest! {
    /// A receivable equals its clone, and changing any amount breaks equality.
    #[test]
    fn test_receivable_equality_discriminates(
        receivable in receivable_strategy(1),
        bump in 1i64..1000,
    ) {
        prop_assert_eq!(&receivable, &receivable.clone());

        let mut changed = receivable.clone();
        changed.amount_paid += Decimal::new(bump, 2);
        prop_assert_ne!(&receivable, &changed);

        let mut renamed = receivable.clone();
        renamed.name.push('x');
        prop_assert_ne!(&receivable, &renamed);
    }

    /// Mutating one receivable flags an edit; reverting it clears the flag.
    #[test]
    fn test_has_edits_round_trip(
        snapshot in snapshot_strategy(),
        bump in 1i64..1000,
    ) {
        prop_assert!(!has_edits(&snapshot, &snapshot));

        let original = snapshot.get(PropertyId::new(2)).unwrap().receivables[0].amount_due;
        let edited = snapshot
            .with_receivable(PropertyId::new(2), 0, |r| r.amount_due += Decimal::new(bump, 2))
            .unwrap();
        prop_assert!(has_edits(&edited, &snapshot));

        let reverted = edited
            .with_receivable(PropertyId::new(2), 0, |r| r.amount_due = original)
            .unwrap();
        prop_assert!(!has_edits(&reverted, &snapshot));
    }

    /// Grouping always yields exactly the requested properties.
    #[test]
    fn test_group_covers_requested_properties(
        requested in proptest::collection::btree_set(1i64..50, 0..10),
        rows in proptest::collection::vec(receivable_strategy(3), 0..5),
    ) {
        let properties: Vec<PropertyRef> = requested
            .iter()
            .map(|&id| PropertyRef { id: PropertyId::new(id), name: String::new() })
            .collect();
        let snapshot = AccountingSnapshot::group(&properties, rows, vec![], vec![]);

        prop_assert_eq!(snapshot.len(), requested.len());
        for id in &requested {
            prop_assert!(snapshot.contains(PropertyId::new(*id)));
        }
    }

    /// Due dates never leave the target month.
    #[test]
    fn test_due_date_clamped_to_month(
        year in 2000i32..2100,
        month in 1u32..=12,
        day in 1u32..=40,
    ) {
        let period = RentPeriod::new(year, month).unwrap();
        let due = period.due_date(day);

        prop_assert!(period.window().contains(due));
        prop_assert_eq!(chrono::Datelike::day(&due), day.min(period.days_in_month()));
    }

    /// Tenant keys ignore case and spacing.
    #[test]
    fn test_tenant_key_normalizes(
        first in "[a-z]{1,10}",
        last in "[a-z]{1,10}",
        pad in " {0,3}",
    ) {
        let shouted = format!("{pad}{}  {}{pad}", first.to_uppercase(), last.to_uppercase());
        prop_assert_eq!(
            TenantKey::from_display_name(&shouted),
            TenantKey::from_parts(&first, &last)
        );
    }

    /// Syncing twice from the same tenants gives the same snapshot.
    #[test]
    fn test_sync_is_idempotent(
        rents in proptest::collection::vec(1i64..5_000, 1..5),
        due_day in 1u32..=31,
    ) {
        let period = RentPeriod::new(2026, 2).unwrap();
        let scope = RentScope::new(
            CompanyId::new(1),
            period,
            vec![PropertyRef { id: PropertyId::new(1), name: "Oak".to_string() }],
        );
        let baseline = AccountingSnapshot::group(&scope.properties, vec![], vec![], vec![]);
        let mut roster = TenantRoster::new();
        roster.insert(
            PropertyId::new(1),
            rents
                .iter()
                .enumerate()
                .map(|(i, &rent)| Tenant {
                    id: TenantId::new(i64::try_from(i).unwrap_or_default()),
                    property_id: PropertyId::new(1),
                    first_name: format!("tenant{i}"),
                    last_name: "test".to_string(),
                    rent_amount: Decimal::from(rent),
                    rent_due_day: due_day,
                })
                .collect(),
        );

        let once = sync_from_tenants(&baseline, &baseline, &roster, period);
        let twice = sync_from_tenants(&once, &baseline, &roster, period);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.get(PropertyId::new(1)).unwrap().receivables.len(), rents.len());
    }
}
