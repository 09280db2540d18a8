//! Unsaved-edit detection.

use super::snapshot::AccountingSnapshot;

/// Returns true if the working snapshot differs from the last-saved baseline.
///
/// Properties are compared by id. Within a property, receivables and payables must pair up
/// by structural equality regardless of order. Row counts are compared too, so removing a row
/// counts as an edit. Unoccupied markers are persisted immediately and are not compared.
#[must_use]
pub fn has_edits(working: &AccountingSnapshot, baseline: &AccountingSnapshot) -> bool {
    if working.len() != baseline.len() {
        return true;
    }

    working.iter().any(|(property_id, accounts)| {
        let Some(saved) = baseline.get(property_id) else {
            return true;
        };
        !same_rows(&accounts.receivables, &saved.receivables)
            || !same_rows(&accounts.payables, &saved.payables)
    })
}

/// Order-insensitive row comparison that respects duplicates.
///
/// Each left row consumes one equal right row. Quadratic; fine for the few dozen rows a
/// property carries in a month.
fn same_rows<T: PartialEq>(left: &[T], right: &[T]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut unmatched: Vec<&T> = right.iter().collect();
    left.iter().all(|row| {
        unmatched
            .iter()
            .position(|candidate| *candidate == row)
            .map(|i| unmatched.swap_remove(i))
            .is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rents::types::{Payable, PropertyRef, Receivable};
    use chrono::NaiveDate;
    use rentbook_shared::types::{PayableId, PropertyId, ReceivableId};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn receivable(id: i64, name: &str) -> Receivable {
        Receivable {
            id: Some(ReceivableId::new(id)),
            property_id: PropertyId::new(1),
            amount_paid: dec!(0),
            amount_due: dec!(800),
            due_date: date(1),
            paid_by: None,
            name: name.to_string(),
        }
    }

    fn payable(id: i64) -> Payable {
        Payable {
            id: Some(PayableId::new(id)),
            property_id: PropertyId::new(1),
            name: "Lawn".to_string(),
            amount: dec!(40),
            date: date(12),
            payment_method: "card".to_string(),
            detail: Some("biweekly".to_string()),
        }
    }

    fn baseline() -> AccountingSnapshot {
        AccountingSnapshot::group(
            &[
                PropertyRef {
                    id: PropertyId::new(1),
                    name: "A".to_string(),
                },
                PropertyRef {
                    id: PropertyId::new(2),
                    name: "B".to_string(),
                },
            ],
            vec![receivable(1, "Ann"), receivable(2, "Bob")],
            vec![payable(1)],
            vec![],
        )
    }

    #[test]
    fn test_identical_snapshots_have_no_edits() {
        let saved = baseline();
        assert!(!has_edits(&saved, &saved));
        assert!(!has_edits(&saved.clone(), &saved));
    }

    #[test]
    fn test_field_change_then_revert() {
        let saved = baseline();
        let edited = saved
            .with_receivable(PropertyId::new(1), 0, |r| r.amount_paid = dec!(800))
            .unwrap();
        assert!(has_edits(&edited, &saved));

        let reverted = edited
            .with_receivable(PropertyId::new(1), 0, |r| r.amount_paid = dec!(0))
            .unwrap();
        assert!(!has_edits(&reverted, &saved));
    }

    #[test]
    fn test_payable_change_is_an_edit() {
        let saved = baseline();
        let edited = saved
            .with_payable(PropertyId::new(1), 0, |p| p.detail = None)
            .unwrap();
        assert!(has_edits(&edited, &saved));
    }

    #[test]
    fn test_reordering_is_not_an_edit() {
        let saved = baseline();
        let reordered = saved
            .with_property(PropertyId::new(1), |a| a.receivables.reverse())
            .unwrap();
        assert!(!has_edits(&reordered, &saved));
    }

    #[test]
    fn test_removed_row_is_an_edit() {
        let saved = baseline();
        let fewer = saved
            .with_property(PropertyId::new(1), |a| {
                a.receivables.pop();
            })
            .unwrap();
        assert!(has_edits(&fewer, &saved));
        assert!(has_edits(&saved, &fewer));
    }

    #[test]
    fn test_property_count_mismatch_is_an_edit() {
        let saved = baseline();
        let mut extra = saved.clone();
        extra.insert(PropertyId::new(3), Default::default());
        assert!(has_edits(&extra, &saved));
    }

    #[test]
    fn test_property_missing_from_baseline_is_an_edit() {
        let saved = baseline();
        let mut swapped = AccountingSnapshot::new();
        swapped.insert(PropertyId::new(1), saved.get(PropertyId::new(1)).unwrap().clone());
        swapped.insert(PropertyId::new(9), Default::default());
        assert!(has_edits(&swapped, &saved));
    }

    #[test]
    fn test_unsaved_copy_of_saved_row_is_an_edit() {
        let saved = baseline();
        let unsaved = saved
            .with_receivable(PropertyId::new(1), 0, |r| r.id = None)
            .unwrap();
        assert!(has_edits(&unsaved, &saved));
    }

    #[test]
    fn test_duplicate_counts_matter() {
        let a = receivable(1, "Ann");
        let b = receivable(2, "Bob");
        let saved = AccountingSnapshot::group(
            &[PropertyRef {
                id: PropertyId::new(1),
                name: "A".to_string(),
            }],
            vec![a.clone(), a.clone(), b.clone()],
            vec![],
            vec![],
        );
        let edited = saved
            .with_property(PropertyId::new(1), |p| p.receivables = vec![a, b.clone(), b])
            .unwrap();

        assert!(has_edits(&edited, &saved));
        assert!(!has_edits(&saved.clone(), &saved));
    }
}
