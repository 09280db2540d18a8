//! Per-property and portfolio financial rollups.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentbook_shared::types::PropertyId;

use super::snapshot::{AccountingSnapshot, PropertyAccounts};
use super::types::Receivable;

/// Month totals for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRollup {
    /// Property.
    pub property_id: PropertyId,
    /// Display name.
    pub property_name: String,
    /// Sum of amounts due.
    pub total_due: Decimal,
    /// Sum of amounts paid.
    pub total_paid: Decimal,
    /// Unpaid rent; overpayments do not offset other tenants.
    pub outstanding: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// Collected rent minus expenses.
    pub net: Decimal,
    /// Number of receivables.
    pub receivable_count: usize,
    /// Number of payables.
    pub payable_count: usize,
    /// Whether the property is marked unoccupied.
    pub unoccupied: bool,
}

/// Month totals across all properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRollup {
    /// Per-property totals in property order.
    pub properties: Vec<PropertyRollup>,
    /// Sum of amounts due.
    pub total_due: Decimal,
    /// Sum of amounts paid.
    pub total_paid: Decimal,
    /// Unpaid rent.
    pub outstanding: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// Collected rent minus expenses.
    pub net: Decimal,
    /// Properties without a vacancy marker.
    pub occupied_count: usize,
    /// Properties with a vacancy marker.
    pub unoccupied_count: usize,
    /// Paid / due * 100, two decimals; zero when nothing is due.
    pub collection_rate: Decimal,
}

/// Rollup calculations.
pub struct RollupService;

impl RollupService {
    /// Totals for one property.
    #[must_use]
    pub fn property(property_id: PropertyId, accounts: &PropertyAccounts) -> PropertyRollup {
        let total_due = total(accounts.receivables.iter().map(|r| r.amount_due));
        let total_paid = total(accounts.receivables.iter().map(|r| r.amount_paid));
        let outstanding = total(accounts.receivables.iter().map(Receivable::outstanding));
        let total_expenses = total(accounts.payables.iter().map(|p| p.amount));

        PropertyRollup {
            property_id,
            property_name: accounts.property_name.clone(),
            total_due,
            total_paid,
            outstanding,
            total_expenses,
            net: total_paid.saturating_sub(total_expenses),
            receivable_count: accounts.receivables.len(),
            payable_count: accounts.payables.len(),
            unoccupied: accounts.is_unoccupied(),
        }
    }

    /// Totals across the snapshot.
    #[must_use]
    pub fn portfolio(snapshot: &AccountingSnapshot) -> PortfolioRollup {
        let properties: Vec<PropertyRollup> = snapshot
            .iter()
            .map(|(id, accounts)| Self::property(id, accounts))
            .collect();

        let total_due = total(properties.iter().map(|p| p.total_due));
        let total_paid = total(properties.iter().map(|p| p.total_paid));
        let outstanding = total(properties.iter().map(|p| p.outstanding));
        let total_expenses = total(properties.iter().map(|p| p.total_expenses));
        let unoccupied_count = properties.iter().filter(|p| p.unoccupied).count();

        PortfolioRollup {
            occupied_count: properties.len() - unoccupied_count,
            unoccupied_count,
            collection_rate: Self::collection_rate(total_paid, total_due),
            total_due,
            total_paid,
            outstanding,
            total_expenses,
            net: total_paid.saturating_sub(total_expenses),
            properties,
        }
    }

    /// Paid as a percentage of due, rounded to two decimals.
    ///
    /// Zero when nothing is due; saturates at `Decimal::MAX` when the ratio overflows.
    #[must_use]
    pub fn collection_rate(paid: Decimal, due: Decimal) -> Decimal {
        if due.is_zero() {
            return Decimal::ZERO;
        }
        paid.checked_div(due)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::MAX, |rate| rate.round_dp(2))
    }
}

/// Saturating sum.
fn total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rents::types::{Payable, PropertyRef, Receivable, Unoccupied};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn receivable(property_id: i64, due: Decimal, paid: Decimal) -> Receivable {
        Receivable {
            id: None,
            property_id: PropertyId::new(property_id),
            amount_paid: paid,
            amount_due: due,
            due_date: date(1),
            paid_by: None,
            name: "T".to_string(),
        }
    }

    fn payable(property_id: i64, amount: Decimal) -> Payable {
        Payable {
            id: None,
            property_id: PropertyId::new(property_id),
            name: "Repair".to_string(),
            amount,
            date: date(5),
            payment_method: "cash".to_string(),
            detail: None,
        }
    }

    fn snapshot() -> AccountingSnapshot {
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
            vec![
                receivable(1, dec!(1000), dec!(1000)),
                receivable(1, dec!(800), dec!(300)),
                receivable(1, dec!(500), dec!(600)),
            ],
            vec![payable(1, dec!(250)), payable(2, dec!(75.50))],
            vec![Unoccupied {
                id: None,
                property_id: PropertyId::new(2),
                month: date(1),
            }],
        )
    }

    #[test]
    fn test_property_rollup() {
        let snapshot = snapshot();
        let rollup =
            RollupService::property(PropertyId::new(1), snapshot.get(PropertyId::new(1)).unwrap());

        assert_eq!(rollup.total_due, dec!(2300));
        assert_eq!(rollup.total_paid, dec!(1900));
        // The 100 overpayment does not offset the 500 shortfall.
        assert_eq!(rollup.outstanding, dec!(500));
        assert_eq!(rollup.total_expenses, dec!(250));
        assert_eq!(rollup.net, dec!(1650));
        assert_eq!(rollup.receivable_count, 3);
        assert!(!rollup.unoccupied);
    }

    #[test]
    fn test_portfolio_rollup() {
        let rollup = RollupService::portfolio(&snapshot());

        assert_eq!(rollup.properties.len(), 2);
        assert_eq!(rollup.total_due, dec!(2300));
        assert_eq!(rollup.total_expenses, dec!(325.50));
        assert_eq!(rollup.net, dec!(1574.50));
        assert_eq!(rollup.occupied_count, 1);
        assert_eq!(rollup.unoccupied_count, 1);
        assert_eq!(rollup.collection_rate, dec!(82.61));
    }

    #[test]
    fn test_collection_rate_zero_when_nothing_due() {
        assert_eq!(RollupService::collection_rate(dec!(50), dec!(0)), dec!(0));
        let rollup = RollupService::portfolio(&AccountingSnapshot::new());
        assert_eq!(rollup.collection_rate, dec!(0));
        assert_eq!(rollup.occupied_count, 0);
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        assert_eq!(
            RollupService::collection_rate(dec!(1e27), dec!(0.001)),
            Decimal::MAX
        );

        let huge = AccountingSnapshot::group(
            &[PropertyRef {
                id: PropertyId::new(1),
                name: "A".to_string(),
            }],
            vec![
                receivable(1, Decimal::MAX, Decimal::MAX),
                receivable(1, Decimal::MAX, dec!(0)),
            ],
            vec![payable(1, Decimal::MAX)],
            vec![],
        );
        let rollup = RollupService::portfolio(&huge);

        assert_eq!(rollup.total_due, Decimal::MAX);
        assert_eq!(rollup.outstanding, Decimal::MAX);
        assert_eq!(rollup.net, dec!(0));
        assert_eq!(rollup.collection_rate, dec!(100));
    }
}
