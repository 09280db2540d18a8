//! Rent accounting record types.
//!
//! Every record derives `PartialEq`: two records are equal only when every field matches,
//! identity included, so an unsaved row never equals its persisted counterpart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use rentbook_shared::types::{
    CompanyId, PayableId, PropertyId, ReceivableId, TenantId, UnoccupiedId,
};

use super::error::RentsError;
use super::period::{DateWindow, RentPeriod};

/// Placeholder shown when a property id has no known name.
pub const NOT_FOUND_NAME: &str = "not found";

/// Largest amount a row may carry: 9,999,999,999.99, the `NUMERIC(12,2)` column limit.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Rejects negative amounts and amounts above [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns `RentsError::Validation` naming the field and the row.
pub fn validate_amount(row: &str, field: &str, amount: Decimal) -> Result<(), RentsError> {
    if amount < Decimal::ZERO {
        return Err(RentsError::Validation(format!("{field} of '{row}' is negative")));
    }
    if amount > MAX_AMOUNT {
        return Err(RentsError::Validation(format!(
            "{field} of '{row}' exceeds {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Rent owed by a tenant for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receivable {
    /// Database identity; `None` until persisted.
    pub id: Option<ReceivableId>,
    /// Owning property.
    pub property_id: PropertyId,
    /// Amount collected so far.
    pub amount_paid: Decimal,
    /// Amount owed.
    pub amount_due: Decimal,
    /// Date the rent is due.
    pub due_date: NaiveDate,
    /// Date the rent was paid, if it has been.
    pub paid_by: Option<NaiveDate>,
    /// Tenant display name.
    pub name: String,
}

impl Receivable {
    /// Returns true if the row has been persisted.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Clones the row without its identity, ready for a create call.
    #[must_use]
    pub fn without_identity(&self) -> NewReceivable {
        NewReceivable {
            property_id: self.property_id,
            amount_paid: self.amount_paid,
            amount_due: self.amount_due,
            due_date: self.due_date,
            paid_by: self.paid_by,
            name: self.name.clone(),
        }
    }

    /// Amount still owed, never negative.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.amount_due
            .saturating_sub(self.amount_paid)
            .max(Decimal::ZERO)
    }

    /// Checks both amounts.
    ///
    /// # Errors
    ///
    /// Returns `RentsError::Validation` if an amount is negative or too large.
    pub fn validate(&self) -> Result<(), RentsError> {
        validate_amount(&self.name, "amount_paid", self.amount_paid)?;
        validate_amount(&self.name, "amount_due", self.amount_due)
    }
}

/// A receivable that has not been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReceivable {
    /// Owning property.
    pub property_id: PropertyId,
    /// Amount collected so far.
    #[serde(default)]
    pub amount_paid: Decimal,
    /// Amount owed.
    pub amount_due: Decimal,
    /// Date the rent is due.
    pub due_date: NaiveDate,
    /// Date the rent was paid.
    #[serde(default)]
    pub paid_by: Option<NaiveDate>,
    /// Tenant display name.
    pub name: String,
}

impl NewReceivable {
    /// Attaches an identity, as the data source does on create.
    #[must_use]
    pub fn with_id(self, id: Option<ReceivableId>) -> Receivable {
        Receivable {
            id,
            property_id: self.property_id,
            amount_paid: self.amount_paid,
            amount_due: self.amount_due,
            due_date: self.due_date,
            paid_by: self.paid_by,
            name: self.name,
        }
    }
}

/// An expense charged against a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payable {
    /// Database identity; `None` until persisted.
    pub id: Option<PayableId>,
    /// Owning property.
    pub property_id: PropertyId,
    /// Expense name.
    pub name: String,
    /// Amount spent.
    pub amount: Decimal,
    /// Date of the expense.
    pub date: NaiveDate,
    /// How the expense was paid (cash, check, card...).
    pub payment_method: String,
    /// Free-text detail.
    pub detail: Option<String>,
}

impl Payable {
    /// Checks the amount.
    ///
    /// # Errors
    ///
    /// Returns `RentsError::Validation` if the amount is negative or too large.
    pub fn validate(&self) -> Result<(), RentsError> {
        validate_amount(&self.name, "amount", self.amount)
    }
}

/// A payable that has not been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayable {
    /// Owning property.
    pub property_id: PropertyId,
    /// Expense name.
    pub name: String,
    /// Amount spent.
    pub amount: Decimal,
    /// Date of the expense.
    pub date: NaiveDate,
    /// How the expense was paid.
    pub payment_method: String,
    /// Free-text detail.
    #[serde(default)]
    pub detail: Option<String>,
}

impl NewPayable {
    /// Checks the amount.
    ///
    /// # Errors
    ///
    /// Returns `RentsError::Validation` if the amount is negative or too large.
    pub fn validate(&self) -> Result<(), RentsError> {
        validate_amount(&self.name, "amount", self.amount)
    }

    /// Attaches an identity, as the data source does on create.
    #[must_use]
    pub fn with_id(self, id: Option<PayableId>) -> Payable {
        Payable {
            id,
            property_id: self.property_id,
            name: self.name,
            amount: self.amount,
            date: self.date,
            payment_method: self.payment_method,
            detail: self.detail,
        }
    }
}

/// Marks a property as vacant for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unoccupied {
    /// Database identity; `None` until persisted.
    pub id: Option<UnoccupiedId>,
    /// Vacant property.
    pub property_id: PropertyId,
    /// First day of the vacant month.
    pub month: NaiveDate,
}

/// An unoccupied marker that has not been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUnoccupied {
    /// Vacant property.
    pub property_id: PropertyId,
    /// First day of the vacant month.
    pub month: NaiveDate,
}

/// A tenant as reported by the tenant source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identity.
    pub id: TenantId,
    /// Property the tenant rents.
    pub property_id: PropertyId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Monthly rent.
    pub rent_amount: Decimal,
    /// Day of the month rent is due (1-31).
    pub rent_due_day: u32,
}

impl Tenant {
    /// Full display name, "First Last".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Join key used to find this tenant's saved receivable.
    #[must_use]
    pub fn key(&self) -> TenantKey {
        TenantKey::from_parts(&self.first_name, &self.last_name)
    }
}

/// Current tenants per property.
pub type TenantRoster = BTreeMap<PropertyId, Vec<Tenant>>;

/// Normalized tenant name used to match tenants to receivables.
///
/// Lowercased with whitespace runs collapsed, so `"JOHN SMITH"` and `" john   smith "` match.
/// This is a best-effort identity: two tenants with the same name are indistinguishable, and
/// renaming a tenant orphans their saved receivable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantKey(String);

impl TenantKey {
    /// Builds the key from first and last name.
    #[must_use]
    pub fn from_parts(first_name: &str, last_name: &str) -> Self {
        Self::from_display_name(&format!("{first_name} {last_name}"))
    }

    /// Builds the key from a full display name.
    #[must_use]
    pub fn from_display_name(name: &str) -> Self {
        Self(
            name.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        )
    }

    /// The normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A property taking part in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    /// Property identity.
    pub id: PropertyId,
    /// Display name.
    pub name: String,
}

/// What a snapshot covers: one company, one month, a set of active properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentScope {
    /// Owning company.
    pub company_id: CompanyId,
    /// Month covered.
    pub period: RentPeriod,
    /// Active properties, in display order.
    pub properties: Vec<PropertyRef>,
}

impl RentScope {
    /// Creates a scope.
    #[must_use]
    pub fn new(company_id: CompanyId, period: RentPeriod, properties: Vec<PropertyRef>) -> Self {
        Self {
            company_id,
            period,
            properties,
        }
    }

    /// Ids of the active properties.
    #[must_use]
    pub fn property_ids(&self) -> Vec<PropertyId> {
        self.properties.iter().map(|p| p.id).collect()
    }

    /// Returns true if the property is active in this scope.
    #[must_use]
    pub fn contains(&self, property_id: PropertyId) -> bool {
        self.properties.iter().any(|p| p.id == property_id)
    }

    /// Range query arguments for this scope.
    #[must_use]
    pub fn query(&self) -> PeriodQuery {
        PeriodQuery {
            company_id: self.company_id,
            window: self.period.window(),
            property_ids: self.property_ids(),
        }
    }
}

/// Arguments shared by the three snapshot range queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    /// Owning company.
    pub company_id: CompanyId,
    /// Date range `[start, end)`.
    pub window: DateWindow,
    /// Properties to include.
    pub property_ids: Vec<PropertyId>,
}

/// Field changes to a receivable. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReceivableEdit {
    /// New amount paid.
    pub amount_paid: Option<Decimal>,
    /// New amount due.
    pub amount_due: Option<Decimal>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New paid-by date; `Some(None)` clears it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub paid_by: Option<Option<NaiveDate>>,
    /// New tenant name.
    pub name: Option<String>,
}

impl ReceivableEdit {
    /// Applies the edit in place.
    pub fn apply(&self, receivable: &mut Receivable) {
        if let Some(amount_paid) = self.amount_paid {
            receivable.amount_paid = amount_paid;
        }
        if let Some(amount_due) = self.amount_due {
            receivable.amount_due = amount_due;
        }
        if let Some(due_date) = self.due_date {
            receivable.due_date = due_date;
        }
        if let Some(paid_by) = self.paid_by {
            receivable.paid_by = paid_by;
        }
        if let Some(name) = &self.name {
            receivable.name.clone_from(name);
        }
    }
}

/// Field changes to a payable. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayableEdit {
    /// New expense name.
    pub name: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New payment method.
    pub payment_method: Option<String>,
    /// New detail; `Some(None)` clears it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub detail: Option<Option<String>>,
}

impl PayableEdit {
    /// Applies the edit in place.
    pub fn apply(&self, payable: &mut Payable) {
        if let Some(name) = &self.name {
            payable.name.clone_from(name);
        }
        if let Some(amount) = self.amount {
            payable.amount = amount;
        }
        if let Some(date) = self.date {
            payable.date = date;
        }
        if let Some(method) = &self.payment_method {
            payable.payment_method.clone_from(method);
        }
        if let Some(detail) = &self.detail {
            payable.detail.clone_from(detail);
        }
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn receivable() -> Receivable {
        Receivable {
            id: Some(ReceivableId::new(1)),
            property_id: PropertyId::new(5),
            amount_paid: dec!(0),
            amount_due: dec!(1200),
            due_date: date(2026, 3, 1),
            paid_by: None,
            name: "John Smith".to_string(),
        }
    }

    #[test]
    fn test_receivable_identity_participates_in_equality() {
        let saved = receivable();
        let unsaved = saved.without_identity().with_id(None);

        assert_ne!(saved, unsaved);
        assert_eq!(saved.without_identity().with_id(saved.id), saved);
    }

    fn payable() -> Payable {
        Payable {
            id: Some(PayableId::new(3)),
            property_id: PropertyId::new(5),
            name: "Plumber".to_string(),
            amount: dec!(180),
            date: date(2026, 3, 12),
            payment_method: "card".to_string(),
            detail: Some("kitchen sink".to_string()),
        }
    }

    #[rstest]
    #[case::id(|r: &mut Receivable| r.id = Some(ReceivableId::new(2)))]
    #[case::no_id(|r: &mut Receivable| r.id = None)]
    #[case::property(|r: &mut Receivable| r.property_id = PropertyId::new(6))]
    #[case::amount_paid(|r: &mut Receivable| r.amount_paid = dec!(0.01))]
    #[case::amount_due(|r: &mut Receivable| r.amount_due = dec!(1199.99))]
    #[case::due_date(|r: &mut Receivable| r.due_date = date(2026, 3, 2))]
    #[case::paid_by(|r: &mut Receivable| r.paid_by = Some(date(2026, 3, 1)))]
    #[case::name(|r: &mut Receivable| r.name = "John Smyth".to_string())]
    fn test_any_receivable_field_breaks_equality(#[case] change: fn(&mut Receivable)) {
        let original = receivable();
        let mut changed = original.clone();
        change(&mut changed);
        assert_ne!(original, changed);
    }

    #[rstest]
    #[case::id(|p: &mut Payable| p.id = Some(PayableId::new(4)))]
    #[case::no_id(|p: &mut Payable| p.id = None)]
    #[case::property(|p: &mut Payable| p.property_id = PropertyId::new(6))]
    #[case::name(|p: &mut Payable| p.name = "Plumbing".to_string())]
    #[case::amount(|p: &mut Payable| p.amount = dec!(180.01))]
    #[case::date(|p: &mut Payable| p.date = date(2026, 3, 13))]
    #[case::payment_method(|p: &mut Payable| p.payment_method = "cash".to_string())]
    #[case::detail(|p: &mut Payable| p.detail = None)]
    fn test_any_payable_field_breaks_equality(#[case] change: fn(&mut Payable)) {
        let original = payable();
        let mut changed = original.clone();
        change(&mut changed);
        assert_ne!(original, changed);
        assert_eq!(original, original.clone());
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(9999999999.99), true)]
    #[case(dec!(-0.01), false)]
    #[case(dec!(10000000000), false)]
    fn test_validate_amount_bounds(#[case] amount: Decimal, #[case] valid: bool) {
        assert_eq!(validate_amount("Rent", "amount_due", amount).is_ok(), valid);
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
    }

    #[test]
    fn test_outstanding_never_negative() {
        let mut r = receivable();
        r.amount_paid = dec!(1500);
        assert_eq!(r.outstanding(), dec!(0));

        r.amount_paid = dec!(200);
        assert_eq!(r.outstanding(), dec!(1000));
    }

    #[test]
    fn test_tenant_key_normalizes_case_and_whitespace() {
        assert_eq!(
            TenantKey::from_display_name("JOHN SMITH"),
            TenantKey::from_parts(" john  ", "  smith")
        );
        assert_eq!(
            TenantKey::from_display_name("  Mary\tAnn   Lee ").as_str(),
            "mary ann lee"
        );
        assert_ne!(
            TenantKey::from_display_name("John Smith"),
            TenantKey::from_display_name("Jon Smith")
        );
    }

    #[test]
    fn test_tenant_display_name_trims_parts() {
        let tenant = Tenant {
            id: TenantId::new(1),
            property_id: PropertyId::new(5),
            first_name: " Jane ".to_string(),
            last_name: "Doe ".to_string(),
            rent_amount: dec!(950),
            rent_due_day: 5,
        };
        assert_eq!(tenant.display_name(), "Jane Doe");
        assert_eq!(tenant.key().as_str(), "jane doe");
    }

    #[test]
    fn test_receivable_edit_applies_only_given_fields() {
        let mut r = receivable();
        let edit = ReceivableEdit {
            amount_paid: Some(dec!(600)),
            paid_by: Some(Some(date(2026, 3, 4))),
            ..ReceivableEdit::default()
        };
        edit.apply(&mut r);

        assert_eq!(r.amount_paid, dec!(600));
        assert_eq!(r.paid_by, Some(date(2026, 3, 4)));
        assert_eq!(r.amount_due, dec!(1200));
        assert_eq!(r.name, "John Smith");
    }

    #[test]
    fn test_edit_distinguishes_null_from_absent() {
        let clear: ReceivableEdit = serde_json::from_str(r#"{"paid_by": null}"#).unwrap();
        assert_eq!(clear.paid_by, Some(None));

        let untouched: ReceivableEdit = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.paid_by, None);

        let detail: PayableEdit = serde_json::from_str(r#"{"detail": null}"#).unwrap();
        assert_eq!(detail.detail, Some(None));
    }

    #[test]
    fn test_scope_query_covers_month() {
        let scope = RentScope::new(
            CompanyId::new(1),
            RentPeriod::new(2026, 3).unwrap(),
            vec![
                PropertyRef {
                    id: PropertyId::new(1),
                    name: "Elm St".to_string(),
                },
                PropertyRef {
                    id: PropertyId::new(2),
                    name: "Oak Ave".to_string(),
                },
            ],
        );
        let query = scope.query();

        assert_eq!(query.window.start, date(2026, 3, 1));
        assert_eq!(query.window.end, date(2026, 4, 1));
        assert_eq!(query.property_ids, vec![PropertyId::new(1), PropertyId::new(2)]);
        assert!(scope.contains(PropertyId::new(2)));
        assert!(!scope.contains(PropertyId::new(3)));
    }
}
