//! The accounting snapshot: every property's rows for one month.
//!
//! Snapshots are plain owned values. Cloning is deep, so the working snapshot and the
//! last-saved baseline never share rows. The `with_*` helpers return an updated copy and leave
//! the receiver untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rentbook_shared::types::{PayableId, PropertyId, ReceivableId};

use super::error::RentsError;
use super::types::{NOT_FOUND_NAME, Payable, PropertyRef, Receivable, Unoccupied};

/// One property's rows for the month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccounts {
    /// Display name of the property.
    pub property_name: String,
    /// Rent owed by tenants.
    pub receivables: Vec<Receivable>,
    /// Expenses.
    pub payables: Vec<Payable>,
    /// Vacancy markers for the month.
    pub unoccupied: Vec<Unoccupied>,
}

impl PropertyAccounts {
    /// An entry with no rows.
    #[must_use]
    pub fn empty(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            ..Self::default()
        }
    }

    /// Returns true if the property carries any vacancy marker.
    #[must_use]
    pub fn is_unoccupied(&self) -> bool {
        !self.unoccupied.is_empty()
    }

    /// Finds a payable by identity.
    #[must_use]
    pub fn payable(&self, id: PayableId) -> Option<&Payable> {
        self.payables.iter().find(|p| p.id == Some(id))
    }

    /// Finds a receivable by identity.
    #[must_use]
    pub fn receivable(&self, id: ReceivableId) -> Option<&Receivable> {
        self.receivables.iter().find(|r| r.id == Some(id))
    }
}

/// Accounting picture for one company and month, keyed by property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountingSnapshot {
    properties: BTreeMap<PropertyId, PropertyAccounts>,
}

impl AccountingSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups query results into a snapshot covering exactly the given properties.
    ///
    /// Every property gets an entry even without rows. Rows for properties outside the list
    /// are dropped.
    #[must_use]
    pub fn group(
        properties: &[PropertyRef],
        receivables: Vec<Receivable>,
        payables: Vec<Payable>,
        unoccupied: Vec<Unoccupied>,
    ) -> Self {
        let mut snapshot = Self {
            properties: properties
                .iter()
                .map(|p| (p.id, PropertyAccounts::empty(p.name.clone())))
                .collect(),
        };

        for receivable in receivables {
            if let Some(accounts) = snapshot.properties.get_mut(&receivable.property_id) {
                accounts.receivables.push(receivable);
            }
        }
        for payable in payables {
            if let Some(accounts) = snapshot.properties.get_mut(&payable.property_id) {
                accounts.payables.push(payable);
            }
        }
        for marker in unoccupied {
            if let Some(accounts) = snapshot.properties.get_mut(&marker.property_id) {
                accounts.unoccupied.push(marker);
            }
        }

        snapshot
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if no property is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the property's rows.
    #[must_use]
    pub fn get(&self, property_id: PropertyId) -> Option<&PropertyAccounts> {
        self.properties.get(&property_id)
    }

    /// Returns true if the property is present.
    #[must_use]
    pub fn contains(&self, property_id: PropertyId) -> bool {
        self.properties.contains_key(&property_id)
    }

    /// Property name, or the `"not found"` placeholder.
    #[must_use]
    pub fn property_name(&self, property_id: PropertyId) -> &str {
        self.properties
            .get(&property_id)
            .map_or(NOT_FOUND_NAME, |a| a.property_name.as_str())
    }

    /// Iterates properties in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyAccounts)> {
        self.properties.iter().map(|(id, accounts)| (*id, accounts))
    }

    /// Property ids in order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.properties.keys().copied()
    }

    /// Inserts or replaces a property entry.
    pub fn insert(&mut self, property_id: PropertyId, accounts: PropertyAccounts) {
        self.properties.insert(property_id, accounts);
    }

    /// Returns a copy with the property's rows updated.
    ///
    /// # Errors
    ///
    /// Returns `RentsError::PropertyNotInScope` if the property is absent.
    pub fn with_property<F>(&self, property_id: PropertyId, update: F) -> Result<Self, RentsError>
    where
        F: FnOnce(&mut PropertyAccounts),
    {
        let mut next = self.clone();
        update(next.accounts_mut(property_id)?);
        Ok(next)
    }

    /// Returns a copy with one receivable updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the property or the row does not exist.
    pub fn with_receivable<F>(
        &self,
        property_id: PropertyId,
        index: usize,
        update: F,
    ) -> Result<Self, RentsError>
    where
        F: FnOnce(&mut Receivable),
    {
        let mut next = self.clone();
        let row = next
            .accounts_mut(property_id)?
            .receivables
            .get_mut(index)
            .ok_or_else(|| RentsError::receivable_not_found(property_id, index))?;
        update(row);
        Ok(next)
    }

    /// Returns a copy with one payable updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the property or the row does not exist.
    pub fn with_payable<F>(
        &self,
        property_id: PropertyId,
        index: usize,
        update: F,
    ) -> Result<Self, RentsError>
    where
        F: FnOnce(&mut Payable),
    {
        let mut next = self.clone();
        let row = next
            .accounts_mut(property_id)?
            .payables
            .get_mut(index)
            .ok_or_else(|| RentsError::payable_not_found(property_id, index))?;
        update(row);
        Ok(next)
    }

    /// Returns a copy without the payable with this identity, wherever it lives.
    #[must_use]
    pub fn without_payable(&self, id: PayableId) -> Self {
        let mut next = self.clone();
        for accounts in next.properties.values_mut() {
            accounts.payables.retain(|p| p.id != Some(id));
        }
        next
    }

    /// Returns a copy without the receivable with this identity, wherever it lives.
    #[must_use]
    pub fn without_receivable(&self, id: ReceivableId) -> Self {
        let mut next = self.clone();
        for accounts in next.properties.values_mut() {
            accounts.receivables.retain(|r| r.id != Some(id));
        }
        next
    }

    fn accounts_mut(&mut self, property_id: PropertyId) -> Result<&mut PropertyAccounts, RentsError> {
        self.properties
            .get_mut(&property_id)
            .ok_or(RentsError::PropertyNotInScope(property_id))
    }
}

impl<'a> IntoIterator for &'a AccountingSnapshot {
    type Item = (&'a PropertyId, &'a PropertyAccounts);
    type IntoIter = std::collections::btree_map::Iter<'a, PropertyId, PropertyAccounts>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}
