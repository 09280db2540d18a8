//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PayableId` where a `ReceivableId` is expected.
//! Every ID wraps the database's `BIGINT` primary key.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a company.");
typed_id!(PropertyId, "Unique identifier for a rental property.");
typed_id!(TenantId, "Unique identifier for a tenant.");
typed_id!(ReceivableId, "Unique identifier for a rent receivable.");
typed_id!(PayableId, "Unique identifier for a property expense.");
typed_id!(
    UnoccupiedId,
    "Unique identifier for an unoccupied-month marker."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_round_trips_raw_key() {
        let id = PropertyId::new(42);
        assert_eq!(id.into_inner(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(PropertyId::from(42), id);
    }

    #[test]
    fn test_typed_id_display() {
        assert_eq!(ReceivableId::new(9).to_string(), "9");
    }

    #[test]
    fn test_typed_id_from_str() {
        assert_eq!(PayableId::from_str(" 3 ").unwrap(), PayableId::new(3));
        assert!(PayableId::from_str("three").is_err());
    }

    #[test]
    fn test_typed_id_serializes_transparently() {
        let json = serde_json::to_string(&CompanyId::new(7)).unwrap();
        assert_eq!(json, "7");

        let id: CompanyId = serde_json::from_str("7").unwrap();
        assert_eq!(id, CompanyId::new(7));
    }

    #[test]
    fn test_typed_id_orders_by_key() {
        let mut ids = vec![PropertyId::new(3), PropertyId::new(1), PropertyId::new(2)];
        ids.sort();
        assert_eq!(
            ids,
            vec![PropertyId::new(1), PropertyId::new(2), PropertyId::new(3)]
        );
    }
}
