//! Rent reconciliation error types.

use rentbook_shared::AppError;
use rentbook_shared::types::PropertyId;
use thiserror::Error;

/// Errors raised by the rent reconciliation engine.
///
/// Query and command failures carry the backend's message verbatim; the engine never
/// retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentsError {
    /// One of the snapshot range queries failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A create, update, or delete command failed.
    #[error("command failed: {0}")]
    Command(String),

    /// The property is not part of the open snapshot.
    #[error("property {0} is not part of this snapshot")]
    PropertyNotInScope(PropertyId),

    /// No row exists at the given position.
    #[error("no {kind} at index {index} for property {property_id}")]
    RowNotFound {
        /// Row family ("receivable" or "payable").
        kind: &'static str,
        /// Owning property.
        property_id: PropertyId,
        /// Position within the property's rows.
        index: usize,
    },

    /// Year/month pair does not name a calendar month.
    #[error("invalid rent period: {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// Input rejected before reaching the data source.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl RentsError {
    /// Create a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a command error.
    #[must_use]
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a missing-receivable error.
    #[must_use]
    pub fn receivable_not_found(property_id: PropertyId, index: usize) -> Self {
        Self::RowNotFound {
            kind: "receivable",
            property_id,
            index,
        }
    }

    /// Create a missing-payable error.
    #[must_use]
    pub fn payable_not_found(property_id: PropertyId, index: usize) -> Self {
        Self::RowNotFound {
            kind: "payable",
            property_id,
            index,
        }
    }
}

impl From<RentsError> for AppError {
    fn from(err: RentsError) -> Self {
        match err {
            RentsError::Query(_) | RentsError::Command(_) => Self::Database(err.to_string()),
            RentsError::PropertyNotInScope(_) | RentsError::RowNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            RentsError::InvalidPeriod { .. } | RentsError::Validation(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_display() {
        let err = RentsError::receivable_not_found(PropertyId::new(5), 2);
        assert_eq!(err.to_string(), "no receivable at index 2 for property 5");

        let err = RentsError::payable_not_found(PropertyId::new(1), 0);
        assert_eq!(err.to_string(), "no payable at index 0 for property 1");
    }

    #[test]
    fn test_query_error_keeps_backend_message() {
        let err = RentsError::query("relation \"receivables\" does not exist");
        assert_eq!(
            err.to_string(),
            "query failed: relation \"receivables\" does not exist"
        );
    }

    #[test]
    fn test_maps_to_app_error() {
        assert!(matches!(
            AppError::from(RentsError::command("insert rejected")),
            AppError::Database(_)
        ));
        assert_eq!(
            AppError::from(RentsError::PropertyNotInScope(PropertyId::new(3))).status_code(),
            404
        );
        assert_eq!(
            AppError::from(RentsError::InvalidPeriod { year: 2026, month: 13 }).error_code(),
            "VALIDATION_ERROR"
        );
    }
}
