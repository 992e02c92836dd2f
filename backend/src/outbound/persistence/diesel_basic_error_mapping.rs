//! Shared Diesel error classification for the repository adapters.
//!
//! Each adapter turns a [`StoreFailure`] into its own port error; the
//! classification itself (and the debug logging of the raw failure) lives
//! here so every repository reports database problems the same way.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to the cases the ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The connection was closed or could not be used.
    Connection(String),
    /// A unique or primary key constraint rejected the row.
    UniqueViolation(String),
    /// A foreign key constraint rejected the row.
    ForeignKeyViolation {
        message: String,
        constraint: Option<String>,
    },
    /// Anything else.
    Query(String),
}

impl StoreFailure {
    /// True when the violated foreign key points at `table`.
    pub(crate) fn references(&self, table: &str) -> bool {
        match self {
            Self::ForeignKeyViolation {
                message,
                constraint,
            } => {
                constraint
                    .as_deref()
                    .is_some_and(|name| name.contains(table))
                    || message.contains(table)
            }
            _ => false,
        }
    }
}

/// Message carried by a pool failure.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the raw failure at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            StoreFailure::Query("database query error".to_owned())
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            StoreFailure::Query("row conversion error".to_owned())
        }
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::ClosedConnection => {
                StoreFailure::Connection("database connection error".to_owned())
            }
            DatabaseErrorKind::UniqueViolation => {
                StoreFailure::UniqueViolation(info.message().to_owned())
            }
            DatabaseErrorKind::ForeignKeyViolation => StoreFailure::ForeignKeyViolation {
                message: info.message().to_owned(),
                constraint: info.constraint_name().map(str::to_owned),
            },
            _ => StoreFailure::Query("database error".to_owned()),
        },
        _ => StoreFailure::Query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound),
            StoreFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            pool_error_message(PoolError::checkout("connection refused")),
            "connection refused"
        );
    }

    #[rstest]
    #[case(Some("movement_cycles_route_id_fkey"), "", "equipment_routes", false)]
    #[case(Some("equipment_routes_eqp_id_fkey"), "", "equipment", true)]
    #[case(None, "violates constraint on table \"equipment\"", "equipment", true)]
    fn foreign_keys_are_matched_by_table(
        #[case] constraint: Option<&str>,
        #[case] message: &str,
        #[case] table: &str,
        #[case] expected: bool,
    ) {
        let failure = StoreFailure::ForeignKeyViolation {
            message: message.to_owned(),
            constraint: constraint.map(str::to_owned),
        };
        assert_eq!(failure.references(table), expected);
    }

    #[rstest]
    fn only_foreign_keys_reference_tables() {
        assert!(!StoreFailure::Query("equipment".to_owned()).references("equipment"));
    }
}
