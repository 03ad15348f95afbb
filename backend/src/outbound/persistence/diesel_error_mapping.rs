//! Shared Diesel error mapping for every repository adapter.

use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool failures to a connection error.
pub(super) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel failures to repository errors.
///
/// Unique violations become [`RepositoryError::Conflict`] carrying the
/// constraint name so services can tell a taken email from a taken slot.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

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
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RepositoryError::conflict(info.constraint_name().unwrap_or("unique constraint"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            RepositoryError::conflict("concurrent write, retry the request")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => RepositoryError::query("database error"),
        _ => RepositoryError::query("database error"),
    }
}

/// Parse a stored text column back into its domain type.
pub(super) fn decode<T>(column: &'static str, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|err| RepositoryError::query(format!("invalid {column} in database: {err}")))
}

/// Validate a stored value through a domain constructor.
pub(super) fn validated<T, E: Display>(
    column: &'static str,
    result: Result<T, E>,
) -> Result<T, RepositoryError> {
    result.map_err(|err| RepositoryError::query(format!("invalid {column} in database: {err}")))
}

/// Convert an `i64` count from `COUNT(*)` into the port's `u64`.
pub(super) fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

/// Offsets beyond `i64::MAX` cannot be expressed in SQL; clamp them.
pub(super) fn sql_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Role;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    fn unique_violation_names_the_constraint() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some("users_email_key"),
        ));
        assert_eq!(err, RepositoryError::conflict("users_email_key"));
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::ClosedConnection, None), "connection")]
    #[case(database_error(DatabaseErrorKind::ForeignKeyViolation, None), "query")]
    #[case(DieselError::NotFound, "query")]
    fn other_errors(#[case] error: DieselError, #[case] expected: &str) {
        let mapped = map_diesel_error(error);
        let kind = match mapped {
            RepositoryError::Connection { .. } => "connection",
            RepositoryError::Query { .. } => "query",
            RepositoryError::Conflict { .. } => "conflict",
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn pool_errors_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, RepositoryError::connection("timed out"));
    }

    #[rstest]
    fn corrupt_enum_text_is_a_query_error() {
        let err = decode::<Role>("role", "SUPERUSER").expect_err("unknown role");
        assert!(matches!(err, RepositoryError::Query { .. }));
        assert!(err.to_string().contains("role"));
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(7, 7)]
    fn counts_never_go_negative(#[case] raw: i64, #[case] expected: u64) {
        assert_eq!(count(raw), expected);
    }
}
