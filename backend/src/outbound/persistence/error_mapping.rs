//! Diesel and pool failure mapping shared by every repository.
//!
//! Each port error exposes `connection` and `query` constructors; the
//! [`RepositoryError`] trait lets one pair of mapping functions serve all of
//! them. Diesel details are logged at debug level and replaced by short
//! fixed messages so driver text never reaches a response body.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    AnswerPersistenceError, OutboxError, QuestionPersistenceError, SubscriptionPersistenceError,
    UserPersistenceError,
};

use super::pool::PoolError;

/// Port errors with connection and query variants.
pub(crate) trait RepositoryError: Sized {
    fn connection_failed(message: String) -> Self;
    fn query_failed(message: String) -> Self;
}

macro_rules! repository_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl RepositoryError for $error {
                fn connection_failed(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failed(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

repository_error!(
    UserPersistenceError,
    QuestionPersistenceError,
    AnswerPersistenceError,
    SubscriptionPersistenceError,
    OutboxError,
);

/// Map a pool checkout or build failure to a connection error.
pub(crate) fn map_pool_error<E: RepositoryError>(error: PoolError) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::connection_failed(message)
}

/// Map a Diesel failure to a connection or query error.
pub(crate) fn map_diesel_error<E: RepositoryError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => E::query_failed("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failed("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            E::connection_failed("database connection error".to_owned())
        }
        _ => E::query_failed("database error".to_owned()),
    }
}

/// Constraint name when `error` is a unique violation.
pub(crate) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Info(Option<&'static str>);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err: UserPersistenceError = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, UserPersistenceError::connection("timed out"));
    }

    #[rstest]
    #[case(DieselError::NotFound, OutboxError::query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, None),
        OutboxError::connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation, None),
        OutboxError::query("database error")
    )]
    fn diesel_errors_are_classified(#[case] error: DieselError, #[case] expected: OutboxError) {
        assert_eq!(map_diesel_error::<OutboxError>(error), expected);
    }

    #[rstest]
    fn unique_violations_expose_the_constraint() {
        let error = database_error(DatabaseErrorKind::UniqueViolation, Some("users_email_key"));
        assert_eq!(unique_violation(&error), Some("users_email_key"));
        assert_eq!(unique_violation(&DieselError::NotFound), None);
    }
}
