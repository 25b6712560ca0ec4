//! Classification of database errors by Postgres SQLSTATE.

use sea_orm::{DbErr, RuntimeErr, SqlErr};

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Returns the SQLSTATE of a database error, if the driver reported one.
pub(crate) fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Query(e) | DbErr::Exec(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Returns true for lock timeouts, serialization failures and deadlocks.
pub(crate) fn is_contention(err: &DbErr) -> bool {
    sqlstate(err).is_some_and(|code| {
        matches!(
            code.as_str(),
            LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED
        )
    })
}

/// Returns true for unique constraint violations.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Returns true for exclusion constraint violations (overlapping ranges).
pub(crate) fn is_exclusion_violation(err: &DbErr) -> bool {
    sqlstate(err).is_some_and(|code| code == EXCLUSION_VIOLATION)
}
