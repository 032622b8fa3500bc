//! Shared helpers for Diesel repository implementations.
//!
//! Every adapter maps failures onto its own port error, but the first step
//! is always the same: log the Diesel error once at debug level and decide
//! which broad class it belongs to. [`classify_diesel_error`] does that so the
//! per-repository mappers stay small.

use tracing::debug;

use super::pool::PoolError;

/// Broad classes of Diesel failure the adapters distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A referenced row does not exist.
    ForeignKeyViolation { constraint: Option<String> },
    /// A `first` or `get_result` call found no row.
    NotFound,
    /// The connection dropped mid-operation.
    Connection(String),
    /// Anything else.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Log a Diesel error with `operation` context and classify it.
pub(crate) fn classify_diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(%error, operation, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::NotFound,
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".into()),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation { constraint },
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error".into())
                }
                _ => DieselFailure::Query("database error".into()),
            }
        }
        _ => DieselFailure::Query("database error".into()),
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Order `items` to follow `ids`, dropping ids with no match.
///
/// `IN (...)` queries return rows in arbitrary order; the ports promise the
/// caller's order.
pub(crate) fn order_by_ids<K, T>(ids: &[K], items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    K: Eq + std::hash::Hash + Copy,
{
    let mut by_id: std::collections::HashMap<K, T> =
        items.into_iter().map(|item| (key(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
