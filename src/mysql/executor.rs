use futures_util::TryStreamExt;
use sqlx::Executor;
use sqlx::mysql::MySqlConnection;
use tracing::debug;

use super::params::bind_query_params;
use super::query::{WireFormat, row_to_map};
use crate::error::MysqlMiddlewareError;
use crate::results::{ResultSet, RowMap, WriteOutcome};
use crate::types::RowValues;

pub const START_TRANSACTION: &str = "START TRANSACTION";
pub const COMMIT: &str = "COMMIT";
pub const ROLLBACK: &str = "ROLLBACK";

/// Run a query and fold every returned row into one map.
///
/// The stream is drained completely; for a column present in several rows the last
/// row's value is kept. Zero rows give an empty map.
///
/// # Errors
///
/// Returns `MysqlMiddlewareError::Sqlx` if execution or decoding fails.
pub async fn fetch_row(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[RowValues],
) -> Result<RowMap, MysqlMiddlewareError> {
    debug!(query, params = params.len(), "fetch row");
    // No parameters: send as a plain text query, like the server's own client.
    let mut rows = if params.is_empty() {
        (&mut *conn).fetch(query)
    } else {
        bind_query_params(query, params).fetch(&mut *conn)
    };

    let format = WireFormat::for_params(params);
    let mut row_map = RowMap::new();
    while let Some(row) = rows.try_next().await? {
        row_map.merge_from(row_to_map(&row, format)?);
    }
    Ok(row_map)
}

/// Run a query and collect one map per row, in server order.
///
/// # Errors
///
/// Returns `MysqlMiddlewareError::Sqlx` for the first row that fails.
pub async fn fetch_all(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, MysqlMiddlewareError> {
    debug!(query, params = params.len(), "fetch result set");
    let mut rows = if params.is_empty() {
        (&mut *conn).fetch(query)
    } else {
        bind_query_params(query, params).fetch(&mut *conn)
    };

    let format = WireFormat::for_params(params);
    let mut result_set = ResultSet::default();
    while let Some(row) = rows.try_next().await? {
        result_set.add_row(row_to_map(&row, format)?);
    }
    Ok(result_set)
}

/// Execute a write statement (INSERT, UPDATE, DELETE, DDL).
///
/// # Errors
///
/// Returns `MysqlMiddlewareError::Sqlx` if execution fails, or
/// `MysqlMiddlewareError::Conversion` if a counter does not fit in `i64`.
pub async fn execute_write(
    conn: &mut MySqlConnection,
    query: &str,
    params: &[RowValues],
) -> Result<WriteOutcome, MysqlMiddlewareError> {
    debug!(query, params = params.len(), "execute");
    let exec_result = if params.is_empty() {
        (&mut *conn).execute(query).await?
    } else {
        bind_query_params(query, params).execute(&mut *conn).await?
    };

    WriteOutcome::from_driver(exec_result.last_insert_id(), exec_result.rows_affected())
}

/// Send a literal control statement such as [`START_TRANSACTION`].
///
/// # Errors
///
/// Returns `MysqlMiddlewareError::Sqlx` if the server rejects the statement.
pub async fn execute_control(
    conn: &mut MySqlConnection,
    statement: &str,
) -> Result<(), MysqlMiddlewareError> {
    debug!(statement, "transaction control");
    (&mut *conn).execute(statement).await?;
    Ok(())
}
