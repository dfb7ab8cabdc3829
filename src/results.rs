//! Plain, driver-independent shapes handed back to callers.
//!
//! Column values are always strings: SQL `NULL` and an empty string both come back as
//! `""`, so callers that need to tell them apart should `COALESCE`/`IS NULL` in SQL.

mod result_set;
mod row;
mod write;

pub use result_set::ResultSet;
pub use row::RowMap;
pub use write::{LAST_INSERT_ID_KEY, ROWS_AFFECTED_KEY, WriteOutcome};
