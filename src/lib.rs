//! Thin async helpers over sqlx's MySQL driver.
//!
//! A [`Client`] owns a deadpool pool of `sqlx::MySqlConnection`s and offers:
//! - [`Client::get_row`] / [`Client::get_result`]: rows as string-keyed maps
//! - [`Client::query`]: writes, reporting `LastInsertId` and `RowsAffected`
//! - [`Client::start`] / [`Client::commit`] / [`Client::rollback`]: literal
//!   transaction-control statements
//!
//! Connection failures are captured on the client rather than returned from connect.

pub mod client;
pub mod error;
pub mod mysql;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod types;

pub use client::{Client, ClientStatus};
pub use error::{ConnectError, MysqlMiddlewareError};
pub use mysql::{MysqlOptions, MysqlOptionsBuilder};
pub use pool::{MysqlPool, PoolSettings, PoolStatus};
pub use results::{LAST_INSERT_ID_KEY, ROWS_AFFECTED_KEY, ResultSet, RowMap, WriteOutcome};
pub use types::RowValues;
