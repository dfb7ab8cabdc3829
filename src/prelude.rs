//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types so callers can
//! `use mysql_middleware::prelude::*;` and start querying.

pub use crate::client::{Client, ClientStatus};
pub use crate::error::{ConnectError, MysqlMiddlewareError};
pub use crate::mysql::{MysqlOptions, MysqlOptionsBuilder};
pub use crate::pool::{PoolSettings, PoolStatus};
pub use crate::results::{ResultSet, RowMap, WriteOutcome};
pub use crate::types::RowValues;
