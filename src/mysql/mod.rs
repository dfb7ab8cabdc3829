// MySQL module - everything that talks to sqlx
//
// - config: connection options, DSN assembly, host/timeout parsing
// - manager: deadpool manager for `sqlx::MySqlConnection`
// - params: binding `RowValues` onto queries
// - query: turning result rows into string maps
// - executor: the statements a `Client` runs on a pooled connection

pub mod config;
pub mod executor;
pub mod manager;
pub mod params;
pub mod query;

pub use config::{MysqlOptions, MysqlOptionsBuilder};
pub use executor::{execute_control, execute_write, fetch_all, fetch_row};
pub use manager::MysqlManager;
pub use params::bind_query_params;
pub use query::{WireFormat, row_to_map};
