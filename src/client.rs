use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ConnectError, MysqlMiddlewareError};
use crate::mysql::MysqlOptions;
use crate::mysql::executor::{self, COMMIT, ROLLBACK, START_TRANSACTION};
use crate::pool::{MysqlPool, PoolSettings, PoolStatus};
use crate::results::{ResultSet, RowMap, WriteOutcome};
use crate::types::RowValues;

/// A pooled MySQL connection with string-map helpers.
///
/// A failed connect does not return an error: the failure is kept on the client and
/// every later call returns it without touching the network. Check with
/// [`Client::ping`] or [`Client::check`].
///
/// ```rust,no_run
/// # async fn run() -> Result<(), mysql_middleware::MysqlMiddlewareError> {
/// use mysql_middleware::prelude::*;
///
/// let client = Client::connect("127.0.0.1:3306", "root", "root", "test", "10s").await;
/// let row = client
///     .get_row("SELECT id, name FROM users WHERE id = ?", &[RowValues::Int(1)])
///     .await?;
/// println!("{:?}", row.get("name"));
/// # Ok(())
/// # }
/// ```
pub struct Client {
    host: String,
    pool: Option<MysqlPool>,
    settings: PoolSettings,
    conn_err: Option<ConnectError>,
}

/// Snapshot of a client's health, as returned by [`Client::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientStatus {
    pub host: String,
    pub healthy: bool,
    pub error: Option<String>,
    pub pool: Option<PoolStatus>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("pool", &self.pool)
            .field("settings", &self.settings)
            .field("conn_err", &self.conn_err)
            .finish()
    }
}

impl Client {
    /// Connect to `host` and ping it once.
    ///
    /// `timeout` is a duration string such as `"10s"`; a value without a unit is a
    /// connect failure.
    pub async fn connect(
        host: &str,
        user: &str,
        password: &str,
        database: &str,
        timeout: &str,
    ) -> Client {
        Self::from_options(MysqlOptions::new(host, user, password, database, timeout)).await
    }

    /// Connect with full options, capturing any failure on the returned client.
    pub async fn from_options(options: MysqlOptions) -> Client {
        let host = options.host.clone();
        let settings = options.pool.normalized();
        match Self::try_from_options(options).await {
            Ok(client) => client,
            Err(err) => {
                let conn_err = into_connect_error(&host, err);
                warn!(host = %host, error = %conn_err, "MySQL connect failed");
                Client {
                    host,
                    pool: None,
                    settings,
                    conn_err: Some(conn_err),
                }
            }
        }
    }

    /// Connect with full options and return the failure directly.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Connection` (with the host) if the options are
    /// invalid or the initial ping fails. The pool is closed before returning.
    pub async fn try_from_options(options: MysqlOptions) -> Result<Client, MysqlMiddlewareError> {
        let host = options.host.clone();
        let settings = options.pool.normalized();
        let pool = Self::open_pool(&options, &settings).map_err(|e| into_connect_error(&host, e))?;

        if let Err(err) = pool.ping().await {
            pool.close();
            return Err(into_connect_error(&host, err).into());
        }

        info!(dsn = %options.redacted_dsn(), "connected to MySQL");
        Ok(Client {
            host,
            pool: Some(pool),
            settings,
            conn_err: None,
        })
    }

    fn open_pool(
        options: &MysqlOptions,
        settings: &PoolSettings,
    ) -> Result<MysqlPool, MysqlMiddlewareError> {
        let connect_timeout = options.connect_timeout()?;
        let connect_options = options.connect_options()?;
        MysqlPool::build(options.host.clone(), connect_options, connect_timeout, settings)
    }

    /// The pool, or the cached connection error.
    fn live_pool(&self) -> Result<&MysqlPool, MysqlMiddlewareError> {
        match (&self.conn_err, &self.pool) {
            (Some(err), _) => Err(err.clone().into()),
            (None, Some(pool)) => Ok(pool),
            (None, None) => Err(ConnectError::new(&self.host, "not connected").into()),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The cached connection error, if any. Does no I/O.
    #[must_use]
    pub fn check(&self) -> Option<&ConnectError> {
        self.conn_err.as_ref()
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.conn_err.is_none()
    }

    #[must_use]
    pub fn status(&self) -> ClientStatus {
        ClientStatus {
            host: self.host.clone(),
            healthy: self.is_healthy(),
            error: self.conn_err.as_ref().map(ToString::to_string),
            pool: self.pool.as_ref().map(MysqlPool::status),
        }
    }

    /// Check the connection is alive.
    ///
    /// A cached error is returned as is. Otherwise the server is pinged; on failure the
    /// pool is closed and the error (with the host) becomes the cached error.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Connection`.
    pub async fn ping(&mut self) -> Result<(), MysqlMiddlewareError> {
        let pool = self.live_pool()?;
        if let Err(err) = pool.ping().await {
            let conn_err = into_connect_error(&self.host, err);
            warn!(host = %self.host, error = %conn_err, "MySQL ping failed");
            self.fail(conn_err.clone());
            return Err(conn_err.into());
        }
        Ok(())
    }

    fn fail(&mut self, conn_err: ConnectError) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        self.conn_err = Some(conn_err);
    }

    /// Close the pool. Later calls fail with a "connection pool closed" error.
    pub fn close(&mut self) {
        if self.conn_err.is_none() {
            info!(host = %self.host, "closing MySQL pool");
            self.fail(ConnectError::new(&self.host, "connection pool closed"));
        }
    }

    #[must_use]
    pub fn pool_settings(&self) -> PoolSettings {
        self.settings
    }

    fn apply_settings(&mut self, settings: PoolSettings) {
        if let Some(err) = &self.conn_err {
            debug!(host = %self.host, error = %err, "ignoring pool setting on failed client");
            return;
        }
        self.settings = settings;
        if let Some(pool) = self.pool.as_mut() {
            pool.apply(&settings);
        }
        info!(
            host = %self.host,
            max_lifetime = %humantime::format_duration(settings.max_lifetime),
            max_idle = settings.max_idle,
            max_open = settings.max_open,
            "pool settings updated"
        );
    }

    /// Longest time a connection is reused. `Duration::ZERO` means no limit.
    pub fn set_conn_max_lifetime(&mut self, max_lifetime: Duration) {
        self.apply_settings(self.settings.with_max_lifetime(max_lifetime));
    }

    /// Idle connections kept between calls; capped at the max open count.
    pub fn set_max_idle_conns(&mut self, max_idle: usize) {
        self.apply_settings(self.settings.with_max_idle(max_idle));
    }

    /// Maximum connections open at once; `0` restores the default.
    pub fn set_max_open_conns(&mut self, max_open: usize) {
        self.apply_settings(self.settings.with_max_open(max_open));
    }

    /// Fetch one row as a map. Every returned row is read and, per column, the last
    /// row's value wins; zero rows give an empty map.
    ///
    /// # Errors
    /// Returns the cached connection error, a checkout error, or the driver's error.
    pub async fn get_row(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<RowMap, MysqlMiddlewareError> {
        let pool = self.live_pool()?;
        let mut conn = pool.get().await?;
        let result = executor::fetch_row(&mut conn, query, params).await;
        pool.release(conn);
        result
    }

    /// Fetch every row as a map, in server order.
    ///
    /// # Errors
    /// Returns the cached connection error, a checkout error, or the first row error.
    pub async fn get_result(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, MysqlMiddlewareError> {
        let pool = self.live_pool()?;
        let mut conn = pool.get().await?;
        let result = executor::fetch_all(&mut conn, query, params).await;
        pool.release(conn);
        result
    }

    /// Execute a write statement and report `LastInsertId` / `RowsAffected`.
    ///
    /// # Errors
    /// Returns the cached connection error, a checkout error, the driver's error, or a
    /// conversion error if a counter exceeds `i64::MAX`.
    pub async fn query(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<WriteOutcome, MysqlMiddlewareError> {
        let pool = self.live_pool()?;
        let mut conn = pool.get().await?;
        let result = executor::execute_write(&mut conn, query, params).await;
        pool.release(conn);
        result
    }

    async fn control(&self, statement: &str) -> Result<(), MysqlMiddlewareError> {
        let pool = self.live_pool()?;
        let mut conn = pool.get().await?;
        let result = executor::execute_control(&mut conn, statement).await;
        pool.release(conn);
        result
    }

    /// Send `START TRANSACTION`.
    ///
    /// The statement runs on whichever pooled connection is free; nothing pins later
    /// calls to it. Use `set_max_open_conns(1)` when the transaction must span calls.
    ///
    /// # Errors
    /// Returns the cached connection error or the server's error.
    pub async fn start(&self) -> Result<(), MysqlMiddlewareError> {
        self.control(START_TRANSACTION).await
    }

    /// Send `COMMIT`. No check is made that a transaction was started.
    ///
    /// # Errors
    /// Returns the cached connection error or the server's error.
    pub async fn commit(&self) -> Result<(), MysqlMiddlewareError> {
        self.control(COMMIT).await
    }

    /// Send `ROLLBACK`.
    ///
    /// # Errors
    /// Returns the cached connection error or the server's error.
    pub async fn rollback(&self) -> Result<(), MysqlMiddlewareError> {
        self.control(ROLLBACK).await
    }
}

fn into_connect_error(host: &str, err: MysqlMiddlewareError) -> ConnectError {
    match err {
        MysqlMiddlewareError::Connection(conn_err) => conn_err,
        other => ConnectError::new(host, other),
    }
}
