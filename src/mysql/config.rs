use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::client::Client;
use crate::error::MysqlMiddlewareError;
use crate::pool::PoolSettings;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_TIMEOUT: &str = "10s";
pub const DEFAULT_CHARSET: &str = "utf8";

/// Options for connecting a [`Client`].
///
/// `host` is `name` or `name:port` (`[v6addr]:port` for IPv6 literals); an empty host
/// means `127.0.0.1:3306`. `timeout` is a duration string such as `"10s"` or `"500ms"`;
/// it bounds each dial and is not validated until connect time.
#[derive(Clone, Deserialize)]
pub struct MysqlOptions {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub pool: PoolSettings,
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

impl fmt::Debug for MysqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlOptions")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .field("charset", &self.charset)
            .field("pool", &self.pool)
            .finish()
    }
}

impl MysqlOptions {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        timeout: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            timeout: timeout.into(),
            charset: default_charset(),
            pool: PoolSettings::default(),
        }
    }

    #[must_use]
    pub fn builder(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> MysqlOptionsBuilder {
        MysqlOptionsBuilder::new(host, user, password, database)
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub fn with_pool(mut self, pool: PoolSettings) -> Self {
        self.pool = pool;
        self
    }

    /// `user:password@tcp(host)/database?charset=...&timeout=...`
    #[must_use]
    pub fn dsn(&self) -> String {
        self.format_dsn(&self.password)
    }

    /// Same as [`dsn`](Self::dsn) with the password masked, for logs.
    #[must_use]
    pub fn redacted_dsn(&self) -> String {
        self.format_dsn("***")
    }

    fn format_dsn(&self, password: &str) -> String {
        format!(
            "{}:{}@tcp({})/{}?charset={}&timeout={}",
            self.user, password, self.host, self.database, self.charset, self.timeout
        )
    }

    /// Parse the timeout string.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Config` if the string is not a duration with units.
    pub fn connect_timeout(&self) -> Result<Duration, MysqlMiddlewareError> {
        humantime::parse_duration(self.timeout.trim()).map_err(|e| {
            MysqlMiddlewareError::Config(format!("invalid timeout {:?}: {e}", self.timeout))
        })
    }

    /// Driver connect options for these settings.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Config` if the host's port is not a valid number.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, MysqlMiddlewareError> {
        let (host, port) = split_host_port(&self.host)?;
        let mut options = MySqlConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&self.user)
            .password(&self.password)
            .charset(&self.charset);
        if !self.database.is_empty() {
            options = options.database(&self.database);
        }
        Ok(options)
    }

    /// Connect, capturing any failure on the returned client.
    pub async fn connect(self) -> Client {
        Client::from_options(self).await
    }
}

/// Fluent builder for MySQL options.
#[derive(Debug, Clone)]
pub struct MysqlOptionsBuilder {
    opts: MysqlOptions,
}

impl MysqlOptionsBuilder {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            opts: MysqlOptions::new(host, user, password, database, DEFAULT_TIMEOUT),
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.opts.timeout = timeout.into();
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = charset.into();
        self
    }

    #[must_use]
    pub fn max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.opts.pool = self.opts.pool.with_max_lifetime(max_lifetime);
        self
    }

    #[must_use]
    pub fn max_idle_conns(mut self, max_idle: usize) -> Self {
        self.opts.pool = self.opts.pool.with_max_idle(max_idle);
        self
    }

    #[must_use]
    pub fn max_open_conns(mut self, max_open: usize) -> Self {
        self.opts.pool = self.opts.pool.with_max_open(max_open);
        self
    }

    #[must_use]
    pub fn finish(self) -> MysqlOptions {
        self.opts
    }

    /// Connect a [`Client`] with these options.
    pub async fn connect(self) -> Client {
        self.finish().connect().await
    }
}

/// Split `host[:port]` into its parts, defaulting to `127.0.0.1` and port 3306.
///
/// # Errors
/// Returns `MysqlMiddlewareError::Config` for an unparsable port or unterminated `[`.
pub fn split_host_port(addr: &str) -> Result<(String, u16), MysqlMiddlewareError> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Ok((DEFAULT_HOST.to_string(), DEFAULT_PORT));
    }

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            MysqlMiddlewareError::Config(format!("missing ']' in host {addr:?}"))
        })?;
        (host, tail.strip_prefix(':'))
    } else {
        match addr.split_once(':') {
            // More than one colon without brackets: a bare IPv6 address.
            Some((_, tail)) if tail.contains(':') => (addr, None),
            Some((host, port)) => (host, Some(port)),
            None => (addr, None),
        }
    };

    let port = match port {
        None | Some("") => DEFAULT_PORT,
        Some(port) => port.parse::<u16>().map_err(|e| {
            MysqlMiddlewareError::Config(format!("invalid port {port:?} in host {addr:?}: {e}"))
        })?,
    };
    let host = if host.is_empty() { DEFAULT_HOST } else { host };
    Ok((host.to_string(), port))
}
