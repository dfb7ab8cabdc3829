use std::fmt;

use thiserror::Error;

/// Connection-establishment failure captured on a [`Client`](crate::Client).
///
/// Kept separately from [`MysqlMiddlewareError`] because it is cached and handed back
/// on every later call, so it has to be cloneable (driver errors are not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectError {
    host: String,
    message: String,
}

impl ConnectError {
    #[must_use]
    pub fn new(host: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            host: host.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host: {} error: {}", self.host, self.message)
    }
}

impl std::error::Error for ConnectError {}

#[derive(Debug, Error)]
pub enum MysqlMiddlewareError {
    /// Opening or pinging the server failed; cached on the client.
    #[error(transparent)]
    Connection(#[from] ConnectError),

    /// Query, execution, or row decoding error reported by the driver.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Value conversion error: {0}")]
    Conversion(String),
}

impl From<deadpool::managed::PoolError<MysqlMiddlewareError>> for MysqlMiddlewareError {
    fn from(err: deadpool::managed::PoolError<MysqlMiddlewareError>) -> Self {
        match err {
            deadpool::managed::PoolError::Backend(e) => e,
            other => MysqlMiddlewareError::Pool(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_display_includes_host() {
        let err = ConnectError::new("10.0.0.5:3306", "connection refused");
        assert_eq!(err.to_string(), "host: 10.0.0.5:3306 error: connection refused");

        let wrapped: MysqlMiddlewareError = err.clone().into();
        assert_eq!(wrapped.to_string(), err.to_string());
    }
}
