use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use deadpool::managed::{Manager, Metrics, RecycleError, RecycleResult};
use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use tracing::debug;

use crate::error::MysqlMiddlewareError;

/// MySQL connection manager for deadpool
pub struct MysqlManager {
    host: String,
    connect_options: MySqlConnectOptions,
    connect_timeout: Duration,
    max_lifetime_ms: Arc<AtomicU64>,
}

impl MysqlManager {
    /// `max_lifetime_ms` is shared with the owning pool so lifetime changes apply to
    /// connections that are already open. Zero means unlimited.
    pub(crate) fn new(
        host: String,
        connect_options: MySqlConnectOptions,
        connect_timeout: Duration,
        max_lifetime_ms: Arc<AtomicU64>,
    ) -> Self {
        Self {
            host,
            connect_options,
            connect_timeout,
            max_lifetime_ms,
        }
    }

    fn max_lifetime(&self) -> Duration {
        Duration::from_millis(self.max_lifetime_ms.load(Ordering::Relaxed))
    }
}

impl fmt::Debug for MysqlManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlManager")
            .field("host", &self.host)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_lifetime", &self.max_lifetime())
            .finish_non_exhaustive()
    }
}

impl Manager for MysqlManager {
    type Type = MySqlConnection;
    type Error = MysqlMiddlewareError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let connect = MySqlConnection::connect_with(&self.connect_options);
        if self.connect_timeout.is_zero() {
            return Ok(connect.await?);
        }
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(conn) => Ok(conn?),
            Err(_) => Err(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "dial {} timed out after {}",
                    self.host,
                    humantime::format_duration(self.connect_timeout)
                ),
            ))
            .into()),
        }
    }

    async fn recycle(&self, conn: &mut Self::Type, metrics: &Metrics) -> RecycleResult<Self::Error> {
        if outlived(self.max_lifetime(), metrics.age()) {
            debug!(host = %self.host, age = ?metrics.age(), "discarding connection past max lifetime");
            return Err(RecycleError::Message("connection exceeded max lifetime".into()));
        }
        conn.ping()
            .await
            .map_err(|e| RecycleError::Backend(MysqlMiddlewareError::Sqlx(e)))
    }
}

/// Whether a connection of `age` must be retired under `max_lifetime` (zero = never).
pub(crate) fn outlived(max_lifetime: Duration, age: Duration) -> bool {
    !max_lifetime.is_zero() && age >= max_lifetime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lifetime_never_expires() {
        assert!(!outlived(Duration::ZERO, Duration::from_secs(86_400)));
    }

    #[test]
    fn lifetime_boundary_is_inclusive() {
        let limit = Duration::from_secs(60);
        assert!(!outlived(limit, Duration::from_secs(59)));
        assert!(outlived(limit, limit));
    }
}
