mod settings;

pub use settings::{DEFAULT_MAX_IDLE, DEFAULT_MAX_OPEN, PoolSettings};

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use deadpool::managed::{Object, Pool};
use serde::Serialize;
use sqlx::Connection;
use sqlx::mysql::MySqlConnectOptions;
use tracing::debug;

use crate::error::MysqlMiddlewareError;
use crate::mysql::manager::{MysqlManager, outlived};

/// A connection checked out of a [`MysqlPool`]; derefs to `sqlx::MySqlConnection`.
pub type MysqlPoolConnection = Object<MysqlManager>;

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub max_size: usize,
    /// Connections currently open, idle or checked out.
    pub size: usize,
    /// Idle connections ready for checkout.
    pub available: usize,
    /// Callers waiting for a connection.
    pub waiting: usize,
}

/// deadpool pool over MySQL connections with live-adjustable limits.
///
/// deadpool only knows a maximum size, so the idle cap and max lifetime are enforced
/// here: idle connections beyond `max_idle` are dropped every time a connection is
/// released, and the manager refuses to recycle connections past their lifetime.
pub struct MysqlPool {
    inner: Pool<MysqlManager>,
    max_lifetime_ms: Arc<AtomicU64>,
    max_idle: usize,
}

impl fmt::Debug for MysqlPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlPool")
            .field("status", &self.status())
            .field("max_idle", &self.max_idle)
            .field("max_lifetime", &self.max_lifetime())
            .finish()
    }
}

impl MysqlPool {
    /// Build the pool without opening any connection.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Pool` if deadpool rejects the configuration.
    pub(crate) fn build(
        host: String,
        connect_options: MySqlConnectOptions,
        connect_timeout: Duration,
        settings: &PoolSettings,
    ) -> Result<Self, MysqlMiddlewareError> {
        let max_lifetime_ms = Arc::new(AtomicU64::new(duration_millis(settings.max_lifetime)));
        let manager = MysqlManager::new(
            host,
            connect_options,
            connect_timeout,
            Arc::clone(&max_lifetime_ms),
        );

        let inner = Pool::builder(manager)
            .max_size(settings.max_open)
            .build()
            .map_err(|e| MysqlMiddlewareError::Pool(format!("Failed to create MySQL pool: {e}")))?;

        Ok(Self {
            inner,
            max_lifetime_ms,
            max_idle: settings.max_idle,
        })
    }

    /// Check out a connection, opening one if none is idle.
    ///
    /// # Errors
    /// Returns the connect error from the manager, or `MysqlMiddlewareError::Pool` if the
    /// pool is closed.
    pub async fn get(&self) -> Result<MysqlPoolConnection, MysqlMiddlewareError> {
        Ok(self.inner.get().await?)
    }

    /// Return a connection and trim idle connections down to the configured cap.
    pub fn release(&self, conn: MysqlPoolConnection) {
        drop(conn);
        self.trim_idle();
    }

    /// Round trip to the server on a pooled connection.
    ///
    /// # Errors
    /// Returns the checkout or ping error.
    pub async fn ping(&self) -> Result<(), MysqlMiddlewareError> {
        let mut conn = self.get().await?;
        conn.ping().await?;
        self.release(conn);
        Ok(())
    }

    /// Apply new limits to the running pool.
    pub fn apply(&mut self, settings: &PoolSettings) {
        self.max_lifetime_ms
            .store(duration_millis(settings.max_lifetime), Ordering::Relaxed);
        self.max_idle = settings.max_idle;
        if self.inner.status().max_size != settings.max_open {
            self.inner.resize(settings.max_open);
        }
        self.trim_idle();
    }

    fn max_lifetime(&self) -> Duration {
        Duration::from_millis(self.max_lifetime_ms.load(Ordering::Relaxed))
    }

    fn trim_idle(&self) {
        let max_lifetime = self.max_lifetime();
        let keep = Cell::new(self.max_idle);
        let dropped = Cell::new(0_usize);
        let _ = self.inner.retain(|_, metrics| {
            if keep.get() == 0 || outlived(max_lifetime, metrics.age()) {
                dropped.set(dropped.get() + 1);
                return false;
            }
            keep.set(keep.get() - 1);
            true
        });
        if dropped.get() > 0 {
            debug!(dropped = dropped.get(), max_idle = self.max_idle, "trimmed idle connections");
        }
    }

    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let status = self.inner.status();
        PoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// Close the pool; idle connections are dropped and later checkouts fail.
    pub fn close(&self) {
        self.inner.close();
    }
}

// Sub-millisecond lifetimes round up so they don't read back as "unlimited".
fn duration_millis(duration: Duration) -> u64 {
    if duration.is_zero() {
        return 0;
    }
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_millis_never_collapse_to_unlimited() {
        assert_eq!(duration_millis(Duration::ZERO), 0);
        assert_eq!(duration_millis(Duration::from_micros(200)), 1);
        assert_eq!(duration_millis(Duration::from_secs(2)), 2_000);
    }
}
