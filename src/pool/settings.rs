use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cap on open connections when none (or `0`) is given.
pub const DEFAULT_MAX_OPEN: usize = 16;
/// Default number of idle connections kept around between calls.
pub const DEFAULT_MAX_IDLE: usize = 2;

/// Pool limits applied at connect time and adjustable afterwards through the
/// `Client::set_*` methods.
///
/// Durations are read and written in `humantime` form (`"30m"`, `"1h 30m"`):
/// ```rust
/// use mysql_middleware::PoolSettings;
///
/// let settings: PoolSettings =
///     serde_json::from_str(r#"{"max_lifetime": "5m", "max_open": 4}"#).unwrap();
/// assert_eq!(settings.max_lifetime.as_secs(), 300);
/// assert_eq!(settings.max_idle, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Connections older than this are discarded instead of reused. Zero means unlimited.
    #[serde(with = "duration_text")]
    pub max_lifetime: Duration,
    /// Idle connections kept after a call returns its connection. Never above `max_open`.
    pub max_idle: usize,
    /// Upper bound on connections the pool will open.
    pub max_open: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::ZERO,
            max_idle: DEFAULT_MAX_IDLE,
            max_open: DEFAULT_MAX_OPEN,
        }
    }
}

impl PoolSettings {
    #[must_use]
    pub fn with_max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }

    /// `0` keeps no idle connections; values above `max_open` are lowered to it.
    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle.min(self.max_open);
        self
    }

    /// `0` restores [`DEFAULT_MAX_OPEN`]. Lowers `max_idle` if it would exceed the new cap.
    #[must_use]
    pub fn with_max_open(mut self, max_open: usize) -> Self {
        self.max_open = if max_open == 0 {
            DEFAULT_MAX_OPEN
        } else {
            max_open
        };
        self.max_idle = self.max_idle.min(self.max_open);
        self
    }

    /// Re-establish `max_idle <= max_open` and a non-zero `max_open` after deserializing.
    #[must_use]
    pub fn normalized(self) -> Self {
        let max_idle = self.max_idle;
        self.with_max_open(self.max_open).with_max_idle(max_idle)
    }
}

mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
