use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MysqlMiddlewareError;

pub const LAST_INSERT_ID_KEY: &str = "LastInsertId";
pub const ROWS_AFFECTED_KEY: &str = "RowsAffected";

/// Counters reported by the server for a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    #[serde(rename = "LastInsertId")]
    pub last_insert_id: i64,
    #[serde(rename = "RowsAffected")]
    pub rows_affected: i64,
}

impl WriteOutcome {
    /// Build from the driver's unsigned counters.
    ///
    /// # Errors
    /// Returns `MysqlMiddlewareError::Conversion` if either counter exceeds `i64::MAX`.
    pub fn from_driver(last_insert_id: u64, rows_affected: u64) -> Result<Self, MysqlMiddlewareError> {
        let last_insert_id = i64::try_from(last_insert_id).map_err(|e| {
            MysqlMiddlewareError::Conversion(format!("Invalid last insert id {last_insert_id}: {e}"))
        })?;
        let rows_affected = i64::try_from(rows_affected).map_err(|e| {
            MysqlMiddlewareError::Conversion(format!("Invalid rows affected count {rows_affected}: {e}"))
        })?;
        Ok(Self {
            last_insert_id,
            rows_affected,
        })
    }

    /// The two counters keyed by `"LastInsertId"` and `"RowsAffected"`.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, i64> {
        HashMap::from([
            (LAST_INSERT_ID_KEY.to_string(), self.last_insert_id),
            (ROWS_AFFECTED_KEY.to_string(), self.rows_affected),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_has_exactly_the_fixed_keys() {
        let outcome = WriteOutcome::from_driver(42, 1).unwrap();
        let map = outcome.into_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[LAST_INSERT_ID_KEY], 42);
        assert_eq!(map[ROWS_AFFECTED_KEY], 1);

        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json, serde_json::json!({"LastInsertId": 42, "RowsAffected": 1}));
    }

    #[test]
    fn counters_above_i64_max_are_rejected() {
        let err = WriteOutcome::from_driver(u64::MAX, 0).unwrap_err();
        assert!(matches!(err, MysqlMiddlewareError::Conversion(_)));
    }
}
