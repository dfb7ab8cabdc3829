use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One materialized row: column name to string value, in column order.
///
/// Keys are unique. Inserting an existing column overwrites its value in place, which is
/// what gives [`Client::get_row`](crate::Client::get_row) its last-row-wins behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMap {
    columns: Vec<String>,
    values: Vec<String>,
    // Internal cache for faster column lookups
    column_index_cache: HashMap<String, usize>,
}

impl RowMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            column_index_cache: HashMap::with_capacity(capacity),
        }
    }

    /// Set `column` to `value`, returning the previous value if the column was present.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let column = column.into();
        let value = value.into();
        if let Some(&idx) = self.column_index_cache.get(&column) {
            return Some(std::mem::replace(&mut self.values[idx], value));
        }
        self.column_index_cache.insert(column.clone(), self.columns.len());
        self.columns.push(column);
        self.values.push(value);
        None
    }

    /// Overwrite this row's columns with every column of `other`.
    pub fn merge_from(&mut self, other: RowMap) {
        for (column, value) in other.columns.into_iter().zip(other.values) {
            self.insert(column, value);
        }
    }

    /// Get a value by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&str> {
        self.column_index_cache
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
            .map(String::as_str)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RowMap::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_in_place() {
        let mut row = RowMap::new();
        assert_eq!(row.insert("id", "1"), None);
        row.insert("name", "alice");
        assert_eq!(row.insert("id", "2").as_deref(), Some("1"));

        assert_eq!(row.columns(), ["id".to_string(), "name".to_string()]);
        assert_eq!(row.get("id"), Some("2"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn merge_keeps_last_value_per_column() {
        let mut acc = RowMap::new();
        acc.merge_from([("id", "1"), ("name", "alice")].into_iter().collect());
        acc.merge_from([("id", "2"), ("name", "")].into_iter().collect());

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.get("id"), Some("2"));
        assert_eq!(acc.get("name"), Some(""));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let row: RowMap = [("b", "2"), ("a", "1")].into_iter().collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1"}"#);
    }
}
