use std::ops::Index;

use serde::Serialize;

use super::row::RowMap;

/// All rows returned by a query, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<RowMap>,
}

impl ResultSet {
    pub fn add_row(&mut self, row: RowMap) {
        self.results.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowMap> {
        self.results.iter()
    }
}

impl Index<usize> for ResultSet {
    type Output = RowMap;

    fn index(&self, index: usize) -> &Self::Output {
        &self.results[index]
    }
}

impl IntoIterator for ResultSet {
    type Item = RowMap;
    type IntoIter = std::vec::IntoIter<RowMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a RowMap;
    type IntoIter = std::slice::Iter<'a, RowMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
