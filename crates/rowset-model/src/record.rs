use indexmap::IndexMap;

use crate::cell::Cell;

/// An ordered name → cell mapping: the attribute-bearing construction
/// input and the projection produced by `RowRef::to_record`.
///
/// Key order is insertion order, which is what makes "column order from
/// the first record" reconstruction possible.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Cell>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Option<Cell> {
        self.0.insert(name.into(), cell.into())
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Cell> {
        self.0
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Cell);
    type IntoIter = indexmap::map::IntoIter<String, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
