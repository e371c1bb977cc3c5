//! Key sources for the transform and grouping engines.
//!
//! Grouping and sorting are key-source agnostic: a key may come from named
//! columns, signed positions, a positional slice, or a caller-supplied
//! function deriving cells from a row.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use rowset_model::{Cell, Headers, Result, RowRef, TableError, resolve_signed};

use crate::table::NIL;

/// A column addressed by display name, lookup key, or signed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnId {
    Name(String),
    Index(isize),
}

impl ColumnId {
    pub fn resolve(&self, headers: &Headers) -> Result<usize> {
        match self {
            ColumnId::Name(name) => headers.position_of(name),
            ColumnId::Index(index) => resolve_signed(*index, headers.len()),
        }
    }
}

impl From<&str> for ColumnId {
    fn from(name: &str) -> Self {
        ColumnId::Name(name.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(name: String) -> Self {
        ColumnId::Name(name)
    }
}

impl From<isize> for ColumnId {
    fn from(index: isize) -> Self {
        ColumnId::Index(index)
    }
}

impl From<i32> for ColumnId {
    fn from(index: i32) -> Self {
        ColumnId::Index(index as isize)
    }
}

/// A grouping key: one cell per key column (or whatever a key function
/// returned).
///
/// Equality and hashing go through [`Cell::key_eq`] / [`Cell::key_hash`],
/// so float keys compare by bit pattern and NaN groups with NaN.
#[derive(Debug, Clone)]
pub struct GroupKey(Vec<Cell>);

impl GroupKey {
    pub fn new(cells: Vec<Cell>) -> Self {
        GroupKey(cells)
    }

    pub fn single(cell: Cell) -> Self {
        GroupKey(vec![cell])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }
}

impl From<Vec<Cell>> for GroupKey {
    fn from(cells: Vec<Cell>) -> Self {
        GroupKey(cells)
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| a.key_eq(b))
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for cell in &self.0 {
            cell.key_hash(state);
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (pos, cell) in self.0.iter().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, ")")
    }
}

/// How grouping keys are derived from rows.
pub enum KeySelector {
    /// One or more columns, by name or signed position.
    Columns(Vec<ColumnId>),
    /// A signed positional slice (exclusive end).
    Slice { start: isize, end: isize },
    /// A caller-supplied key function.
    Derived(Box<dyn Fn(RowRef<'_>) -> Vec<Cell>>),
}

impl KeySelector {
    pub fn column(id: impl Into<ColumnId>) -> Self {
        KeySelector::Columns(vec![id.into()])
    }

    pub fn columns<I, C>(ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnId>,
    {
        KeySelector::Columns(ids.into_iter().map(Into::into).collect())
    }

    pub fn slice(start: isize, end: isize) -> Self {
        KeySelector::Slice { start, end }
    }

    pub fn derived(f: impl Fn(RowRef<'_>) -> Vec<Cell> + 'static) -> Self {
        KeySelector::Derived(Box::new(f))
    }

    /// Resolve column references once, up front; per-row extraction is
    /// then infallible.
    pub(crate) fn plan<'s>(&'s self, headers: &Headers) -> Result<KeyPlan<'s>> {
        match self {
            KeySelector::Columns(ids) => {
                let positions = ids
                    .iter()
                    .map(|id| id.resolve(headers))
                    .collect::<Result<Vec<usize>>>()?;
                Ok(KeyPlan::Positions(positions))
            }
            KeySelector::Slice { start, end } => {
                let range = resolve_key_span(*start, *end, headers.len())?;
                Ok(KeyPlan::Positions(range.collect()))
            }
            KeySelector::Derived(f) => Ok(KeyPlan::Derived(f.as_ref())),
        }
    }
}

impl fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySelector::Columns(ids) => f.debug_tuple("Columns").field(ids).finish(),
            KeySelector::Slice { start, end } => f
                .debug_struct("Slice")
                .field("start", start)
                .field("end", end)
                .finish(),
            KeySelector::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

pub(crate) enum KeyPlan<'s> {
    Positions(Vec<usize>),
    Derived(&'s dyn Fn(RowRef<'_>) -> Vec<Cell>),
}

impl KeyPlan<'_> {
    /// Extract the key cells for a row. Positions past the end of a
    /// jagged row yield `Nil` — the documented projection policy.
    pub(crate) fn key_of(&self, row: RowRef<'_>) -> GroupKey {
        match self {
            KeyPlan::Positions(positions) => GroupKey::new(
                positions
                    .iter()
                    .map(|&pos| row.values().get(pos).unwrap_or(&NIL).clone())
                    .collect(),
            ),
            KeyPlan::Derived(f) => GroupKey::new(f(row)),
        }
    }
}

fn resolve_key_span(start: isize, end: isize, len: usize) -> Result<Range<usize>> {
    let lo = resolve_signed(start, len)?;
    let hi = if end == len as isize {
        len
    } else {
        resolve_signed(end, len)?
    };
    if lo > hi {
        return Err(TableError::IndexOutOfRange { index: end, len });
    }
    Ok(lo..hi)
}

/// One sort key: a column or a derived key function.
pub enum SortKey {
    Column(ColumnId),
    Derived(Box<dyn Fn(RowRef<'_>) -> Cell>),
}

impl SortKey {
    pub fn column(id: impl Into<ColumnId>) -> Self {
        SortKey::Column(id.into())
    }

    pub fn derived(f: impl Fn(RowRef<'_>) -> Cell + 'static) -> Self {
        SortKey::Derived(Box::new(f))
    }
}

impl From<&str> for SortKey {
    fn from(name: &str) -> Self {
        SortKey::Column(ColumnId::from(name))
    }
}

impl From<isize> for SortKey {
    fn from(index: isize) -> Self {
        SortKey::Column(ColumnId::from(index))
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Column(id) => f.debug_tuple("Column").field(id).finish(),
            SortKey::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_key_equality_ignores_float_identity_quirks() {
        let a = GroupKey::new(vec![Cell::Float(f64::NAN), Cell::from("x")]);
        let b = GroupKey::new(vec![Cell::Float(f64::NAN), Cell::from("x")]);
        assert_eq!(a, b);
    }

    #[test]
    fn column_id_resolves_names_and_signed_indices() {
        let headers = Headers::build(["a", "b", "c"]).unwrap();
        assert_eq!(ColumnId::from("b").resolve(&headers).unwrap(), 1);
        assert_eq!(ColumnId::from(-1).resolve(&headers).unwrap(), 2);
        assert!(ColumnId::from("zz").resolve(&headers).is_err());
    }

    #[test]
    fn slice_selector_plans_to_positions() {
        let headers = Headers::build(["a", "b", "c", "d"]).unwrap();
        let selector = KeySelector::slice(-3, -1);
        let KeyPlan::Positions(positions) = selector.plan(&headers).unwrap() else {
            panic!("expected positions");
        };
        assert_eq!(positions, vec![1, 2]);
    }
}
