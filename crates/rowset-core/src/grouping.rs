//! Grouping maps: single-row, multi-row, nested, and contiguous-run.
//!
//! All maps preserve first-seen key order for iteration; only the
//! contiguous grouping is adjacency-sensitive.

use std::ops::Range;

use indexmap::{IndexMap, IndexSet};

use rowset_model::{Cell, Headers, Record, Result, Row, RowRef, TableError};

use crate::select::{GroupKey, KeyPlan, KeySelector};
use crate::table::Table;

/// A hierarchy of nested grouping maps, one level per key column,
/// terminating in row-index leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupTree {
    Branch(IndexMap<GroupKey, GroupTree>),
    Rows(Vec<usize>),
}

impl GroupTree {
    pub fn rows(&self) -> Option<&[usize]> {
        match self {
            GroupTree::Rows(rows) => Some(rows),
            GroupTree::Branch(_) => None,
        }
    }

    pub fn branches(&self) -> Option<&IndexMap<GroupKey, GroupTree>> {
        match self {
            GroupTree::Branch(map) => Some(map),
            GroupTree::Rows(_) => None,
        }
    }

    /// Descend one level by a single key cell.
    pub fn get(&self, cell: &Cell) -> Option<&GroupTree> {
        self.branches()
            .and_then(|map| map.get(&GroupKey::single(cell.clone())))
    }

    /// Total number of rows under this node.
    pub fn row_count(&self) -> usize {
        match self {
            GroupTree::Rows(rows) => rows.len(),
            GroupTree::Branch(map) => map.values().map(GroupTree::row_count).sum(),
        }
    }
}

/// One adjacency run produced by [`Table::contiguous`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowRun {
    pub key: GroupKey,
    pub rows: Range<usize>,
}

impl RowRun {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lazy iterator over contiguous runs; restart by re-invoking
/// [`Table::contiguous`].
pub struct Contiguous<'t, 's> {
    headers: &'t Headers,
    rows: &'t [Row],
    plan: KeyPlan<'s>,
    pos: usize,
}

impl Iterator for Contiguous<'_, '_> {
    type Item = RowRun;

    fn next(&mut self) -> Option<RowRun> {
        if self.pos >= self.rows.len() {
            return None;
        }
        let start = self.pos;
        let key = self
            .plan
            .key_of(RowRef::new(self.headers, &self.rows[start]));
        self.pos += 1;
        while self.pos < self.rows.len() {
            let next = self
                .plan
                .key_of(RowRef::new(self.headers, &self.rows[self.pos]));
            if next != key {
                break;
            }
            self.pos += 1;
        }
        Some(RowRun {
            key,
            rows: start..self.pos,
        })
    }
}

impl Table {
    /// Distinct key values in first-seen order, duplicates collapsed.
    pub fn unique(&self, selector: &KeySelector) -> Result<IndexSet<GroupKey>> {
        let plan = selector.plan(self.headers())?;
        Ok(self.iter().map(|row| plan.key_of(row)).collect())
    }

    /// Single-row map: key → row index, **last write wins** on repeated
    /// keys. First-seen key order is preserved; overall row order in the
    /// table is unaffected.
    pub fn map_rows(&self, selector: &KeySelector) -> Result<IndexMap<GroupKey, usize>> {
        let plan = selector.plan(self.headers())?;
        let mut map = IndexMap::new();
        for (idx, row) in self.iter().enumerate() {
            map.insert(plan.key_of(row), idx);
        }
        Ok(map)
    }

    /// Multi-row map: key → row indices in encounter order. This is the
    /// group-by primitive.
    pub fn map_rows_append(&self, selector: &KeySelector) -> Result<IndexMap<GroupKey, Vec<usize>>> {
        let plan = selector.plan(self.headers())?;
        let mut map: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
        for (idx, row) in self.iter().enumerate() {
            map.entry(plan.key_of(row)).or_default().push(idx);
        }
        Ok(map)
    }

    /// Multi-row map with a caller-chosen entry representation; grouping
    /// logic is unchanged.
    pub fn map_rows_append_with<T, F>(
        &self,
        selector: &KeySelector,
        mut shape: F,
    ) -> Result<IndexMap<GroupKey, Vec<T>>>
    where
        F: FnMut(RowRef<'_>) -> T,
    {
        let plan = selector.plan(self.headers())?;
        let mut map: IndexMap<GroupKey, Vec<T>> = IndexMap::new();
        for row in self.iter() {
            map.entry(plan.key_of(row)).or_default().push(shape(row));
        }
        Ok(map)
    }

    /// Multi-row map accumulating plain ordered values.
    pub fn map_rows_append_values(
        &self,
        selector: &KeySelector,
    ) -> Result<IndexMap<GroupKey, Vec<Vec<Cell>>>> {
        self.map_rows_append_with(selector, |row| row.to_values())
    }

    /// Multi-row map accumulating named-field records.
    pub fn map_rows_append_records(
        &self,
        selector: &KeySelector,
    ) -> Result<IndexMap<GroupKey, Vec<Record>>> {
        self.map_rows_append_with(selector, |row| row.to_record())
    }

    /// Hierarchically nested grouping: one branch level per key cell,
    /// row-index lists at the deepest level. Equivalent to grouping by
    /// the first key and recursively grouping each partition by the
    /// remaining keys.
    ///
    /// A derived key function must yield the same number of cells for
    /// every row.
    pub fn map_rows_nested(&self, selector: &KeySelector) -> Result<GroupTree> {
        let plan = selector.plan(self.headers())?;
        let keys: Vec<Vec<Cell>> = self
            .iter()
            .map(|row| plan.key_of(row).into_cells())
            .collect();
        let width = match &plan {
            KeyPlan::Positions(positions) => positions.len(),
            KeyPlan::Derived(_) => keys.first().map_or(0, Vec::len),
        };
        for cells in &keys {
            if cells.len() != width {
                return Err(TableError::LengthMismatch {
                    expected: width,
                    actual: cells.len(),
                });
            }
        }
        let indices: Vec<usize> = (0..keys.len()).collect();
        Ok(build_tree(&keys, indices, 0, width))
    }

    /// Alias for [`Table::map_rows_nested`].
    pub fn groupby(&self, selector: &KeySelector) -> Result<GroupTree> {
        self.map_rows_nested(selector)
    }

    /// Partition rows into adjacency runs: a new group starts whenever
    /// the key changes from the immediately preceding row, even if the
    /// same value reappears later.
    pub fn contiguous<'t, 's>(&'t self, selector: &'s KeySelector) -> Result<Contiguous<'t, 's>> {
        let plan = selector.plan(self.headers())?;
        let (headers, rows) = self.parts();
        Ok(Contiguous {
            headers,
            rows,
            plan,
            pos: 0,
        })
    }
}

fn build_tree(keys: &[Vec<Cell>], indices: Vec<usize>, depth: usize, width: usize) -> GroupTree {
    if depth == width {
        return GroupTree::Rows(indices);
    }
    let mut partitions: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
    for idx in indices {
        partitions
            .entry(GroupKey::single(keys[idx][depth].clone()))
            .or_default()
            .push(idx);
    }
    GroupTree::Branch(
        partitions
            .into_iter()
            .map(|(key, sub)| (key, build_tree(keys, sub, depth + 1, width)))
            .collect(),
    )
}
