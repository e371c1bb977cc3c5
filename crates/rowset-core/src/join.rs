//! Key-equality inner join between two tables.

use rowset_model::{Result, RowRef};

use crate::select::{ColumnId, GroupKey, KeySelector};
use crate::table::{NIL, Table};

/// Which column pairs the two sides of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinKey {
    left: ColumnId,
    right: ColumnId,
}

impl JoinKey {
    /// Join on the same column name in both tables.
    pub fn on(name: &str) -> Self {
        Self {
            left: ColumnId::from(name),
            right: ColumnId::from(name),
        }
    }

    /// Join a left column against a differently-addressed right column.
    pub fn pair(left: impl Into<ColumnId>, right: impl Into<ColumnId>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

fn left_key(row: RowRef<'_>, pos: usize) -> GroupKey {
    GroupKey::single(row.values().get(pos).unwrap_or(&NIL).clone())
}

impl Table {
    /// Inner join against a single-row map of `other` (last right row per
    /// key wins). Yields `(left, matched right)` pairs lazily, in left
    /// row order, skipping left rows with no match.
    pub fn join<'t>(
        &'t self,
        other: &'t Table,
        key: &JoinKey,
    ) -> Result<impl Iterator<Item = (RowRef<'t>, RowRef<'t>)>> {
        let map = other.map_rows(&KeySelector::column(key.right.clone()))?;
        let left_pos = key.left.resolve(self.headers())?;
        let (other_headers, other_rows) = other.parts();
        Ok(self.iter().filter_map(move |left| {
            map.get(&left_key(left, left_pos))
                .map(|&idx| (left, RowRef::new(other_headers, &other_rows[idx])))
        }))
    }

    /// Inner join against a multi-row map of `other`: each matched left
    /// row pairs with every right row sharing the key, in encounter
    /// order.
    pub fn join_many<'t>(
        &'t self,
        other: &'t Table,
        key: &JoinKey,
    ) -> Result<impl Iterator<Item = (RowRef<'t>, Vec<RowRef<'t>>)>> {
        let map = other.map_rows_append(&KeySelector::column(key.right.clone()))?;
        let left_pos = key.left.resolve(self.headers())?;
        let (other_headers, other_rows) = other.parts();
        Ok(self.iter().filter_map(move |left| {
            map.get(&left_key(left, left_pos)).map(|indices| {
                let matches = indices
                    .iter()
                    .map(|&idx| RowRef::new(other_headers, &other_rows[idx]))
                    .collect();
                (left, matches)
            })
        }))
    }

    /// The pairing as index lists: `(left index, matched right indices)`.
    ///
    /// For workflows that mutate the left table while reading the right,
    /// where holding row views across the mutation is not possible.
    pub fn join_indices(&self, other: &Table, key: &JoinKey) -> Result<Vec<(usize, Vec<usize>)>> {
        let map = other.map_rows_append(&KeySelector::column(key.right.clone()))?;
        let left_pos = key.left.resolve(self.headers())?;
        Ok(self
            .iter()
            .enumerate()
            .filter_map(|(idx, left)| {
                map.get(&left_key(left, left_pos))
                    .map(|indices| (idx, indices.clone()))
            })
            .collect())
    }
}
