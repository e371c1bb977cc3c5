//! Sort, filter, jagged detection, and caller-defined row checks.

use std::cmp::Ordering;
use std::collections::HashSet;

use rowset_model::{Cell, Result, Row, RowRef, TableError};

use crate::select::{GroupKey, KeySelector, SortKey};
use crate::table::{NIL, Table};

enum KeyExtract<'k> {
    Pos(usize),
    Fn(&'k dyn Fn(RowRef<'_>) -> Cell),
}

impl Table {
    /// Stable multi-key sort, in place.
    ///
    /// `reverse` holds one flag per key, each independently inverting
    /// that key's direction; a shorter list pads `false` and extras are
    /// ignored. Ties preserve the original relative row order. Key
    /// functions run once per row.
    pub fn sort(&mut self, keys: &[SortKey], reverse: &[bool]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut decorated = {
            let (headers, rows) = self.parts();
            let extractors = keys
                .iter()
                .map(|key| match key {
                    SortKey::Column(id) => Ok(KeyExtract::Pos(id.resolve(headers)?)),
                    SortKey::Derived(f) => Ok(KeyExtract::Fn(f.as_ref())),
                })
                .collect::<Result<Vec<KeyExtract<'_>>>>()?;
            rows.iter()
                .enumerate()
                .map(|(idx, row)| {
                    let view = RowRef::new(headers, row);
                    let cells: Vec<Cell> = extractors
                        .iter()
                        .map(|extract| match extract {
                            KeyExtract::Pos(pos) => {
                                row.values().get(*pos).unwrap_or(&NIL).clone()
                            }
                            KeyExtract::Fn(f) => f(view),
                        })
                        .collect();
                    (cells, idx)
                })
                .collect::<Vec<(Vec<Cell>, usize)>>()
        };
        decorated.sort_by(|a, b| {
            for (key_idx, (ka, kb)) in a.0.iter().zip(&b.0).enumerate() {
                let mut ord = ka.total_cmp(kb);
                if reverse.get(key_idx).copied().unwrap_or(false) {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        let mut slots: Vec<Option<Row>> = std::mem::take(self.rows_vec_mut())
            .into_iter()
            .map(Some)
            .collect();
        let rows = decorated
            .into_iter()
            .map(|(_, idx)| slots[idx].take().expect("each source row moves exactly once"))
            .collect();
        self.replace_rows(rows);
        Ok(())
    }

    /// Stable multi-key sort, as a copy.
    pub fn sorted(&self, keys: &[SortKey], reverse: &[bool]) -> Result<Table> {
        let mut copy = self.clone();
        copy.sort(keys, reverse)?;
        Ok(copy)
    }

    /// Remove rows failing the predicate, in place.
    pub fn filter<F>(&mut self, mut pred: F)
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let (headers, rows) = self.parts_mut();
        rows.retain(|row| pred(RowRef::new(headers, row)));
    }

    /// Rows passing the predicate, as a copy.
    pub fn filtered<F>(&self, pred: F) -> Table
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let mut copy = self.clone();
        copy.filter(pred);
        copy
    }

    /// Keep only the first row seen per distinct key combination.
    pub fn filter_by_unique(&mut self, selector: &KeySelector) -> Result<()> {
        let plan = selector.plan(self.headers())?;
        let mut seen: HashSet<GroupKey> = HashSet::new();
        let (headers, rows) = self.parts_mut();
        rows.retain(|row| seen.insert(plan.key_of(RowRef::new(headers, row))));
        Ok(())
    }

    /// First-per-key filtering, as a copy.
    pub fn filtered_by_unique(&self, selector: &KeySelector) -> Result<Table> {
        let mut copy = self.clone();
        copy.filter_by_unique(selector)?;
        Ok(copy)
    }

    /// True iff any row's length differs from the column count.
    ///
    /// Recomputed on every call; jaggedness is never cached.
    pub fn is_jagged(&self) -> bool {
        let cols = self.num_cols();
        self.rows().iter().any(|row| row.is_jagged(cols))
    }

    /// Lazy sequence of the jagged rows in original order, with indices.
    /// Restart by calling again.
    pub fn jagged_rows(&self) -> impl Iterator<Item = (usize, RowRef<'_>)> {
        self.iter()
            .enumerate()
            .filter(|(_, row)| row.is_jagged())
    }

    /// Run a caller-defined consistency check over all rows.
    ///
    /// Rows failing the predicate are reported through
    /// [`TableError::Validation`] with their 1-based indices.
    pub fn check_rows<F>(&self, check: &str, mut pred: F) -> Result<()>
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let failing: Vec<usize> = self
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| (!pred(row)).then_some(idx + 1))
            .collect();
        if failing.is_empty() {
            Ok(())
        } else {
            Err(TableError::Validation {
                check: check.to_string(),
                rows: failing,
            })
        }
    }
}
