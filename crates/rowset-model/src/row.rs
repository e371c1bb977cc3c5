use crate::cell::Cell;
use crate::error::{Result, TableError};
use crate::headers::Headers;
use crate::record::Record;

/// Resolve a possibly-negative index against a length.
pub fn resolve_signed(index: isize, len: usize) -> Result<usize> {
    let shifted = if index < 0 {
        index + len as isize
    } else {
        index
    };
    if shifted < 0 || shifted as usize >= len {
        return Err(TableError::IndexOutOfRange { index, len });
    }
    Ok(shifted as usize)
}

/// A single data row: one owned, mutable buffer of cells.
///
/// A row is *well-formed* when its length equals the resolver's column
/// count and *jagged* otherwise. Jaggedness is recomputed on every query,
/// never cached. The optional label is assigned on demand by
/// `Table::label_rows` and is not persisted by the snapshot format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Cell>,
    label: Option<usize>,
}

impl Row {
    pub fn new(values: Vec<Cell>) -> Self {
        Self {
            values,
            label: None,
        }
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// The raw buffer. Shrinking or growing it is how a row becomes
    /// jagged; the container never repairs that silently.
    pub fn values_mut(&mut self) -> &mut Vec<Cell> {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_jagged(&self, column_count: usize) -> bool {
        self.values.len() != column_count
    }

    pub fn label(&self) -> Option<usize> {
        self.label
    }

    pub fn set_label(&mut self, label: Option<usize>) {
        self.label = label;
    }

    /// Positional read; negative indices count from the end.
    pub fn at(&self, index: isize) -> Result<&Cell> {
        let pos = resolve_signed(index, self.values.len())?;
        Ok(&self.values[pos])
    }

    pub fn at_mut(&mut self, index: isize) -> Result<&mut Cell> {
        let pos = resolve_signed(index, self.values.len())?;
        Ok(&mut self.values[pos])
    }

    pub fn set_at(&mut self, index: isize, value: impl Into<Cell>) -> Result<()> {
        *self.at_mut(index)? = value.into();
        Ok(())
    }

    /// Slice read with signed endpoints; `end` is exclusive and `end == len`
    /// is allowed.
    pub fn slice(&self, start: isize, end: isize) -> Result<&[Cell]> {
        let len = self.values.len();
        let lo = resolve_signed(start, len)?;
        let hi = if end == len as isize {
            len
        } else {
            resolve_signed(end, len)?
        };
        if lo > hi {
            return Err(TableError::IndexOutOfRange { index: end, len });
        }
        Ok(&self.values[lo..hi])
    }
}

impl From<Vec<Cell>> for Row {
    fn from(values: Vec<Cell>) -> Self {
        Row::new(values)
    }
}

/// Immutable row view bound to the table's current header resolver.
///
/// This is what table iteration yields: name-based reads over the stored
/// row, with no defensive copies.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    headers: &'a Headers,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    pub fn new(headers: &'a Headers, row: &'a Row) -> Self {
        Self { headers, row }
    }

    pub fn headers(&self) -> &'a Headers {
        self.headers
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }

    pub fn values(&self) -> &'a [Cell] {
        self.row.values()
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    pub fn is_jagged(&self) -> bool {
        self.row.is_jagged(self.headers.len())
    }

    pub fn label(&self) -> Option<usize> {
        self.row.label()
    }

    /// Read a cell by column name.
    ///
    /// On a jagged row that is too short to hold the resolved position,
    /// this fails with [`TableError::IndexOutOfRange`].
    pub fn get(&self, name: &str) -> Result<&'a Cell> {
        let pos = self.headers.position_of(name)?;
        self.row
            .values()
            .get(pos)
            .ok_or(TableError::IndexOutOfRange {
                index: pos as isize,
                len: self.row.len(),
            })
    }

    pub fn at(&self, index: isize) -> Result<&'a Cell> {
        self.row.at(index)
    }

    /// Project to an ordered name → cell map. Pure projection; extra
    /// cells on an over-long jagged row have no name and are dropped.
    pub fn to_record(&self) -> Record {
        self.headers
            .names()
            .iter()
            .zip(self.row.values())
            .map(|(name, cell)| (name.clone(), cell.clone()))
            .collect()
    }

    /// Project to owned cells.
    pub fn to_values(&self) -> Vec<Cell> {
        self.row.values().to_vec()
    }
}

/// Mutable row view; writes go straight to the container's stored row.
#[derive(Debug)]
pub struct RowMut<'a> {
    headers: &'a Headers,
    row: &'a mut Row,
}

impl<'a> RowMut<'a> {
    pub fn new(headers: &'a Headers, row: &'a mut Row) -> Self {
        Self { headers, row }
    }

    pub fn as_ref(&self) -> RowRef<'_> {
        RowRef::new(self.headers, self.row)
    }

    pub fn headers(&self) -> &'a Headers {
        self.headers
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_jagged(&self) -> bool {
        self.row.is_jagged(self.headers.len())
    }

    pub fn label(&self) -> Option<usize> {
        self.row.label()
    }

    pub fn get(&self, name: &str) -> Result<&Cell> {
        let pos = self.headers.position_of(name)?;
        self.row
            .values()
            .get(pos)
            .ok_or(TableError::IndexOutOfRange {
                index: pos as isize,
                len: self.row.len(),
            })
    }

    /// Write a cell by column name.
    ///
    /// Writing past the end of a too-short jagged row fails with a
    /// length-mismatch error rather than silently extending the row.
    pub fn set(&mut self, name: &str, value: impl Into<Cell>) -> Result<()> {
        let pos = self.headers.position_of(name)?;
        if pos >= self.row.len() {
            return Err(TableError::LengthMismatch {
                expected: self.headers.len(),
                actual: self.row.len(),
            });
        }
        self.row.values_mut()[pos] = value.into();
        Ok(())
    }

    pub fn at(&self, index: isize) -> Result<&Cell> {
        self.row.at(index)
    }

    pub fn set_at(&mut self, index: isize, value: impl Into<Cell>) -> Result<()> {
        self.row.set_at(index, value)
    }

    pub fn values(&self) -> &[Cell] {
        self.row.values()
    }

    pub fn values_mut(&mut self) -> &mut Vec<Cell> {
        self.row.values_mut()
    }

    pub fn to_record(&self) -> Record {
        self.as_ref().to_record()
    }

    /// Copy every cell whose column name exists in both rows — the
    /// "absorb matching columns" join convenience. Cells missing from
    /// either jagged side are skipped.
    pub fn absorb(&mut self, other: &RowRef<'_>) {
        for (pos, name) in self.headers.names().iter().enumerate() {
            if pos >= self.row.len() {
                break;
            }
            if let Ok(cell) = other.get(name) {
                self.row.values_mut()[pos] = cell.clone();
            }
        }
    }
}
