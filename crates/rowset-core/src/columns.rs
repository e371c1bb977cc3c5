//! Column-schema operations.
//!
//! Every operation here rebuilds the header resolver and adjusts row
//! buffers to match. Each edit changes every reachable row by the same
//! amount, so a jagged row stays jagged by the same delta instead of
//! being silently repaired; cells introduced by an edit are back-filled
//! with the `Nil` sentinel.

use rowset_model::{Cell, Headers, Result, TableError, resolve_signed};

use crate::select::ColumnId;
use crate::table::{NIL, Table};

/// One column in a [`Table::reassign_columns`] pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    /// Carry an existing column through unchanged.
    Keep(String),
    /// Carry an existing column's values under a new name. The same
    /// source may appear more than once, duplicating its values.
    Rename { from: String, to: String },
    /// A new empty column.
    Insert(String),
}

impl ColumnSpec {
    pub fn keep(name: impl Into<String>) -> Self {
        ColumnSpec::Keep(name.into())
    }

    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        ColumnSpec::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn insert(name: impl Into<String>) -> Self {
        ColumnSpec::Insert(name.into())
    }
}

impl Table {
    /// Insert named columns. Each anchor is an existing column (the new
    /// column lands before it) or a signed index over the insert slots,
    /// where `len` appends.
    pub fn insert_columns<I, C, S>(&mut self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = (C, S)>,
        C: Into<ColumnId>,
        S: Into<String>,
    {
        for (anchor, name) in columns {
            let name = name.into();
            let pos = match anchor.into() {
                ColumnId::Name(existing) => self.headers().position_of(&existing)?,
                ColumnId::Index(index) => resolve_signed(index, self.headers().len() + 1)?,
            };
            self.headers_mut().insert_at(pos, &name)?;
            for row in self.rows_vec_mut() {
                let at = pos.min(row.len());
                row.values_mut().insert(at, Cell::Nil);
            }
        }
        Ok(())
    }

    /// Append named columns, back-filling `Nil` in every row.
    pub fn append_columns<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            let pos = self.headers().len();
            self.headers_mut().insert_at(pos, &name)?;
            for row in self.rows_vec_mut() {
                row.values_mut().push(Cell::Nil);
            }
        }
        Ok(())
    }

    /// Delete columns by name. Rows too short to hold the deleted
    /// position are left alone.
    pub fn delete_columns<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let pos = self.headers_mut().delete(name.as_ref())?;
            for row in self.rows_vec_mut() {
                if pos < row.len() {
                    row.values_mut().remove(pos);
                }
            }
        }
        Ok(())
    }

    /// Rename columns; positions are unaffected.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) -> Result<()> {
        self.headers_mut().rename(renames)
    }

    /// Compose keep/rename/insert into a single declarative pass with one
    /// consistent resulting column order.
    ///
    /// Rows are rebuilt to the new schema: kept and renamed columns pull
    /// their values across, inserted columns and cells missing from
    /// jagged rows fill `Nil`.
    pub fn reassign_columns(&mut self, spec: &[ColumnSpec]) -> Result<()> {
        let mut sources: Vec<Option<usize>> = Vec::with_capacity(spec.len());
        let mut names: Vec<String> = Vec::with_capacity(spec.len());
        for item in spec {
            match item {
                ColumnSpec::Keep(name) => {
                    let pos = self.headers().position_of(name)?;
                    sources.push(Some(pos));
                    names.push(self.headers().name_at(pos)?.to_string());
                }
                ColumnSpec::Rename { from, to } => {
                    sources.push(Some(self.headers().position_of(from)?));
                    names.push(to.clone());
                }
                ColumnSpec::Insert(name) => {
                    sources.push(None);
                    names.push(name.clone());
                }
            }
        }
        let headers = Headers::build(names)?;
        for row in self.rows_vec_mut() {
            let rebuilt: Vec<Cell> = sources
                .iter()
                .map(|source| match source {
                    Some(pos) => row.values().get(*pos).cloned().unwrap_or(Cell::Nil),
                    None => Cell::Nil,
                })
                .collect();
            *row.values_mut() = rebuilt;
        }
        self.set_headers(headers);
        Ok(())
    }

    /// Lazy projection of one column across all rows. Positions past the
    /// end of a jagged row yield `Nil`.
    pub fn column(&self, id: impl Into<ColumnId>) -> Result<impl Iterator<Item = &Cell>> {
        let pos = id.into().resolve(self.headers())?;
        Ok(self
            .rows()
            .iter()
            .map(move |row| row.values().get(pos).unwrap_or(&NIL)))
    }

    /// Owned copy of one column's values.
    pub fn column_values(&self, id: impl Into<ColumnId>) -> Result<Vec<Cell>> {
        Ok(self.column(id)?.cloned().collect())
    }

    /// Owned copies of several columns' values.
    pub fn columns<I, C>(&self, ids: I) -> Result<Vec<Vec<Cell>>>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnId>,
    {
        ids.into_iter().map(|id| self.column_values(id)).collect()
    }

    /// Assign a full column of values, appending the column if the name
    /// is new.
    ///
    /// The assignment must preserve the row count: a value sequence of
    /// any other length fails eagerly, before any cell is written, as
    /// does a jagged row too short to hold the target position.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.num_rows() {
            return Err(TableError::LengthMismatch {
                expected: self.num_rows(),
                actual: values.len(),
            });
        }
        if !self.headers().contains(name) {
            self.append_columns([name])?;
        }
        let pos = self.headers().position_of(name)?;
        let expected = self.headers().len();
        for row in self.rows() {
            if pos >= row.len() {
                return Err(TableError::LengthMismatch {
                    expected,
                    actual: row.len(),
                });
            }
        }
        for (row, value) in self.rows_vec_mut().iter_mut().zip(values) {
            row.values_mut()[pos] = value;
        }
        Ok(())
    }

    /// Insert a new column with values at an anchored position; same
    /// length and jaggedness rules as [`Table::set_column`].
    pub fn insert_column(
        &mut self,
        anchor: impl Into<ColumnId>,
        name: &str,
        values: Vec<Cell>,
    ) -> Result<()> {
        if values.len() != self.num_rows() {
            return Err(TableError::LengthMismatch {
                expected: self.num_rows(),
                actual: values.len(),
            });
        }
        let pos = match anchor.into() {
            ColumnId::Name(existing) => self.headers().position_of(&existing)?,
            ColumnId::Index(index) => resolve_signed(index, self.headers().len() + 1)?,
        };
        let expected = self.headers().len();
        for row in self.rows() {
            if pos > row.len() {
                return Err(TableError::LengthMismatch {
                    expected,
                    actual: row.len(),
                });
            }
        }
        self.headers_mut().insert_at(pos, name)?;
        for (row, value) in self.rows_vec_mut().iter_mut().zip(values) {
            row.values_mut().insert(pos, value);
        }
        Ok(())
    }
}
