//! The table container: an ordered sequence of rows addressable by
//! position and by column name.
//!
//! Rows are exclusively owned by the container. Iteration hands out views
//! over the stored rows, so mutating a cell during iteration mutates the
//! container — there is no copy-on-write snapshotting. Structural resizing
//! (inserting or deleting rows) while an iteration is in progress is ruled
//! out by the borrow checker rather than by documentation alone.

use std::fmt;

use rowset_model::{Cell, Headers, Record, Result, Row, RowMut, RowRef, TableError, resolve_signed};

pub(crate) static NIL: Cell = Cell::Nil;

/// Diagnostic row window consumed by the `Display` impl.
///
/// Display only — the window never affects data semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// The first `n` rows.
    Leading(usize),
    /// A signed index span, endpoints resolved like row indices.
    Span { start: isize, end: isize },
    /// Explicit row indices, e.g. the offenders from a failed check.
    Rows(Vec<usize>),
}

impl Default for Preview {
    fn default() -> Self {
        Preview::Leading(5)
    }
}

/// An ordered, mutable sequence of rows with named columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Headers,
    rows: Vec<Row>,
    preview: Preview,
}

impl Table {
    /// A zero-row, zero-column table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from a matrix whose first row holds the column names.
    ///
    /// Cell values are adopted: the matrix rows become owned rows of this
    /// table. An empty matrix produces an empty table. A matrix whose
    /// header row is empty but which still carries data rows is the
    /// one-row/one-column ambiguity that survives typing, and is rejected
    /// with [`TableError::AmbiguousShape`].
    pub fn from_matrix(matrix: Vec<Vec<Cell>>) -> Result<Self> {
        let mut iter = matrix.into_iter().peekable();
        let Some(header_row) = iter.next() else {
            return Ok(Self::new());
        };
        if header_row.is_empty() && iter.peek().is_some() {
            return Err(TableError::AmbiguousShape);
        }
        // Header validation happens before any row data is touched.
        let headers = Headers::build(header_row.iter().map(Cell::to_string))?;
        Ok(Self {
            headers,
            rows: iter.map(Row::new).collect(),
            preview: Preview::default(),
        })
    }

    /// Construct from header-less data rows with synthesized default
    /// names (`col_a`, `col_b`, …) wide enough for the widest row.
    pub fn from_data(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            headers: Headers::synthesized(width),
            rows: rows.into_iter().map(Row::new).collect(),
            preview: Preview::default(),
        }
    }

    /// Construct from explicit column names and header-less data rows.
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<Cell>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            headers: Headers::build(names)?,
            rows: rows.into_iter().map(Row::new).collect(),
            preview: Preview::default(),
        })
    }

    /// Construct from uniform attribute-bearing records.
    ///
    /// Column order comes from the first record's key order. Keys missing
    /// from later records back-fill [`Cell::Nil`]; keys *absent from the
    /// first record* are a structural violation and fail eagerly.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Self::new());
        };
        let headers = Headers::build(first.keys().map(str::to_string))?;
        let names: Vec<String> = headers.names().to_vec();
        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            for key in record.keys() {
                if !headers.contains(key) {
                    return Err(TableError::UnknownColumn {
                        name: key.to_string(),
                    });
                }
            }
            let values = names
                .iter()
                .map(|name| record.get(name).cloned().unwrap_or(Cell::Nil))
                .collect();
            rows.push(Row::new(values));
        }
        Ok(Self {
            headers,
            rows,
            preview: Preview::default(),
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Display names in positional order.
    pub fn header_names(&self) -> &[String] {
        self.headers.names()
    }

    /// Number of data rows (the header is not a data row).
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.headers.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Raw row access by signed index.
    pub fn row(&self, index: isize) -> Result<&Row> {
        let pos = resolve_signed(index, self.rows.len())?;
        Ok(&self.rows[pos])
    }

    pub fn row_mut(&mut self, index: isize) -> Result<&mut Row> {
        let pos = resolve_signed(index, self.rows.len())?;
        Ok(&mut self.rows[pos])
    }

    /// Bound row view by signed index.
    pub fn get(&self, index: isize) -> Result<RowRef<'_>> {
        let pos = resolve_signed(index, self.rows.len())?;
        Ok(RowRef::new(&self.headers, &self.rows[pos]))
    }

    pub fn get_mut(&mut self, index: isize) -> Result<RowMut<'_>> {
        let pos = resolve_signed(index, self.rows.len())?;
        Ok(RowMut::new(&self.headers, &mut self.rows[pos]))
    }

    /// Iterate data rows as bound views.
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|row| RowRef::new(&self.headers, row))
    }

    /// Iterate data rows as mutable bound views.
    ///
    /// Cell mutation during iteration is first-class; the views write to
    /// the stored rows. The iterator holds the table borrowed, so rows
    /// cannot be inserted or deleted until it is dropped.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = RowMut<'_>> {
        let Self { headers, rows, .. } = self;
        let headers: &Headers = headers;
        rows.iter_mut().map(move |row| RowMut::new(headers, row))
    }

    /// Bound views for an explicit index list (e.g. a grouping map entry).
    pub fn rows_at(&self, indices: &[usize]) -> Result<Vec<RowRef<'_>>> {
        indices
            .iter()
            .map(|&idx| {
                self.rows
                    .get(idx)
                    .map(|row| RowRef::new(&self.headers, row))
                    .ok_or(TableError::IndexOutOfRange {
                        index: idx as isize,
                        len: self.rows.len(),
                    })
            })
            .collect()
    }

    /// Append data rows from a raw matrix. Values are adopted into new
    /// owned rows; nothing is aliased to the source.
    pub fn append_rows(&mut self, matrix: Vec<Vec<Cell>>) {
        self.rows.extend(matrix.into_iter().map(Row::new));
    }

    /// Insert data rows at a position (`at == num_rows` appends).
    pub fn insert_rows(&mut self, at: usize, matrix: Vec<Vec<Cell>>) -> Result<()> {
        if at > self.rows.len() {
            return Err(TableError::IndexOutOfRange {
                index: at as isize,
                len: self.rows.len(),
            });
        }
        let mut tail = self.rows.split_off(at);
        self.rows.extend(matrix.into_iter().map(Row::new));
        self.rows.append(&mut tail);
        Ok(())
    }

    /// Append another table's data rows. Cell values are copied; row
    /// labels are not carried over.
    pub fn append_table(&mut self, other: &Table) {
        self.rows
            .extend(other.rows.iter().map(|row| Row::new(row.values().to_vec())));
    }

    /// Delete a row range, clamped to the current length (an over-length
    /// range is not an error).
    pub fn delete_rows(&mut self, range: std::ops::Range<usize>) {
        let len = self.rows.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rows.drain(start..end);
    }

    /// Truncate to at most `n` data rows; over-length `n` is a no-op.
    pub fn shorten_to(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Reverse row order in place.
    pub fn reverse(&mut self) {
        self.rows.reverse();
    }

    /// Row-order-inverted copy.
    pub fn reversed(&self) -> Table {
        let mut copy = self.clone();
        copy.reverse();
        copy
    }

    /// Data cells, row by row.
    pub fn values(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Row::values)
    }

    /// The matrix-out boundary: header names as the first row, then data.
    pub fn to_matrix(&self) -> Vec<Vec<Cell>> {
        let header_row: Vec<Cell> = self
            .headers
            .names()
            .iter()
            .map(|name| Cell::Text(name.clone()))
            .collect();
        std::iter::once(header_row)
            .chain(self.rows.iter().map(|row| row.values().to_vec()))
            .collect()
    }

    /// Assign 1-based labels to every row, in current order. Labels are
    /// assigned on demand and are not persisted by the snapshot format.
    pub fn label_rows(&mut self) {
        for (idx, row) in self.rows.iter_mut().enumerate() {
            row.set_label(Some(idx + 1));
        }
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn set_preview(&mut self, preview: Preview) {
        self.preview = preview;
    }

    /// The rows selected by the preview window, with their indices.
    pub fn preview_rows(&self) -> Vec<(usize, RowRef<'_>)> {
        let len = self.rows.len();
        let indices: Vec<usize> = match &self.preview {
            Preview::Leading(n) => (0..len.min(*n)).collect(),
            Preview::Span { start, end } => match resolve_span(*start, *end, len) {
                Some(range) => range.collect(),
                None => Vec::new(),
            },
            Preview::Rows(list) => list.iter().copied().filter(|&idx| idx < len).collect(),
        };
        indices
            .into_iter()
            .map(|idx| (idx, RowRef::new(&self.headers, &self.rows[idx])))
            .collect()
    }

    pub(crate) fn parts(&self) -> (&Headers, &[Row]) {
        (&self.headers, &self.rows)
    }

    pub(crate) fn parts_mut(&mut self) -> (&Headers, &mut Vec<Row>) {
        let Self { headers, rows, .. } = self;
        (headers, rows)
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub(crate) fn rows_vec_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub(crate) fn replace_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    pub(crate) fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }
}

fn resolve_span(start: isize, end: isize, len: usize) -> Option<std::ops::Range<usize>> {
    let lo = resolve_signed(start, len).ok()?;
    let hi = if end >= len as isize {
        len
    } else {
        resolve_signed(end, len).ok()?
    };
    (lo <= hi).then_some(lo..hi)
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table({} rows x {} cols)",
            self.num_rows(),
            self.num_cols()
        )?;
        if self.is_jagged() {
            write!(f, " [jagged]")?;
        }
        for (idx, row) in self.preview_rows() {
            write!(f, "\n  {idx}: [")?;
            for (pos, cell) in row.values().iter().enumerate() {
                if pos > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{cell}")?;
            }
            write!(f, "]")?;
            if row.is_jagged() {
                write!(f, " <- jagged")?;
            }
        }
        Ok(())
    }
}
