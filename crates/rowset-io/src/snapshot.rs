//! The binary snapshot format.
//!
//! Unlike CSV text, a snapshot preserves exact cell types: a float
//! round-trips bit-for-bit. The encoding is a tagged, length-prefixed
//! layout with little-endian integers:
//!
//! ```text
//! magic    b"RWST"
//! version  u16
//! columns  u64 count, then per column: u64 name length + UTF-8 bytes
//! rows     u64 count, then per row:    u64 cell count + tagged cells
//! cell     tag u8: 0 nil | 1 bool (u8) | 2 int (i64) |
//!                  3 float (u64 bit pattern) | 4 text (u64 len + UTF-8)
//! ```
//!
//! Per-row cell counts are stored, so jagged rows persist faithfully.
//! Row labels are not persisted. A failed write fails loud and leaves the
//! destination unspecified; there is no rollback.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use rowset_core::Table;
use rowset_model::{Cell, TableError};

const MAGIC: &[u8; 4] = b"RWST";
const VERSION: u16 = 1;

const TAG_NIL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_TEXT: u8 = 4;

/// Errors that can occur when reading or writing snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with the snapshot magic.
    #[error("not a rowset snapshot: bad magic")]
    BadMagic,

    /// The snapshot was written by an unknown format version.
    #[error("unsupported snapshot version {version}")]
    UnsupportedVersion { version: u16 },

    /// Unknown cell tag in a row record.
    #[error("invalid cell tag {tag} in row {row}")]
    InvalidTag { tag: u8, row: usize },

    /// A name or text payload was not valid UTF-8.
    #[error("invalid utf-8 in {what}")]
    InvalidUtf8 { what: &'static str },

    /// The decoded header names failed table construction.
    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Snapshot writer.
pub struct SnapshotWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Write a table and flush.
    pub fn write_table(mut self, table: &Table) -> Result<()> {
        self.writer.write_all(MAGIC)?;
        self.writer.write_all(&VERSION.to_le_bytes())?;

        let names = table.header_names();
        self.write_len(names.len())?;
        for name in names {
            self.write_bytes(name.as_bytes())?;
        }

        self.write_len(table.num_rows())?;
        for row in table.values() {
            self.write_len(row.len())?;
            for cell in row {
                self.write_cell(cell)?;
            }
        }
        self.writer.flush()?;
        tracing::debug!(
            rows = table.num_rows(),
            cols = table.num_cols(),
            "wrote snapshot"
        );
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        self.writer.write_all(&(len as u64).to_le_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        match cell {
            Cell::Nil => self.writer.write_all(&[TAG_NIL])?,
            Cell::Bool(b) => self.writer.write_all(&[TAG_BOOL, u8::from(*b)])?,
            Cell::Int(v) => {
                self.writer.write_all(&[TAG_INT])?;
                self.writer.write_all(&v.to_le_bytes())?;
            }
            Cell::Float(v) => {
                self.writer.write_all(&[TAG_FLOAT])?;
                self.writer.write_all(&v.to_bits().to_le_bytes())?;
            }
            Cell::Text(s) => {
                self.writer.write_all(&[TAG_TEXT])?;
                self.write_bytes(s.as_bytes())?;
            }
        }
        Ok(())
    }
}

impl SnapshotWriter<File> {
    /// Create a snapshot file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

/// Snapshot reader.
pub struct SnapshotReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read and reconstruct a table.
    pub fn read_table(mut self) -> Result<Table> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = u16::from_le_bytes(self.read_array()?);
        if version != VERSION {
            return Err(SnapshotError::UnsupportedVersion { version });
        }

        let col_count = self.read_len()?;
        let mut names = Vec::with_capacity(col_count);
        for _ in 0..col_count {
            names.push(self.read_string("column name")?);
        }

        let row_count = self.read_len()?;
        let mut rows = Vec::with_capacity(row_count);
        for row_idx in 0..row_count {
            let cell_count = self.read_len()?;
            let mut cells = Vec::with_capacity(cell_count);
            for _ in 0..cell_count {
                cells.push(self.read_cell(row_idx)?);
            }
            rows.push(cells);
        }

        let table = Table::from_rows(names, rows)?;
        tracing::debug!(
            rows = table.num_rows(),
            cols = table.num_cols(),
            "read snapshot"
        );
        Ok(table)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(u64::from_le_bytes(self.read_array()?) as usize)
    }

    fn read_string(&mut self, what: &'static str) -> Result<String> {
        let len = self.read_len()?;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|_| SnapshotError::InvalidUtf8 { what })
    }

    fn read_cell(&mut self, row: usize) -> Result<Cell> {
        let [tag] = self.read_array::<1>()?;
        match tag {
            TAG_NIL => Ok(Cell::Nil),
            TAG_BOOL => {
                let [b] = self.read_array::<1>()?;
                Ok(Cell::Bool(b != 0))
            }
            TAG_INT => Ok(Cell::Int(i64::from_le_bytes(self.read_array()?))),
            TAG_FLOAT => Ok(Cell::Float(f64::from_bits(u64::from_le_bytes(
                self.read_array()?,
            )))),
            TAG_TEXT => Ok(Cell::Text(self.read_string("text cell")?)),
            tag => Err(SnapshotError::InvalidTag { tag, row }),
        }
    }
}

impl SnapshotReader<File> {
    /// Open a snapshot file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SnapshotError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SnapshotError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Write a table to a snapshot file.
pub fn write_snapshot(table: &Table, path: &Path) -> Result<()> {
    SnapshotWriter::create(path)?.write_table(table)
}

/// Read a table from a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Table> {
    SnapshotReader::open(path)?.read_table()
}
