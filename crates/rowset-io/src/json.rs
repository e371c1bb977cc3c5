//! JSON read/write: an array of objects keyed by column display name.
//!
//! Column order is preserved through ordered maps on both sides; reading
//! reconstructs it from the first record's key order. The default
//! encoding is UTF-8 (JSON text is always UTF-8 here — explicit, never
//! platform-dependent).

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use rowset_core::Table;
use rowset_model::{Cell, Record, TableError};

/// JSON read/write options.
#[derive(Debug, Clone, Default)]
pub struct JsonOptions {
    /// Read at most this many records.
    pub nrows: Option<usize>,
    /// Pretty-print output.
    pub pretty: bool,
}

impl JsonOptions {
    pub fn with_nrows(mut self, nrows: usize) -> Self {
        self.nrows = Some(nrows);
        self
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// The scalar cell forms admitted by the JSON format. Nested arrays and
/// objects inside a cell are rejected loudly at parse time.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum JsonScalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&Cell> for JsonScalar {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Nil => JsonScalar::Null,
            Cell::Bool(b) => JsonScalar::Bool(*b),
            Cell::Int(v) => JsonScalar::Int(*v),
            Cell::Float(v) => JsonScalar::Float(*v),
            Cell::Text(s) => JsonScalar::Text(s.clone()),
        }
    }
}

impl From<JsonScalar> for Cell {
    fn from(scalar: JsonScalar) -> Self {
        match scalar {
            JsonScalar::Null => Cell::Nil,
            JsonScalar::Bool(b) => Cell::Bool(b),
            JsonScalar::Int(v) => Cell::Int(v),
            JsonScalar::Float(v) => Cell::Float(v),
            JsonScalar::Text(s) => Cell::Text(s),
        }
    }
}

fn to_json_records(table: &Table) -> Vec<IndexMap<&str, JsonScalar>> {
    let names = table.header_names();
    table
        .values()
        .map(|row| {
            names
                .iter()
                .zip(row)
                .map(|(name, cell)| (name.as_str(), JsonScalar::from(cell)))
                .collect()
        })
        .collect()
}

/// Render a table as in-memory JSON text.
pub fn to_json_string(table: &Table, options: &JsonOptions) -> Result<String> {
    let records = to_json_records(table);
    let text = if options.pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    }
    .context("render json")?;
    Ok(text)
}

/// Write a table to a JSON file.
pub fn write_json(table: &Table, path: &Path, options: &JsonOptions) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create json: {}", path.display()))?;
    let writer = BufWriter::new(file);
    let records = to_json_records(table);
    if options.pretty {
        serde_json::to_writer_pretty(writer, &records)
    } else {
        serde_json::to_writer(writer, &records)
    }
    .with_context(|| format!("write json: {}", path.display()))?;
    tracing::debug!(rows = table.num_rows(), cols = table.num_cols(), "wrote json");
    Ok(())
}

/// Parse a table from JSON text.
///
/// The input must be an array of objects; a top-level array of scalars is
/// the ambiguous one-dimensional case and fails with
/// [`TableError::AmbiguousShape`].
pub fn from_json_str(text: &str, options: &JsonOptions) -> Result<Table> {
    let records = match serde_json::from_str::<Vec<IndexMap<String, JsonScalar>>>(text) {
        Ok(records) => records,
        Err(err) => {
            if serde_json::from_str::<Vec<JsonScalar>>(text).is_ok() {
                return Err(TableError::AmbiguousShape.into());
            }
            return Err(err).context("parse json records");
        }
    };
    let limit = options.nrows.unwrap_or(records.len());
    let records: Vec<Record> = records
        .into_iter()
        .take(limit)
        .map(|entry| {
            entry
                .into_iter()
                .map(|(name, scalar)| (name, Cell::from(scalar)))
                .collect()
        })
        .collect();
    Ok(Table::from_records(records)?)
}

/// Read a table from a JSON file.
pub fn read_json(path: &Path, options: &JsonOptions) -> Result<Table> {
    let mut text = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut text))
        .with_context(|| format!("read json: {}", path.display()))?;
    let table =
        from_json_str(&text, options).with_context(|| format!("parse json: {}", path.display()))?;
    tracing::debug!(rows = table.num_rows(), cols = table.num_cols(), "read json");
    Ok(table)
}
