//! CSV read/write.
//!
//! Import is text-first: every cell arrives as [`Cell::Text`] (the empty
//! string as [`Cell::Nil`]) and numeric/date conversion is left to the
//! caller. The default encoding is UTF-8 — explicit, never
//! platform-dependent. Jagged source rows are preserved as jagged table
//! rows, not padded.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Terminator, WriterBuilder};

use rowset_core::Table;
use rowset_model::Cell;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// CSV dialect and read-limit options.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter; comma by default.
    pub delimiter: u8,
    /// Record terminator; `\n` by default.
    pub terminator: Terminator,
    /// Emit a UTF-8 byte-order mark before the header row (the
    /// "utf-8-sig" convention some spreadsheet consumers expect).
    pub write_bom: bool,
    /// Read at most this many data rows.
    pub nrows: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::Any(b'\n'),
            write_bom: false,
            nrows: None,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    pub fn with_nrows(mut self, nrows: usize) -> Self {
        self.nrows = Some(nrows);
        self
    }
}

/// Write a table to a CSV file.
pub fn write_csv(table: &Table, path: &Path, options: &CsvOptions) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("create csv: {}", path.display()))?;
    write_csv_to(table, file, options).with_context(|| format!("write csv: {}", path.display()))
}

/// Write a table to any writer: header row first, then data rows as text.
pub fn write_csv_to<W: Write>(table: &Table, mut writer: W, options: &CsvOptions) -> Result<()> {
    if options.write_bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut out = WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(options.terminator)
        .flexible(true)
        .from_writer(writer);
    out.write_record(table.header_names())?;
    for row in table.values() {
        out.write_record(row.iter().map(Cell::to_string))?;
    }
    out.flush()?;
    tracing::debug!(rows = table.num_rows(), cols = table.num_cols(), "wrote csv");
    Ok(())
}

/// Read a table from a CSV file.
pub fn read_csv(path: &Path, options: &CsvOptions) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    read_csv_from(file, options).with_context(|| format!("parse csv: {}", path.display()))
}

/// Read a table from any reader. The first record supplies the column
/// names (a UTF-8 BOM on the first cell is stripped); every following
/// record becomes a row of text cells.
pub fn read_csv_from<R: Read>(reader: R, options: &CsvOptions) -> Result<Table> {
    let mut input = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .terminator(options.terminator)
        .from_reader(reader);

    let mut records = input.records();
    let Some(header) = records.next() else {
        return Ok(Table::new());
    };
    let header = header.context("read csv header")?;
    let names: Vec<String> = header
        .iter()
        .map(|name| name.trim_matches('\u{feff}').to_string())
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in records {
        if options.nrows.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
        let record = record.context("read csv record")?;
        rows.push(record.iter().map(text_cell).collect());
    }

    let table = Table::from_rows(names, rows)?;
    tracing::debug!(rows = table.num_rows(), cols = table.num_cols(), "read csv");
    Ok(table)
}

fn text_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        Cell::Nil
    } else {
        Cell::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_reads_as_empty_table() {
        let table = read_csv_from(&b""[..], &CsvOptions::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn bom_is_stripped_from_the_first_header() {
        let data = "\u{feff}col_a,col_b\n1,2\n";
        let table = read_csv_from(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.header_names(), ["col_a", "col_b"]);
    }

    #[test]
    fn empty_cells_read_as_nil() {
        let data = "col_a,col_b\nx,\n";
        let table = read_csv_from(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.get(0).unwrap().get("col_b").unwrap(), &Cell::Nil);
    }
}
