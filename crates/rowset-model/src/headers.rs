use std::collections::HashMap;

use crate::error::{Result, TableError};

/// Structural identifiers of the table surface; never legal as column names.
const RESERVED: &[&str] = &[
    "headers",
    "values",
    "header_names",
    "is_jagged",
    "is_empty",
    "row_label",
    "num_rows",
    "num_cols",
];

/// The header resolver: maps column names to positional indices.
///
/// Each position carries two strings: the *display name* (the original
/// text, written to CSV headers and JSON keys) and the *lookup key* (the
/// display name sanitized to an identifier). Lookups accept either form.
///
/// Duplicate lookup keys are disambiguated deterministically: the second
/// occurrence gets the suffix `_2`, the third `_3`, and so on, taking the
/// first suffix free against both existing keys and display names. Two
/// input names therefore never silently collide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Headers {
    names: Vec<String>,
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl Headers {
    /// Build a resolver from column names.
    ///
    /// Fails with [`TableError::Reserved`] if any name sanitizes to a
    /// reserved structural identifier.
    pub fn build<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut headers = Headers::default();
        for raw in names {
            headers.push_name(raw.into())?;
        }
        headers.reindex();
        Ok(headers)
    }

    /// Default names for header-less sources: `col_a`, `col_b`, …,
    /// `col_z`, `col_aa`, ….
    pub fn synthesized(count: usize) -> Self {
        let names = (0..count).map(|i| format!("col_{}", alpha_suffix(i)));
        // Synthesized names are identifiers and unique; build cannot fail.
        Self::build(names).expect("synthesized names are never reserved")
    }

    /// The fixed set of reserved structural names.
    pub fn reserved_names() -> &'static [&'static str] {
        RESERVED
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display names in positional order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sanitized lookup keys in positional order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position_of(name).is_ok()
    }

    /// Resolve a column name (display name or lookup key) to its position.
    pub fn position_of(&self, name: &str) -> Result<usize> {
        if let Some(&pos) = self.index.get(name) {
            return Ok(pos);
        }
        // A display name like "Col a" is also addressable as "Col_a".
        if let Some(&pos) = self.index.get(sanitize(name).as_str()) {
            return Ok(pos);
        }
        Err(TableError::UnknownColumn {
            name: name.to_string(),
        })
    }

    /// Display name at a position.
    pub fn name_at(&self, position: usize) -> Result<&str> {
        self.names
            .get(position)
            .map(String::as_str)
            .ok_or(TableError::IndexOutOfRange {
                index: position as isize,
                len: self.names.len(),
            })
    }

    /// Rename columns. Positions of unaffected columns are preserved; the
    /// whole resolver is rebuilt so sanitization and duplicate handling
    /// re-apply to the new names.
    pub fn rename(&mut self, renames: &[(&str, &str)]) -> Result<()> {
        let mut names = self.names.clone();
        for (old, new) in renames {
            let pos = self.position_of(old)?;
            names[pos] = (*new).to_string();
        }
        *self = Self::build(names)?;
        Ok(())
    }

    /// Insert a column name at a position (`position == len` appends).
    pub fn insert_at(&mut self, position: usize, name: &str) -> Result<()> {
        if position > self.names.len() {
            return Err(TableError::IndexOutOfRange {
                index: position as isize,
                len: self.names.len(),
            });
        }
        let mut names = self.names.clone();
        names.insert(position, name.to_string());
        *self = Self::build(names)?;
        Ok(())
    }

    /// Delete a column by name, returning its former position.
    pub fn delete(&mut self, name: &str) -> Result<usize> {
        let pos = self.position_of(name)?;
        let mut names = self.names.clone();
        names.remove(pos);
        *self = Self::build(names)?;
        Ok(pos)
    }

    fn push_name(&mut self, raw: String) -> Result<()> {
        let display = raw.trim().trim_matches('\u{feff}').to_string();
        let base = sanitize(&display);
        if RESERVED.contains(&base.as_str()) {
            return Err(TableError::Reserved { name: display });
        }
        let key = self.disambiguate(base);
        self.names.push(display);
        self.keys.push(key);
        Ok(())
    }

    fn disambiguate(&self, base: String) -> String {
        let taken = |candidate: &str| {
            self.keys.iter().any(|k| k == candidate) || self.names.iter().any(|n| n == candidate)
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}_{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, key) in self.keys.iter().enumerate() {
            self.index.insert(key.clone(), pos);
        }
        // Display names resolve too, but a canonical key always wins: the
        // first occurrence of a duplicated name stays addressable by it.
        for (pos, name) in self.names.iter().enumerate() {
            self.index.entry(name.clone()).or_insert(pos);
        }
    }
}

/// Replace characters invalid for symbolic access, keeping the original
/// retrievable for display contexts.
fn sanitize(name: &str) -> String {
    let mut key: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if key.is_empty() {
        key.push_str("col");
    }
    if key.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

/// 0 -> "a", 25 -> "z", 26 -> "aa", ...
fn alpha_suffix(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + (index % 26) as u8);
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    out.reverse();
    String::from_utf8(out).expect("ascii letters")
}
