use thiserror::Error;

/// Errors raised by table construction and mutation.
///
/// Structural violations are detected eagerly at the point of mutation and
/// raised immediately; they are never deferred to a later read. Row
/// jaggedness is deliberately *not* an error — it is a queryable state.
#[derive(Debug, Error)]
pub enum TableError {
    /// Ambiguous one-dimensional input: a bare sequence could be one row or
    /// one column, and the contract is to fail rather than guess.
    #[error("ambiguous one-dimensional input: supply a matrix of rows, not a bare sequence")]
    AmbiguousShape,

    /// A column name collides with a structural identifier.
    #[error("'{name}' is a reserved column name")]
    Reserved { name: String },

    /// Unknown column name on lookup.
    #[error("unknown column: '{name}'")]
    UnknownColumn { name: String },

    /// Positional index out of range (after negative-index resolution).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// A sequence of values does not match the required length, e.g. a
    /// column assignment that would change the row count, or a name-based
    /// write landing past the end of a jagged row.
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A caller-defined consistency check failed; `rows` holds the 1-based
    /// indices of the offending rows for diagnostics.
    #[error("check '{check}' failed for {count} row(s): {rows:?}", count = rows.len())]
    Validation { check: String, rows: Vec<usize> },
}

pub type Result<T> = std::result::Result<T, TableError>;
