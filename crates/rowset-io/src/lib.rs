pub mod csv;
pub mod json;
pub mod snapshot;

pub use csv::{CsvOptions, read_csv, read_csv_from, write_csv, write_csv_to};
pub use json::{JsonOptions, from_json_str, read_json, to_json_string, write_json};
pub use snapshot::{
    SnapshotError, SnapshotReader, SnapshotWriter, read_snapshot, write_snapshot,
};
