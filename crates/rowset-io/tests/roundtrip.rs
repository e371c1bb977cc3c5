//! Round-trip tests across the three formats.

use rowset_core::{Cell, Table};
use rowset_io::{
    CsvOptions, JsonOptions, from_json_str, read_csv, read_json, read_snapshot, to_json_string,
    write_csv, write_json, write_snapshot,
};

fn typed_table() -> Table {
    Table::from_matrix(vec![
        vec!["name".into(), "count".into(), "ratio".into(), "active".into()],
        vec!["alpha".into(), 1.into(), 0.5.into(), true.into()],
        vec!["beta".into(), 2.into(), 1.25.into(), false.into()],
        vec!["gamma, inc".into(), 3.into(), (-2.75).into(), Cell::Nil],
    ])
    .unwrap()
}

#[test]
fn csv_round_trip_preserves_values_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.csv");
    let options = CsvOptions::default();

    let table = typed_table();
    write_csv(&table, &path, &options).unwrap();
    let back = read_csv(&path, &options).unwrap();

    assert_eq!(back.header_names(), table.header_names());
    assert_eq!(back.num_rows(), table.num_rows());
    // text-first import: every value comes back as its text form
    let row = back.get(0).unwrap();
    assert_eq!(row.get("count").unwrap(), &Cell::from("1"));
    assert_eq!(row.get("ratio").unwrap(), &Cell::from("0.5"));
    assert_eq!(row.get("active").unwrap(), &Cell::from("true"));
    // quoting survives an embedded delimiter
    assert_eq!(
        back.get(2).unwrap().get("name").unwrap(),
        &Cell::from("gamma, inc")
    );
    // Nil writes as the empty string and reads back as Nil
    assert_eq!(back.get(2).unwrap().get("active").unwrap(), &Cell::Nil);
}

#[test]
fn csv_bom_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sig.csv");
    let table = typed_table();
    write_csv(&table, &path, &CsvOptions::default().with_bom(true)).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..3], b"\xef\xbb\xbf");

    let back = read_csv(&path, &CsvOptions::default()).unwrap();
    assert_eq!(back.header_names()[0], "name");
}

#[test]
fn csv_respects_delimiter_and_nrows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.tsv");
    let options = CsvOptions::default().with_delimiter(b'\t');
    write_csv(&typed_table(), &path, &options).unwrap();

    let limited = read_csv(&path, &options.clone().with_nrows(2)).unwrap();
    assert_eq!(limited.num_rows(), 2);
}

#[test]
fn json_round_trip_preserves_column_order_and_types() {
    let table = typed_table();
    let text = to_json_string(&table, &JsonOptions::default()).unwrap();
    let back = from_json_str(&text, &JsonOptions::default()).unwrap();

    assert_eq!(back.header_names(), table.header_names());
    assert_eq!(back.num_rows(), table.num_rows());
    let row = back.get(1).unwrap();
    assert_eq!(row.get("count").unwrap(), &Cell::Int(2));
    assert_eq!(row.get("ratio").unwrap(), &Cell::Float(1.25));
    assert_eq!(row.get("active").unwrap(), &Cell::Bool(false));
    assert_eq!(back.get(2).unwrap().get("active").unwrap(), &Cell::Nil);
}

#[test]
fn json_file_round_trip_with_nrows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    write_json(&typed_table(), &path, &JsonOptions::default().pretty()).unwrap();

    let back = read_json(&path, &JsonOptions::default()).unwrap();
    assert_eq!(back.num_rows(), 3);

    let limited = read_json(&path, &JsonOptions::default().with_nrows(1)).unwrap();
    assert_eq!(limited.num_rows(), 1);
}

#[test]
fn snapshot_round_trip_preserves_exact_cell_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.rwst");
    let table = typed_table();
    write_snapshot(&table, &path).unwrap();
    let back = read_snapshot(&path).unwrap();

    assert_eq!(back.header_names(), table.header_names());
    for (original, restored) in table.values().zip(back.values()) {
        assert_eq!(original, restored);
    }
    // types survive, unlike the CSV text round-trip
    assert_eq!(back.get(0).unwrap().get("count").unwrap(), &Cell::Int(1));
    assert_eq!(
        back.get(0).unwrap().get("ratio").unwrap(),
        &Cell::Float(0.5)
    );
}

#[test]
fn missing_snapshot_reports_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_snapshot(&dir.path().join("absent.rwst")).unwrap_err();
    assert!(matches!(
        err,
        rowset_io::SnapshotError::FileNotFound { .. }
    ));
}

#[test]
fn jagged_tables_survive_csv_and_snapshot() {
    let mut table = typed_table();
    table.row_mut(0).unwrap().values_mut().pop();
    assert!(table.is_jagged());

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("jagged.csv");
    write_csv(&table, &csv_path, &CsvOptions::default()).unwrap();
    let from_csv = read_csv(&csv_path, &CsvOptions::default()).unwrap();
    assert!(from_csv.is_jagged());

    let snap_path = dir.path().join("jagged.rwst");
    write_snapshot(&table, &snap_path).unwrap();
    assert!(read_snapshot(&snap_path).unwrap().is_jagged());
}
