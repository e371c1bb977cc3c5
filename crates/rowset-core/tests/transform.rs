//! Sort, filter, jagged detection, and row checks.

use rowset_core::{Cell, KeySelector, SortKey, Table, TableError};

fn sales() -> Table {
    Table::from_matrix(vec![
        vec!["name".into(), "sold".into(), "bought".into()],
        vec!["alice".into(), 2.into(), 0.into()],
        vec!["bob".into(), 2.into(), 5.into()],
        vec!["chris".into(), 7.into(), 1.into()],
        vec!["dana".into(), 2.into(), 3.into()],
        vec!["ed".into(), 1.into(), 9.into()],
    ])
    .unwrap()
}

fn column_text(table: &Table, name: &str) -> Vec<String> {
    table
        .column_values(name)
        .unwrap()
        .iter()
        .map(Cell::to_string)
        .collect()
}

#[test]
fn single_key_sort_orders_rows() {
    let mut table = sales();
    table.sort(&[SortKey::from("sold")], &[]).unwrap();
    assert_eq!(column_text(&table, "sold"), ["1", "2", "2", "2", "7"]);
}

#[test]
fn sort_is_stable_for_tied_keys() {
    let mut table = sales();
    table.sort(&[SortKey::from("sold")], &[]).unwrap();
    // alice, bob, dana all sold 2; original relative order preserved.
    assert_eq!(
        column_text(&table, "name"),
        ["ed", "alice", "bob", "dana", "chris"]
    );
}

#[test]
fn per_key_reverse_flags_invert_independently() {
    let mut table = sales();
    table
        .sort(
            &[SortKey::from("sold"), SortKey::from("bought")],
            &[false, true],
        )
        .unwrap();
    // ascending by sold, descending by bought within ties
    assert_eq!(
        column_text(&table, "name"),
        ["ed", "bob", "dana", "alice", "chris"]
    );

    let mut table = sales();
    table
        .sort(
            &[SortKey::from("sold"), SortKey::from("bought")],
            &[true, false],
        )
        .unwrap();
    assert_eq!(
        column_text(&table, "name"),
        ["chris", "alice", "dana", "bob", "ed"]
    );
}

#[test]
fn sorted_returns_a_copy_and_leaves_the_original() {
    let table = sales();
    let sorted = table.sorted(&[SortKey::from("sold")], &[true]).unwrap();
    assert_eq!(column_text(&sorted, "sold"), ["7", "2", "2", "2", "1"]);
    assert_eq!(column_text(&table, "name")[0], "alice");
}

#[test]
fn derived_sort_keys_run_per_row() {
    let mut table = sales();
    let net = SortKey::derived(|row| {
        let sold = row.get("sold").ok().and_then(Cell::as_i64).unwrap_or(0);
        let bought = row.get("bought").ok().and_then(Cell::as_i64).unwrap_or(0);
        Cell::Int(sold - bought)
    });
    table.sort(&[net], &[]).unwrap();
    assert_eq!(column_text(&table, "name")[0], "ed"); // 1 - 9 = -8
}

#[test]
fn filter_removes_failing_rows_in_place() {
    let mut table = sales();
    table.filter(|row| row.get("sold").unwrap().as_i64().unwrap_or(0) >= 2);
    assert_eq!(table.num_rows(), 4);
    assert!(!column_text(&table, "name").contains(&"ed".to_string()));
}

#[test]
fn filtered_is_idempotent() {
    let table = sales();
    let pred = |row: rowset_core::RowRef<'_>| row.get("sold").unwrap().as_i64().unwrap_or(0) >= 2;
    let once = table.filtered(pred);
    let twice = once.filtered(pred);
    assert_eq!(once.num_rows(), twice.num_rows());
    assert_eq!(
        column_text(&once, "name"),
        column_text(&twice, "name")
    );
}

#[test]
fn filter_by_unique_keeps_first_seen_rows() {
    let mut table = sales();
    table
        .filter_by_unique(&KeySelector::column("sold"))
        .unwrap();
    assert_eq!(column_text(&table, "name"), ["alice", "chris", "ed"]);
}

#[test]
fn jaggedness_is_per_row_and_aggregate() {
    let mut table = sales();
    assert!(!table.is_jagged());

    table.row_mut(2).unwrap().values_mut().pop();
    assert!(table.is_jagged());

    let jagged: Vec<usize> = table.jagged_rows().map(|(idx, _)| idx).collect();
    assert_eq!(jagged, [2]);
    // restartable: a second invocation reproduces the sequence
    let again: Vec<usize> = table.jagged_rows().map(|(idx, _)| idx).collect();
    assert_eq!(again, [2]);
}

#[test]
fn growing_a_row_also_makes_it_jagged() {
    let mut table = sales();
    table
        .row_mut(0)
        .unwrap()
        .values_mut()
        .push(Cell::from("extra"));
    assert!(table.get(0).unwrap().is_jagged());
    assert!(!table.get(1).unwrap().is_jagged());
}

#[test]
fn check_rows_reports_one_based_offender_indices() {
    let table = sales();
    let err = table
        .check_rows("sold_at_least_two", |row| {
            row.get("sold").unwrap().as_i64().unwrap_or(0) >= 2
        })
        .unwrap_err();
    match err {
        TableError::Validation { check, rows } => {
            assert_eq!(check, "sold_at_least_two");
            assert_eq!(rows, [5]); // ed, fifth data row
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
