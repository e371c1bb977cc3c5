//! Grouping maps: unique, single-row, multi-row, nested, contiguous.

use rowset_core::{Cell, GroupKey, KeySelector, Table};

fn pairs(rows: &[(&str, &str)]) -> Table {
    let mut matrix = vec![vec![Cell::from("col_a"), Cell::from("col_b")]];
    matrix.extend(
        rows.iter()
            .map(|(a, b)| vec![Cell::from(*a), Cell::from(*b)]),
    );
    Table::from_matrix(matrix).unwrap()
}

fn key(cells: &[&str]) -> GroupKey {
    GroupKey::new(cells.iter().map(|&c| Cell::from(c)).collect())
}

#[test]
fn unique_preserves_first_seen_order() {
    let table = pairs(&[("c", "x"), ("a", "x"), ("c", "y"), ("b", "x")]);
    let uniques = table.unique(&KeySelector::column("col_a")).unwrap();
    let order: Vec<String> = uniques
        .iter()
        .map(|k| k.cells()[0].to_string())
        .collect();
    assert_eq!(order, ["c", "a", "b"]);
}

#[test]
fn map_rows_is_last_write_wins() {
    let table = pairs(&[("a", "first"), ("b", "x"), ("a", "last")]);
    let map = table.map_rows(&KeySelector::column("col_a")).unwrap();
    assert_eq!(map.len(), 2);
    // the repeated key "a" points at its latest row
    assert_eq!(map[&key(&["a"])], 2);
    // first-seen key order is untouched by the overwrite
    let order: Vec<usize> = map.values().copied().collect();
    assert_eq!(order, [2, 1]);
}

#[test]
fn map_rows_append_groups_by_value() {
    let table = pairs(&[("a", "b"), ("a", "b"), ("c", "d")]);
    let map = table
        .map_rows_append(&KeySelector::columns(["col_a", "col_b"]))
        .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&key(&["a", "b"])].len(), 2);
    assert_eq!(map[&key(&["c", "d"])].len(), 1);
    let first_key = map.keys().next().unwrap();
    assert_eq!(first_key, &key(&["a", "b"]));
}

#[test]
fn contiguous_matches_map_when_input_is_adjacent() {
    let table = pairs(&[("a", "b"), ("a", "b"), ("c", "d")]);
    let runs: Vec<_> = table
        .contiguous(&KeySelector::columns(["col_a", "col_b"]))
        .unwrap()
        .collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].rows, 0..2);
    assert_eq!(runs[1].rows, 2..3);
}

#[test]
fn contiguous_splits_on_adjacency_where_map_groups_by_value() {
    let table = pairs(&[("a", "b"), ("c", "d"), ("a", "b")]);
    let selector = KeySelector::columns(["col_a", "col_b"]);

    let runs: Vec<_> = table.contiguous(&selector).unwrap().collect();
    assert_eq!(runs.len(), 3); // adjacency-only

    let map = table.map_rows_append(&selector).unwrap();
    assert_eq!(map.len(), 2); // value-based
    assert_eq!(map[&key(&["a", "b"])], vec![0, 2]);
}

#[test]
fn contiguous_is_restartable_by_reinvoking() {
    let table = pairs(&[("a", "x"), ("a", "y"), ("b", "z")]);
    let selector = KeySelector::column("col_a");
    let first: Vec<_> = table.contiguous(&selector).unwrap().collect();
    let second: Vec<_> = table.contiguous(&selector).unwrap().collect();
    assert_eq!(first, second);
}

#[test]
fn nested_grouping_partitions_hierarchically() {
    let table = pairs(&[
        ("a", "b"),
        ("a", "b"),
        ("a", "c"),
        ("d", "b"),
        ("d", "e"),
    ]);
    let tree = table
        .map_rows_nested(&KeySelector::columns(["col_a", "col_b"]))
        .unwrap();

    let branches = tree.branches().unwrap();
    assert_eq!(branches.len(), 2); // "a" and "d"

    let under_a = tree.get(&Cell::from("a")).unwrap();
    assert_eq!(under_a.branches().unwrap().len(), 2); // "b" and "c"
    assert_eq!(
        under_a.get(&Cell::from("b")).unwrap().rows().unwrap(),
        [0, 1]
    );
    assert_eq!(tree.row_count(), 5);
}

#[test]
fn groupby_is_an_alias_for_nested() {
    let table = pairs(&[("a", "b"), ("c", "d")]);
    let selector = KeySelector::columns(["col_a", "col_b"]);
    assert_eq!(
        table.groupby(&selector).unwrap(),
        table.map_rows_nested(&selector).unwrap()
    );
}

#[test]
fn derived_key_functions_drive_grouping() {
    let table = Table::from_matrix(vec![
        vec!["date".into(), "v".into()],
        vec!["2000-01-15".into(), 1.into()],
        vec!["2000-01-20".into(), 2.into()],
        vec!["2001-03-05".into(), 3.into()],
    ])
    .unwrap();
    // derive (year, month) from the date text
    let selector = KeySelector::derived(|row| {
        let date = row.get("date").unwrap().to_string();
        vec![
            Cell::Text(date[0..4].to_string()),
            Cell::Text(date[5..7].to_string()),
        ]
    });
    let map = table.map_rows_append(&selector).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&key(&["2000", "01"])].len(), 2);

    let tree = table.map_rows_nested(&selector).unwrap();
    let year_2000 = tree.get(&Cell::from("2000")).unwrap();
    assert_eq!(year_2000.get(&Cell::from("01")).unwrap().rows().unwrap(), [0, 1]);
}

#[test]
fn slice_selectors_group_on_positional_spans() {
    let table = pairs(&[("a", "b"), ("a", "b"), ("a", "z")]);
    let map = table
        .map_rows_append(&KeySelector::slice(0, 2))
        .unwrap();
    assert_eq!(map.len(), 2);
}

#[test]
fn grouped_entry_shapes_do_not_change_grouping() {
    let table = pairs(&[("a", "b"), ("a", "c"), ("d", "e")]);
    let selector = KeySelector::column("col_a");

    let as_values = table.map_rows_append_values(&selector).unwrap();
    assert_eq!(as_values[&key(&["a"])].len(), 2);
    assert_eq!(as_values[&key(&["a"])][1], vec![Cell::from("a"), Cell::from("c")]);

    let as_records = table.map_rows_append_records(&selector).unwrap();
    assert_eq!(
        as_records[&key(&["a"])][0].get("col_b").unwrap(),
        &Cell::from("b")
    );
}

#[test]
fn group_counts_support_countifs_and_sumifs() {
    let mut table = pairs(&[("a", "b"), ("a", "b"), ("c", "d")]);
    table
        .set_column(
            "value",
            vec![Cell::Float(100.0), Cell::Float(50.0), Cell::Float(25.0)],
        )
        .unwrap();
    let map = table
        .map_rows_append(&KeySelector::columns(["col_a", "col_b"]))
        .unwrap();

    let counts: Vec<usize> = map.values().map(Vec::len).collect();
    assert_eq!(counts, [2, 1]);

    let sums: Vec<f64> = map
        .values()
        .map(|indices| {
            table
                .rows_at(indices)
                .unwrap()
                .iter()
                .map(|row| row.get("value").unwrap().as_f64().unwrap())
                .sum()
        })
        .collect();
    assert_eq!(sums, [150.0, 25.0]);
}
