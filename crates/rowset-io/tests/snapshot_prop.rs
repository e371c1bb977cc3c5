//! Property test: the snapshot format reproduces every cell exactly,
//! including arbitrary float bit patterns.

use std::io::Cursor;

use proptest::prelude::*;

use rowset_core::{Cell, Table};
use rowset_io::{SnapshotReader, SnapshotWriter};

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Nil),
        any::<bool>().prop_map(Cell::Bool),
        any::<i64>().prop_map(Cell::Int),
        any::<u64>().prop_map(|bits| Cell::Float(f64::from_bits(bits))),
        "[ -~]{0,16}".prop_map(Cell::Text),
    ]
}

proptest! {
    #[test]
    fn snapshot_round_trip_is_exact(
        cols in 1usize..5,
        rows in prop::collection::vec(prop::collection::vec(cell_strategy(), 0..6), 0..8),
    ) {
        let names: Vec<String> = (0..cols).map(|i| format!("c{i}")).collect();
        let table = Table::from_rows(names, rows).unwrap();

        let mut buffer = Vec::new();
        SnapshotWriter::new(Cursor::new(&mut buffer))
            .write_table(&table)
            .unwrap();
        let back = SnapshotReader::new(Cursor::new(&buffer))
            .read_table()
            .unwrap();

        prop_assert_eq!(back.header_names(), table.header_names());
        prop_assert_eq!(back.num_rows(), table.num_rows());
        for (original, restored) in table.values().zip(back.values()) {
            prop_assert_eq!(original.len(), restored.len());
            for (a, b) in original.iter().zip(restored) {
                // key equality compares floats by bit pattern
                prop_assert!(a.key_eq(b));
            }
        }
    }
}
