pub mod columns;
pub mod grouping;
pub mod join;
pub mod pipeline;
pub mod select;
pub mod table;
pub mod transform;

pub use columns::ColumnSpec;
pub use grouping::{Contiguous, GroupTree, RowRun};
pub use join::JoinKey;
pub use pipeline::{
    CommandRegistry, PipelineError, PipelineRun, TableCommand, execute_commands,
};
pub use select::{ColumnId, GroupKey, KeySelector, SortKey};
pub use table::{Preview, Table};

// The model types every caller needs alongside the container.
pub use rowset_model::{Cell, Headers, Record, Result, Row, RowMut, RowRef, TableError};
