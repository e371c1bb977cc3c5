//! Declarative command pipelines.
//!
//! A pipeline is an ordered list of data-described steps replayed against
//! a table: built-in operations are tagged variants, and domain-specific
//! steps dispatch by name into a [`CommandRegistry`] of closures built
//! once at initialization. Steps run in declaration order with no
//! reordering; the first failure aborts the remainder and propagates the
//! original error wrapped with the failing step's name and index.

use indexmap::IndexMap;
use thiserror::Error;

use rowset_model::TableError;

use crate::select::{KeySelector, SortKey};
use crate::table::Table;

/// One declarative pipeline step.
///
/// Serializes with an `op` tag, so multi-step domain transformations can
/// be described as data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TableCommand {
    Sort {
        keys: Vec<String>,
        #[serde(default)]
        reverse: Vec<bool>,
    },
    Reverse,
    FilterByUnique {
        keys: Vec<String>,
    },
    AppendColumns {
        names: Vec<String>,
    },
    DeleteColumns {
        names: Vec<String>,
    },
    RenameColumns {
        renames: Vec<(String, String)>,
    },
    ShortenTo {
        rows: usize,
    },
    /// Dispatch a registered domain-specific step by name.
    Call {
        name: String,
    },
}

impl TableCommand {
    /// The step name recorded in run logs and errors.
    pub fn name(&self) -> &str {
        match self {
            TableCommand::Sort { .. } => "sort",
            TableCommand::Reverse => "reverse",
            TableCommand::FilterByUnique { .. } => "filter_by_unique",
            TableCommand::AppendColumns { .. } => "append_columns",
            TableCommand::DeleteColumns { .. } => "delete_columns",
            TableCommand::RenameColumns { .. } => "rename_columns",
            TableCommand::ShortenTo { .. } => "shorten_to",
            TableCommand::Call { name } => name,
        }
    }
}

type CommandFn = Box<dyn Fn(&mut Table) -> rowset_model::Result<()>>;

/// Named domain-specific steps, registered once and dispatched by
/// [`TableCommand::Call`].
#[derive(Default)]
pub struct CommandRegistry {
    ops: IndexMap<String, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step under a name; a later registration under the same
    /// name replaces the earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, op: F)
    where
        F: Fn(&mut Table) -> rowset_model::Result<()> + 'static,
    {
        self.ops.insert(name.into(), Box::new(op));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered step names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    fn get(&self, name: &str) -> Option<&CommandFn> {
        self.ops.get(name)
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("ops", &self.ops.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Pipeline failures carry the failing step for observability; the
/// underlying table error is preserved as the source.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown command: '{name}'")]
    UnknownCommand { name: String },

    #[error("step {index} ('{step}') failed: {source}")]
    Step {
        index: usize,
        step: String,
        #[source]
        source: TableError,
    },
}

/// Record of a completed pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRun {
    /// Step names in execution order.
    pub executed: Vec<String>,
}

/// Execute commands in declaration order against `table`, fail-fast.
pub fn execute_commands(
    table: &mut Table,
    commands: &[TableCommand],
    registry: &CommandRegistry,
) -> Result<PipelineRun, PipelineError> {
    let mut run = PipelineRun::default();
    for (index, command) in commands.iter().enumerate() {
        let step = command.name().to_string();
        tracing::debug!(step = %step, index, "executing pipeline step");
        apply(table, command, registry).map_err(|source| match source {
            StepFailure::Table(source) => PipelineError::Step {
                index,
                step: step.clone(),
                source,
            },
            StepFailure::Unknown(name) => PipelineError::UnknownCommand { name },
        })?;
        run.executed.push(step);
    }
    Ok(run)
}

enum StepFailure {
    Table(TableError),
    Unknown(String),
}

impl From<TableError> for StepFailure {
    fn from(err: TableError) -> Self {
        StepFailure::Table(err)
    }
}

fn apply(
    table: &mut Table,
    command: &TableCommand,
    registry: &CommandRegistry,
) -> Result<(), StepFailure> {
    match command {
        TableCommand::Sort { keys, reverse } => {
            let keys: Vec<SortKey> = keys.iter().map(|name| SortKey::from(name.as_str())).collect();
            table.sort(&keys, reverse)?;
        }
        TableCommand::Reverse => table.reverse(),
        TableCommand::FilterByUnique { keys } => {
            let selector = KeySelector::columns(keys.iter().map(String::as_str));
            table.filter_by_unique(&selector)?;
        }
        TableCommand::AppendColumns { names } => {
            table.append_columns(names.iter().map(String::as_str))?;
        }
        TableCommand::DeleteColumns { names } => {
            table.delete_columns(names)?;
        }
        TableCommand::RenameColumns { renames } => {
            let pairs: Vec<(&str, &str)> = renames
                .iter()
                .map(|(from, to)| (from.as_str(), to.as_str()))
                .collect();
            table.rename_columns(&pairs)?;
        }
        TableCommand::ShortenTo { rows } => table.shorten_to(*rows),
        TableCommand::Call { name } => match registry.get(name) {
            Some(op) => op(table)?,
            None => return Err(StepFailure::Unknown(name.clone())),
        },
    }
    Ok(())
}

impl Table {
    /// Convenience wrapper for [`execute_commands`].
    pub fn execute_commands(
        &mut self,
        commands: &[TableCommand],
        registry: &CommandRegistry,
    ) -> Result<PipelineRun, PipelineError> {
        execute_commands(self, commands, registry)
    }
}
