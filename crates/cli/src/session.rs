//! REPL commands and the session state they act on.

use crate::render::OutputFormat;
use anyhow::{anyhow, bail, Context, Result};
use sift_sheet::{
    export, filter, sort, summarize, validate, LoadOptions, SortDirection, StatisticsReport,
    Table, TableStore, ValidationReport,
};
use std::path::PathBuf;
use tracing::debug;

/// Rows shown by `show` when no count is given
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Display settings taken from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_rows: usize,
    pub format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_rows: DEFAULT_MAX_ROWS,
            format: OutputFormat::Table,
        }
    }
}

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Show(Option<usize>),
    Columns,
    Filter { column: String, value: String },
    Clear,
    Sort {
        column: String,
        direction: Option<SortDirection>,
    },
    Validate,
    Stats,
    Export(PathBuf),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. A leading `:` is accepted and ignored.
    ///
    /// Arguments are split on whitespace; double quotes group words, so
    /// `filter "First Name" Ana` and `filter City ""` both work.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line);
        let mut args = split_args(line)?.into_iter();
        let Some(name) = args.next() else {
            bail!("Empty command");
        };
        let rest: Vec<String> = args.collect();

        let command = match name.to_lowercase().as_str() {
            "load" | "open" => Command::Load(PathBuf::from(single_arg(&name, rest)?)),
            "show" => match rest.as_slice() {
                [] => Command::Show(None),
                [n] => Command::Show(Some(
                    n.parse()
                        .with_context(|| format!("Invalid row count: '{n}'"))?,
                )),
                _ => bail!("Usage: show [rows]"),
            },
            "columns" | "cols" => Command::Columns,
            "filter" => {
                let mut rest = rest.into_iter();
                let column = rest
                    .next()
                    .ok_or_else(|| anyhow!("Usage: filter <column> <value>"))?;
                let value = rest.collect::<Vec<_>>().join(" ");
                Command::Filter { column, value }
            }
            "clear" | "reset" => Command::Clear,
            "sort" => match rest.as_slice() {
                [column] => Command::Sort {
                    column: column.clone(),
                    direction: None,
                },
                [column, direction] => Command::Sort {
                    column: column.clone(),
                    direction: Some(direction.parse().map_err(|e: String| anyhow!(e))?),
                },
                _ => bail!("Usage: sort <column> [asc|desc]"),
            },
            "validate" => Command::Validate,
            "stats" | "statistics" => Command::Stats,
            "export" | "save" => Command::Export(PathBuf::from(single_arg(&name, rest)?)),
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("Unknown command: {other}. Type 'help' for a list of commands"),
        };
        Ok(command)
    }
}

fn single_arg(command: &str, args: Vec<String>) -> Result<String> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg),
        _ => bail!("Usage: {command} <path>"),
    }
}

/// Split a line on whitespace, keeping double-quoted runs together
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        bail!("Unterminated quote");
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

/// The last report produced in this session
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Validation(ValidationReport),
    Statistics(StatisticsReport),
}

/// What the presentation layer should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Loaded {
        name: String,
        rows: usize,
        columns: usize,
    },
    /// Render the current view, up to this many rows
    Show(usize),
    Columns,
    Filtered {
        rows: usize,
        total: usize,
    },
    Cleared,
    Sorted {
        column: String,
        direction: SortDirection,
    },
    /// A report was computed and stored as the last report
    Report,
    Exported {
        path: PathBuf,
        rows: usize,
    },
    Help,
    Quit,
}

/// Session state: the table store, the sort toggle and the last report.
#[derive(Debug, Default)]
pub struct Session {
    store: TableStore,
    load_options: LoadOptions,
    config: SessionConfig,
    sort_state: Option<(String, SortDirection)>,
    last_report: Option<Report>,
}

impl Session {
    pub fn new(load_options: LoadOptions, config: SessionConfig) -> Self {
        Session {
            store: TableStore::new(),
            load_options,
            config,
            sort_state: None,
            last_report: None,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn load_options(&self) -> &LoadOptions {
        &self.load_options
    }

    pub fn current_view(&self) -> Option<&Table> {
        self.store.current_view()
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Take over a table loaded in the background
    pub fn install(&mut self, table: Table) -> Outcome {
        self.sort_state = None;
        self.last_report = None;
        let table = self.store.install(table);
        Outcome::Loaded {
            name: table.name().to_string(),
            rows: table.row_count(),
            columns: table.col_count(),
        }
    }

    fn view(&self) -> Result<&Table> {
        self.store
            .current_view()
            .ok_or_else(|| anyhow!("No data loaded. Use 'load <path>' first"))
    }

    /// The loaded table, ignoring any filter
    fn base(&self) -> Result<&Table> {
        self.store
            .base()
            .ok_or_else(|| anyhow!("No data loaded. Use 'load <path>' first"))
    }

    /// Direction for a sort request. Without an explicit direction the same
    /// column toggles and a new column starts ascending.
    fn sort_direction(&self, column: &str, requested: Option<SortDirection>) -> SortDirection {
        match (requested, &self.sort_state) {
            (Some(direction), _) => direction,
            (None, Some((last, direction))) if last == column => direction.toggled(),
            (None, _) => SortDirection::Ascending,
        }
    }

    /// Run a command against the session.
    ///
    /// A failed command leaves the session as it was.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!("Executing {:?}", command);
        match command {
            Command::Load(path) => {
                let table = Table::load(&path, &self.load_options)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                Ok(self.install(table))
            }
            Command::Show(rows) => {
                self.view()?;
                Ok(Outcome::Show(rows.unwrap_or(self.config.max_rows)))
            }
            Command::Columns => {
                self.view()?;
                Ok(Outcome::Columns)
            }
            Command::Filter { column, value } => {
                let view = filter(self.view()?, &column, &value)?;
                let rows = view.row_count();
                self.store.set_filtered_view(view);
                let total = self.store.base().map_or(0, Table::row_count);
                Ok(Outcome::Filtered { rows, total })
            }
            Command::Clear => {
                self.view()?;
                self.store.clear_filtered_view();
                self.sort_state = None;
                Ok(Outcome::Cleared)
            }
            Command::Sort { column, direction } => {
                let direction = self.sort_direction(&column, direction);
                let view = sort(self.view()?, &column, direction)?;
                // Without a filter the sorted rows become the table itself
                if self.store.has_filtered_view() {
                    self.store.set_filtered_view(view);
                } else {
                    self.store.replace_base(view);
                }
                self.sort_state = Some((column.clone(), direction));
                Ok(Outcome::Sorted { column, direction })
            }
            Command::Validate => {
                let report = validate(self.base()?);
                self.last_report = Some(Report::Validation(report));
                Ok(Outcome::Report)
            }
            Command::Stats => {
                let report = summarize(self.base()?);
                self.last_report = Some(Report::Statistics(report));
                Ok(Outcome::Report)
            }
            Command::Export(path) => {
                let view = self
                    .store
                    .current_view()
                    .ok_or_else(|| anyhow!("No data to export"))?;
                let rows = export(view, &path)
                    .with_context(|| format!("Failed to export to {}", path.display()))?;
                Ok(Outcome::Exported { path, rows })
            }
            Command::Help => Ok(Outcome::Help),
            Command::Quit => Ok(Outcome::Quit),
        }
    }
}
