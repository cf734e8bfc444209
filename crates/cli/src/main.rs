//! # sift-cli
//!
//! Terminal front end for the sift table engine.

mod loader;
mod render;
mod session;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use render::OutputFormat;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use session::{Command, Outcome, Report, Session, SessionConfig, DEFAULT_MAX_ROWS};
use sift_sheet::{export, filter, sort, summarize, validate, LoadOptions, SortDirection, Table};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// sift - inspect, filter and clean up spreadsheet data
#[derive(Parser)]
#[command(name = "sift")]
#[command(author, version, about = "Inspect, filter and clean up spreadsheet data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File to load when the REPL starts
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Worksheet to read from workbooks (default: the first)
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Field delimiter for delimited files (a single character, or "tab")
    #[arg(short = 'd', long, global = true, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// Maximum rows to display
    #[arg(long = "max-rows", global = true, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Output format (table, json)
    #[arg(short = 'f', long = "format", global = true, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-column statistics
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Report missing values and mixed data types
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Filter and sort a file, then write the result to another file
    Convert {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "OUT")]
        output: PathBuf,

        /// Keep rows where COL matches VALUE (repeatable, applied in order)
        #[arg(long = "filter", value_name = "COL=VALUE")]
        filters: Vec<String>,

        /// Sort by this column
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default();
        if let Some(delimiter) = self.delimiter {
            options = options.with_delimiter(delimiter);
        }
        if let Some(sheet) = &self.sheet {
            options = options.with_sheet(sheet.clone());
        }
        options
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_rows: self.max_rows,
            format: self.format,
        }
    }
}

/// Parse a delimiter argument into a single byte.
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let options = cli.load_options();
    let config = cli.session_config();

    match cli.command {
        Some(Commands::Stats { file }) => {
            let table = loader::spawn_load(file, options).wait().await?;
            println!("{}", render::render_statistics(&summarize(&table), config.format)?);
            Ok(())
        }
        Some(Commands::Validate { file }) => {
            let table = loader::spawn_load(file, options).wait().await?;
            println!("{}", render::render_validation(&validate(&table), config.format)?);
            Ok(())
        }
        Some(Commands::Convert {
            file,
            output,
            filters,
            sort: sort_column,
            desc,
        }) => {
            let table = loader::spawn_load(file, options).wait().await?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let rows = run_convert(&table, &output, &filters, sort_column.as_deref(), direction)?;
            println!("Exported {rows} rows to {}", output.display());
            Ok(())
        }
        None => run_repl(Session::new(options, config), cli.file).await,
    }
}

/// Apply `COL=VALUE` filters and an optional sort, then export.
fn run_convert(
    table: &Table,
    output: &Path,
    filters: &[String],
    sort_column: Option<&str>,
    direction: SortDirection,
) -> Result<usize> {
    let mut view = table.clone();
    for arg in filters {
        let (column, value) = arg
            .split_once('=')
            .with_context(|| format!("Invalid filter: '{arg}'. Expected COL=VALUE format"))?;
        view = filter(&view, column, value)?;
    }
    if let Some(column) = sort_column {
        view = sort(&view, column, direction)?;
    }
    let rows = export(&view, output)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    Ok(rows)
}

/// Load a file in the background, animating a spinner until it is done.
async fn load_with_progress(session: &mut Session, path: PathBuf) -> Result<Outcome> {
    let pending = loader::spawn_load(path, session.load_options().clone());
    let label = format!("Loading {}", pending.path().display());
    let table = pending
        .wait_with_progress(Duration::from_millis(120), |tick| {
            let frame = SPINNER[(tick as usize) % SPINNER.len()];
            print!("\r{label} {frame}");
            let _ = std::io::stdout().flush();
        })
        .await;
    print!("\r{}\r", " ".repeat(label.len() + 2));
    let _ = std::io::stdout().flush();
    Ok(session.install(table?))
}

/// Run the REPL.
async fn run_repl(mut session: Session, file: Option<PathBuf>) -> Result<()> {
    println!(
        "{} {} - Interactive Mode",
        "sift".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Type {} for help, {} to exit\n",
        "help".yellow(),
        "quit".yellow()
    );

    if let Some(path) = file {
        match load_with_progress(&mut session, path).await {
            Ok(outcome) => print_outcome(&session, &outcome),
            Err(e) => println!("{} {e:#}", "Error:".red().bold()),
        }
    }

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = "sift> ".green().bold().to_string();

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                // Add to history
                let _ = rl.add_history_entry(line);

                let command = match Command::parse(line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{} {e}", "Error:".red().bold());
                        continue;
                    }
                };

                let result = match command {
                    Command::Load(path) => load_with_progress(&mut session, path).await,
                    other => session.execute(other),
                };

                match result {
                    Ok(Outcome::Quit) => break,
                    Ok(outcome) => print_outcome(&session, &outcome),
                    Err(e) => println!("{} {e:#}", "Error:".red().bold()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("sift");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

/// Print the result of a command.
fn print_outcome(session: &Session, outcome: &Outcome) {
    if let Err(e) = try_print_outcome(session, outcome) {
        println!("{} {e}", "Error:".red().bold());
    }
}

fn try_print_outcome(session: &Session, outcome: &Outcome) -> Result<()> {
    let format = session.config().format;
    match outcome {
        Outcome::Loaded {
            name,
            rows,
            columns,
        } => {
            println!(
                "{} {} ({rows} rows, {columns} columns)",
                "Loaded".green().bold(),
                name.cyan()
            );
        }
        Outcome::Show(limit) => {
            let Some(view) = session.current_view() else {
                bail!("No data loaded");
            };
            match format {
                OutputFormat::Table => println!("{}", render::render_grid(view, *limit)),
                OutputFormat::Json => println!("{}", render::view_to_json(view, *limit)?),
            }
        }
        Outcome::Columns => {
            if let Some(view) = session.current_view() {
                println!("{}", render::render_columns(view));
            }
        }
        Outcome::Filtered { rows, total } => {
            println!("Filtered: {rows} of {total} rows");
        }
        Outcome::Cleared => println!("Filter cleared"),
        Outcome::Sorted { column, direction } => {
            println!("Sorted by {} ({direction})", column.cyan());
        }
        Outcome::Report => match session.last_report() {
            Some(Report::Validation(report)) if report.is_empty() => {
                println!("{}", "No issues found".green());
            }
            Some(Report::Validation(report)) => {
                println!("{}", render::render_validation(report, format)?.yellow());
            }
            Some(Report::Statistics(report)) => {
                println!("{}", render::render_statistics(report, format)?);
            }
            None => {}
        },
        Outcome::Exported { path, rows } => {
            if *rows == 0 {
                println!("{} view has no rows, wrote headers only", "Warning:".yellow().bold());
            }
            println!("Exported {rows} rows to {}", path.display());
        }
        Outcome::Help => print_help(),
        Outcome::Quit => {}
    }
    Ok(())
}

/// Print REPL help.
fn print_help() {
    println!("{}", "sift REPL Commands:".cyan().bold());
    println!("  {}          Load a csv, tsv or workbook file", "load <path>".yellow());
    println!("  {}             Show the current view", "show [n]".yellow());
    println!("  {}              List columns and their types", "columns".yellow());
    println!("  {}  Keep rows matching a value", "filter <col> <value>".yellow());
    println!("  {}                Drop the filter and sort", "clear".yellow());
    println!("  {} Sort (repeat to toggle)", "sort <col> [asc|desc]".yellow());
    println!("  {}             Report data quality issues", "validate".yellow());
    println!("  {}                Show column statistics", "stats".yellow());
    println!("  {}        Write the current view to a file", "export <path>".yellow());
    println!("  {}           Exit the REPL", "quit, q, exit".yellow());
    println!();
    println!("{}", "Examples:".cyan().bold());
    println!("  load sales.xlsx");
    println!("  filter Region north");
    println!("  sort Amount desc");
    println!("  export north.csv");
}
