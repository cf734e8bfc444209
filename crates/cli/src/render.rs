//! Text and JSON rendering of views and reports.

use anyhow::Result;
use comfy_table::{presets, Cell, CellAlignment, Table as Grid};
use sift_sheet::{ColumnType, StatisticsReport, Table, ValidationReport};

/// Longest cell text shown in the grid before it is clipped
const MAX_CELL_WIDTH: usize = 32;
const ELLIPSIS: &str = "...";

/// Output format for views and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text grid (default)
    #[default]
    Table,
    /// JSON output
    Json,
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.replace('\n', " ");
    }
    let kept: String = text
        .chars()
        .take(MAX_CELL_WIDTH - ELLIPSIS.len())
        .collect();
    format!("{}{ELLIPSIS}", kept.replace('\n', " "))
}

/// Render up to `limit` rows of `view` as an aligned grid.
///
/// Numeric columns are right-aligned. A footer notes how many rows were
/// left out.
pub fn render_grid(view: &Table, limit: usize) -> String {
    let shown = view.row_count().min(limit);
    let mut grid = Grid::new();
    grid.load_preset(presets::ASCII_FULL_CONDENSED)
        .set_header(view.column_names().map(|name| Cell::new(clip(name))));
    for row in &view.rows()[..shown] {
        grid.add_row(row.iter().map(|cell| clip(&cell.to_string())));
    }
    for (idx, column) in view.columns().iter().enumerate() {
        if column.column_type() == ColumnType::Numeric {
            if let Some(grid_column) = grid.column_mut(idx) {
                grid_column.set_cell_alignment(CellAlignment::Right);
            }
        }
    }

    let mut out = grid.to_string();
    if view.is_empty() {
        out.push_str("\n(no rows)");
    } else if shown < view.row_count() {
        out.push_str(&format!("\n({shown} of {} rows shown)", view.row_count()));
    }
    out
}

/// Render the column names and inferred types, one per line
pub fn render_columns(view: &Table) -> String {
    let width = view
        .column_names()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);
    view.columns()
        .iter()
        .map(|column| format!("{:<width$}  {}", column.name(), column.column_type()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Up to `limit` rows of `view` as a JSON array of records
pub fn view_to_json(view: &Table, limit: usize) -> Result<String> {
    let records: Vec<_> = view.to_records().into_iter().take(limit).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn render_validation(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table if report.is_empty() => Ok("No issues found".to_string()),
        OutputFormat::Table => Ok(report.to_string().trim_end().to_string()),
    }
}

pub fn render_statistics(report: &StatisticsReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => Ok(report.to_string().trim_end().to_string()),
    }
}
