//! Writer module for styled report workbooks

mod xlsx_writer;

pub use xlsx_writer::{build_xlsx, cell_ref, write_xlsx};

use crate::config::OutputConfig;
use crate::error::Result;
use crate::reader::CellValue;
use crate::report::{MONTH_LABEL, REPORT_HEADERS, ReportRow, ReportTable};
use std::path::Path;
use tracing::info;

const COLUMN_WIDTH: f64 = 22.0;

/// Visual treatment of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStyle {
    /// No formatting
    #[default]
    Plain,
    /// Centered text with a thin border
    Body,
    /// Body plus the accent fill
    Accent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl GridCell {
    pub fn new(value: CellValue, style: CellStyle) -> Self {
        Self { value, style }
    }

    pub fn text(value: impl Into<String>, style: CellStyle) -> Self {
        Self::new(CellValue::Text(value.into()), style)
    }

    pub fn number(value: f64, style: CellStyle) -> Self {
        Self::new(CellValue::Number(value), style)
    }

    pub fn blank(style: CellStyle) -> Self {
        Self::new(CellValue::Empty, style)
    }
}

/// Merged cell range, 0-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl MergeRange {
    /// Excel-style reference, e.g. "B7:D7"
    pub fn to_excel_ref(&self) -> String {
        format!(
            "{}:{}",
            cell_ref(self.first_row, self.first_col),
            cell_ref(self.last_row, self.last_col)
        )
    }
}

/// In-memory worksheet: rows of styled cells plus merged ranges
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetGrid {
    pub name: String,
    pub rows: Vec<Vec<GridCell>>,
    pub merges: Vec<MergeRange>,
    /// Width applied to every used column, in characters
    pub column_width: Option<f64>,
}

impl WorksheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            merges: Vec::new(),
            column_width: None,
        }
    }

    pub fn push_row(&mut self, row: Vec<GridCell>) {
        self.rows.push(row);
    }

    pub fn merge(&mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) {
        self.merges.push(MergeRange {
            first_row,
            first_col,
            last_row,
            last_col,
        });
    }

    /// Number of columns of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Lay a report out on a worksheet.
///
/// Header, total and month rows get the accent style, zone rows the body
/// style. The last three columns of the row after the month row are merged.
pub fn report_grid(report: &ReportTable, sheet_name: &str) -> WorksheetGrid {
    let mut grid = WorksheetGrid::new(sheet_name);
    grid.column_width = Some(COLUMN_WIDTH);

    grid.push_row(
        REPORT_HEADERS
            .iter()
            .map(|h| GridCell::text(*h, CellStyle::Accent))
            .collect(),
    );

    for row in &report.rows {
        grid.push_row(usage_cells(row, CellStyle::Body));
    }
    grid.push_row(usage_cells(&report.total, CellStyle::Accent));
    grid.push_row(vec![
        GridCell::text(MONTH_LABEL, CellStyle::Accent),
        GridCell::text(report.month.clone(), CellStyle::Accent),
        GridCell::blank(CellStyle::Accent),
        GridCell::blank(CellStyle::Accent),
    ]);

    // B:D of the empty row below the Month row, not the Month row itself
    let trailing_row = grid.rows.len() as u32;
    let last_col = REPORT_HEADERS.len() as u32 - 1;
    grid.merge(trailing_row, last_col - 2, trailing_row, last_col);

    grid
}

fn usage_cells(row: &ReportRow, style: CellStyle) -> Vec<GridCell> {
    vec![
        GridCell::text(row.zone.clone(), style),
        GridCell::number(row.sms_count, style),
        GridCell::number(row.mobile_minutes, style),
        GridCell::number(row.fixed_minutes, style),
    ]
}

/// Write a report to an xlsx file
pub fn write_report<P: AsRef<Path>>(report: &ReportTable, path: P, output: &OutputConfig) -> Result<()> {
    let path = path.as_ref();
    let grid = report_grid(report, &output.sheet_name);
    write_xlsx(path, &grid, &output.accent_argb())?;
    info!(path = %path.display(), zones = report.rows.len(), "report written");
    Ok(())
}
