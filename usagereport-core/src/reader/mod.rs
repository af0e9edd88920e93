//! Excel/ODS usage export reader using calamine

use crate::error::{ReportError, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use tracing::debug;

pub mod table;

pub use table::{CellValue, RawRow, RawTable};

/// Read one worksheet of a workbook as a raw table.
///
/// The first row of the used range becomes the header row; every following
/// row is data. Columns are absolute, so leading empty columns keep their
/// position.
pub fn read_raw_table<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<RawTable> {
    let path = path.as_ref();
    // Surface missing files and permission problems as plain I/O errors
    fs::metadata(path).map_err(|e| ReportError::io(path, e))?;

    let mut excel: Sheets<_> = open_workbook_auto(path).map_err(|e| ReportError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = excel.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| ReportError::Schema(format!("worksheet '{}' not found", name)))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ReportError::Schema("workbook has no worksheets".to_string()))?,
    };

    let range = excel
        .worksheet_range(&sheet_name)
        .map_err(|e| ReportError::Workbook {
            path: path.to_path_buf(),
            message: format!("worksheet '{}': {}", sheet_name, e),
        })?;

    let table = parse_range(&sheet_name, &range);
    debug!(
        sheet = %sheet_name,
        columns = table.width(),
        rows = table.height(),
        "read raw usage table"
    );
    Ok(table)
}

fn parse_range(name: &str, range: &Range<Data>) -> RawTable {
    let (start, end) = match (range.start(), range.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return RawTable::new(name, Vec::new(), Vec::new()),
    };

    let read_row = |row: u32| -> Vec<CellValue> {
        (0..=end.1)
            .map(|col| {
                range
                    .get_value((row, col))
                    .map(parse_cell_value)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    };

    let headers = read_row(start.0)
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows = (start.0 + 1..=end.0)
        .map(|row| RawRow::new(row + 1, read_row(row)))
        .collect();

    RawTable::new(name, headers, rows)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
