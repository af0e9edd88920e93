//! Column normalization of the raw usage export

use crate::config::InputConfig;
use crate::error::{ReportError, Result};
use crate::reader::{CellValue, RawRow, RawTable};
use tracing::debug;

/// Canonical fields, in the order they follow the dropped metadata columns
pub const CANONICAL_FIELDS: [&str; 7] = [
    "period",
    "zone",
    "country",
    "operator",
    "sms_count",
    "call_count",
    "call_duration_minutes",
];

/// One usage line after cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    /// 1-based worksheet row the record came from
    pub sheet_row: u32,
    /// Billing date, kept raw until the month label needs it
    pub period: CellValue,
    pub zone: Option<String>,
    pub country: Option<String>,
    pub operator: Option<String>,
    pub sms_count: Option<f64>,
    pub call_count: Option<f64>,
    pub call_duration_minutes: Option<f64>,
}

/// Turn a raw table into usage records.
///
/// Drops fully blank rows, forward-fills the table, drops the metadata
/// columns and legend rows, maps
/// the remaining columns onto [`CANONICAL_FIELDS`] and removes the excluded
/// zone.
pub fn normalize(mut table: RawTable, input: &InputConfig) -> Result<Vec<UsageRecord>> {
    let usable_columns = table.width().saturating_sub(input.skip_columns);
    if usable_columns < CANONICAL_FIELDS.len() {
        return Err(ReportError::Schema(format!(
            "sheet '{}' has {} columns; {} are needed ({} metadata + {} usage fields)",
            table.sheet_name,
            table.width(),
            input.skip_columns + CANONICAL_FIELDS.len(),
            input.skip_columns,
            CANONICAL_FIELDS.len()
        )));
    }
    table.drop_blank_rows();
    if table.height() < input.skip_rows {
        return Err(ReportError::Schema(format!(
            "sheet '{}' has {} data rows, fewer than the {} legend rows to skip",
            table.sheet_name,
            table.height(),
            input.skip_rows
        )));
    }

    table.forward_fill();

    let mut records = Vec::new();
    let mut excluded = 0usize;

    for row in table.rows.iter().skip(input.skip_rows) {
        let fields = &row.cells[input.skip_columns..];
        let zone = fields[1].as_label();

        if zone.as_deref() == Some(input.excluded_zone.as_str()) {
            excluded += 1;
            continue;
        }

        records.push(UsageRecord {
            sheet_row: row.sheet_row,
            period: fields[0].clone(),
            zone,
            country: fields[2].as_label(),
            operator: fields[3].as_label(),
            sms_count: parse_number(row, &fields[4], "sms_count")?,
            call_count: parse_number(row, &fields[5], "call_count")?,
            call_duration_minutes: parse_number(row, &fields[6], "call_duration_minutes")?,
        });
    }

    debug!(
        kept = records.len(),
        excluded,
        excluded_zone = %input.excluded_zone,
        "normalized usage rows"
    );
    Ok(records)
}

fn parse_number(row: &RawRow, cell: &CellValue, field: &'static str) -> Result<Option<f64>> {
    let not_a_number = || ReportError::Parse {
        row: row.sheet_row,
        field,
        message: format!("'{}' is not a number", cell),
    };

    let value = match cell {
        CellValue::Empty => return Ok(None),
        CellValue::Number(n) => *n,
        CellValue::Text(s) if s.trim().is_empty() => return Ok(None),
        CellValue::Text(s) => s.trim().parse::<f64>().map_err(|_| not_a_number())?,
        _ => return Err(not_a_number()),
    };

    // "NaN" and "inf" parse as f64 but cannot be summed or written back
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(not_a_number())
    }
}
