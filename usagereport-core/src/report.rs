//! Report reshaping: zone rows, totals and the month label

use crate::config::{InputConfig, MonthLocale, PeriodPolicy, ReportOptions};
use crate::error::{ReportError, Result};
use crate::pipeline::{ClassifiedRecord, ZoneAggregate};
use crate::reader::CellValue;
use chrono::{Datelike, Locale, NaiveDate, TimeDelta};
use serde::Serialize;
use tracing::debug;

/// Column labels of the output sheet
pub const REPORT_HEADERS: [&str; 4] = ["Zone", "Nombre SMS", "Durée (min) Mobile", "Durée (min) Fixe"];

pub const TOTAL_LABEL: &str = "Total:";
pub const MONTH_LABEL: &str = "Month: ";

/// Largest serial date spreadsheets accept (9999-12-31)
const MAX_SERIAL_DATE: f64 = 2_958_465.0;

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub zone: String,
    pub sms_count: f64,
    pub mobile_minutes: f64,
    pub fixed_minutes: f64,
}

/// Zone rows sorted by name, followed by the total and the month label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
    pub total: ReportRow,
    pub month: String,
}

impl ReportTable {
    /// Reshape aggregates into the report.
    ///
    /// `records` are the classified records behind the aggregates; the
    /// strict period policy checks all of them.
    pub fn build(
        mut aggregates: Vec<ZoneAggregate>,
        records: &[ClassifiedRecord],
        input: &InputConfig,
        options: &ReportOptions,
    ) -> Result<Self> {
        if aggregates.is_empty() {
            return Err(ReportError::EmptyReport {
                excluded_zone: input.excluded_zone.clone(),
            });
        }

        aggregates.sort_by(|a, b| a.zone.cmp(&b.zone));

        let period = match options.period_policy {
            PeriodPolicy::Strict => common_period(records, input, options.month_locale)?,
            PeriodPolicy::FirstZone => {
                let first = &aggregates[0];
                parse_period(&first.first_period, &input.period_format, first.first_period_row)?
            }
        };

        let rows: Vec<ReportRow> = aggregates
            .into_iter()
            .map(|a| ReportRow {
                zone: a.zone,
                sms_count: a.sms_count,
                mobile_minutes: a.mobile_minutes,
                fixed_minutes: a.fixed_minutes,
            })
            .collect();

        let total = ReportRow {
            zone: TOTAL_LABEL.to_string(),
            sms_count: rows.iter().map(|r| r.sms_count).sum(),
            mobile_minutes: rows.iter().map(|r| r.mobile_minutes).sum(),
            fixed_minutes: rows.iter().map(|r| r.fixed_minutes).sum(),
        };

        let month = month_label(period, options.month_locale);
        debug!(zones = rows.len(), %month, "built report table");

        Ok(Self { rows, total, month })
    }
}

/// Period shared by every zoned record, or a mismatch error
fn common_period(
    records: &[ClassifiedRecord],
    input: &InputConfig,
    locale: MonthLocale,
) -> Result<NaiveDate> {
    let mut expected: Option<NaiveDate> = None;

    for classified in records.iter().filter(|c| c.record.zone.is_some()) {
        let record = &classified.record;
        let date = parse_period(&record.period, &input.period_format, record.sheet_row)?;
        match expected {
            None => expected = Some(date),
            Some(first) if (first.year(), first.month()) != (date.year(), date.month()) => {
                return Err(ReportError::PeriodMismatch {
                    expected: month_label(first, locale),
                    found: month_label(date, locale),
                    row: record.sheet_row,
                });
            }
            Some(_) => {}
        }
    }

    // Aggregates are non-empty, so at least one zoned record exists
    expected.ok_or_else(|| ReportError::Parse {
        row: 0,
        field: "period",
        message: "no period found".to_string(),
    })
}

/// Interpret a period cell as a calendar date
pub fn parse_period(cell: &CellValue, format: &str, row: u32) -> Result<NaiveDate> {
    let fail = |message: String| ReportError::Parse {
        row,
        field: "period",
        message,
    };

    match cell {
        CellValue::Date(dt) => Ok(dt.date()),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), format)
            .map_err(|e| fail(format!("'{}' does not match '{}': {}", s, format, e))),
        CellValue::Number(n) if *n >= 1.0 && *n <= MAX_SERIAL_DATE => {
            // Serial dates count days from 1899-12-30
            NaiveDate::from_ymd_opt(1899, 12, 30)
                .and_then(|epoch| epoch.checked_add_signed(TimeDelta::days(n.trunc() as i64)))
                .ok_or_else(|| fail(format!("serial date {} is out of range", n)))
        }
        CellValue::Empty => Err(fail("period is missing".to_string())),
        other => Err(fail(format!("'{}' is not a date", other))),
    }
}

/// Full month name and four-digit year, e.g. "March 2024"
pub fn month_label(date: NaiveDate, locale: MonthLocale) -> String {
    match locale {
        MonthLocale::English => date.format("%B %Y").to_string(),
        MonthLocale::French => date.format_localized("%B %Y", Locale::fr_FR).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationConfig;
    use crate::pipeline::{UsageRecord, aggregate_by_zone, classify_all};

    fn record(row: u32, zone: &str, operator: &str, sms: f64, minutes: f64, period: &str) -> UsageRecord {
        UsageRecord {
            sheet_row: row,
            period: CellValue::Text(period.to_string()),
            zone: Some(zone.to_string()),
            country: None,
            operator: Some(operator.to_string()),
            sms_count: Some(sms),
            call_count: None,
            call_duration_minutes: Some(minutes),
        }
    }

    fn build(records: Vec<UsageRecord>, options: &ReportOptions) -> Result<ReportTable> {
        let classified = classify_all(records, &ClassificationConfig::default());
        let aggregates = aggregate_by_zone(&classified);
        ReportTable::build(aggregates, &classified, &InputConfig::default(), options)
    }

    #[test]
    fn test_two_zone_report() {
        let report = build(
            vec![
                record(7, "Zone A Mobile", "X", 5.0, 10.0, "15/03/2024"),
                record(8, "Zone B", "Z", 2.0, 6.0, "15/03/2024"),
                record(9, "Zone A Mobile", "Y-Mob", 3.0, 4.0, "15/03/2024"),
            ],
            &ReportOptions::default(),
        )
        .unwrap();

        assert_eq!(
            report.rows,
            vec![
                ReportRow {
                    zone: "Zone A Mobile".to_string(),
                    sms_count: 8.0,
                    mobile_minutes: 14.0,
                    fixed_minutes: 0.0,
                },
                ReportRow {
                    zone: "Zone B".to_string(),
                    sms_count: 2.0,
                    mobile_minutes: 0.0,
                    fixed_minutes: 6.0,
                },
            ]
        );
        assert_eq!(report.total.zone, "Total:");
        assert_eq!(report.total.sms_count, 10.0);
        assert_eq!(report.total.mobile_minutes, 14.0);
        assert_eq!(report.total.fixed_minutes, 6.0);
        assert_eq!(report.month, "March 2024");
    }

    #[test]
    fn test_sorted_by_zone() {
        let report = build(
            vec![
                record(7, "Sud", "X", 1.0, 1.0, "01/02/2023"),
                record(8, "Centre", "X", 1.0, 1.0, "01/02/2023"),
                record(9, "Nord", "X", 1.0, 1.0, "01/02/2023"),
                record(10, "Centre Mobile", "X", 1.0, 1.0, "01/02/2023"),
            ],
            &ReportOptions::default(),
        )
        .unwrap();

        let zones: Vec<_> = report.rows.iter().map(|r| r.zone.as_str()).collect();
        assert_eq!(zones, vec!["Centre", "Centre Mobile", "Nord", "Sud"]);
    }

    #[test]
    fn test_empty_report() {
        let err = build(Vec::new(), &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::EmptyReport { ref excluded_zone } if excluded_zone == "International"));
    }

    #[test]
    fn test_period_mismatch() {
        let records = vec![
            record(7, "Zone B", "X", 1.0, 1.0, "15/03/2024"),
            record(8, "Zone A", "X", 1.0, 1.0, "02/04/2024"),
        ];

        let err = build(records.clone(), &ReportOptions::default()).unwrap_err();
        match err {
            ReportError::PeriodMismatch { expected, found, row } => {
                assert_eq!(expected, "March 2024");
                assert_eq!(found, "April 2024");
                assert_eq!(row, 8);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Legacy selection takes the first zone in sorted order
        let options = ReportOptions {
            period_policy: PeriodPolicy::FirstZone,
            ..ReportOptions::default()
        };
        assert_eq!(build(records, &options).unwrap().month, "April 2024");
    }

    #[test]
    fn test_same_month_different_days() {
        let report = build(
            vec![
                record(7, "Zone A", "X", 1.0, 1.0, "01/03/2024"),
                record(8, "Zone B", "X", 1.0, 1.0, "31/03/2024"),
            ],
            &ReportOptions::default(),
        )
        .unwrap();
        assert_eq!(report.month, "March 2024");
    }

    #[test]
    fn test_unparseable_period() {
        let err = build(
            vec![record(7, "Zone A", "X", 1.0, 1.0, "2024-03-15")],
            &ReportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Parse { row: 7, field: "period", .. }));
    }

    #[test]
    fn test_parse_period_variants() {
        let march_15 = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(
            parse_period(&CellValue::Text("15/03/2024".to_string()), "%d/%m/%Y", 1).unwrap(),
            march_15
        );
        assert_eq!(
            parse_period(&CellValue::Date(march_15.and_hms_opt(0, 0, 0).unwrap()), "%d/%m/%Y", 1)
                .unwrap(),
            march_15
        );
        // 2024-03-15 as a spreadsheet serial date
        assert_eq!(
            parse_period(&CellValue::Number(45366.0), "%d/%m/%Y", 1).unwrap(),
            march_15
        );
        assert!(parse_period(&CellValue::Empty, "%d/%m/%Y", 1).is_err());
        assert!(parse_period(&CellValue::Boolean(true), "%d/%m/%Y", 1).is_err());
        assert!(parse_period(&CellValue::Number(-3.0), "%d/%m/%Y", 1).is_err());
    }

    #[test]
    fn test_month_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(month_label(date, MonthLocale::English), "March 2024");
        assert_eq!(month_label(date, MonthLocale::French), "mars 2024");

        let august = NaiveDate::from_ymd_opt(2023, 8, 1).unwrap();
        assert_eq!(month_label(august, MonthLocale::French), "août 2023");
    }
}
