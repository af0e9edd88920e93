//! Output formatters for the run summary

use anyhow::Result;
use colored::*;
use std::path::Path;
use usagereport_core::ReportTable;
use usagereport_core::report::REPORT_HEADERS;

/// Print the report table and the confirmation line
pub fn print_human(input: &Path, output: Option<&Path>, report: &ReportTable) {
    println!("{}", format!("Report: {}", input.display()).bold());
    println!();

    let zone_width = report
        .rows
        .iter()
        .map(|r| r.zone.chars().count())
        .chain(std::iter::once(REPORT_HEADERS[0].len()))
        .max()
        .unwrap_or(0);

    println!(
        "  {:<zone_width$}  {:>12}  {:>20}  {:>18}",
        REPORT_HEADERS[0],
        REPORT_HEADERS[1],
        REPORT_HEADERS[2],
        REPORT_HEADERS[3],
        zone_width = zone_width
    );
    for row in &report.rows {
        println!(
            "  {:<zone_width$}  {:>12}  {:>20}  {:>18}",
            row.zone.cyan(),
            row.sms_count,
            row.mobile_minutes,
            row.fixed_minutes,
            zone_width = zone_width
        );
    }
    println!(
        "  {:<zone_width$}  {:>12}  {:>20}  {:>18}",
        report.total.zone.bold(),
        report.total.sms_count,
        report.total.mobile_minutes,
        report.total.fixed_minutes,
        zone_width = zone_width
    );
    println!("  {} {}", "Month:".bold(), report.month);
    println!();

    match output {
        Some(path) => println!(
            "{}",
            format!("✓ Formatted output saved to {}", path.display())
                .green()
                .bold()
        ),
        None => println!("{}", "[DRY RUN] No workbook written".yellow().bold()),
    }
}

/// Print the report in JSON format
pub fn print_json(input: &Path, output: Option<&Path>, report: &ReportTable) -> Result<()> {
    let summary = serde_json::json!({
        "input": input.display().to_string(),
        "output": output.map(|p| p.display().to_string()),
        "report": report,
        "summary": {
            "zones": report.rows.len(),
            "month": report.month,
        }
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
