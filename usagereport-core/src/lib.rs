//! usagereport-core: monthly telecom usage export to per-zone summary workbook
//!
//! The pipeline reads the first worksheet of a usage export, cleans it,
//! splits call minutes into mobile and fixed buckets, sums them per zone and
//! writes a styled one-sheet report with totals and a month label.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod writer;

use tracing::info;

pub use config::{MonthLocale, PeriodPolicy, ReportConfig};
pub use error::{ReportError, Result};
pub use reader::{CellValue, RawRow, RawTable};
pub use report::{ReportRow, ReportTable};

/// Main report interface
pub struct ReportPipeline {
    config: ReportConfig,
}

impl ReportPipeline {
    /// Create a pipeline driven by the given configuration
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Read the configured input and build the report without writing it
    pub fn build_report(&self) -> Result<ReportTable> {
        let table = reader::read_raw_table(&self.config.input_path, self.config.input.sheet.as_deref())?;
        self.build_report_from_table(table)
    }

    /// Build the report from an already loaded raw table
    pub fn build_report_from_table(&self, table: RawTable) -> Result<ReportTable> {
        let records = pipeline::normalize(table, &self.config.input)?;
        let classified = pipeline::classify_all(records, &self.config.classification);
        let aggregates = pipeline::aggregate_by_zone(&classified);

        let grouped: usize = aggregates.iter().map(|a| a.record_count).sum();
        info!(
            records = classified.len(),
            grouped,
            zones = aggregates.len(),
            "aggregated usage by zone"
        );

        ReportTable::build(aggregates, &classified, &self.config.input, &self.config.report)
    }

    /// Validate the configuration, build the report and write it
    pub fn run(&self) -> Result<ReportTable> {
        self.config.validate()?;
        info!(input = %self.config.input_path.display(), "generating usage report");

        let report = self.build_report()?;
        writer::write_report(&report, &self.config.output_path, &self.config.output)?;
        Ok(report)
    }
}
