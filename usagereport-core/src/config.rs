//! Configuration system for the report pipeline

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Usage export to read
    #[serde(default)]
    pub input_path: PathBuf,
    /// Workbook to produce
    #[serde(default)]
    pub output_path: PathBuf,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub report: ReportOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ReportConfig {
    /// Create a configuration with default options for the given paths
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ReportError::Config(e.to_string()))
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ReportError::Config("input_path is not set".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ReportError::Config("output_path is not set".to_string()));
        }
        if self.input_path == self.output_path {
            return Err(ReportError::Config(format!(
                "input_path and output_path both point to {}",
                self.input_path.display()
            )));
        }
        match self.output_path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => {}
            _ => {
                return Err(ReportError::Config(format!(
                    "output_path must be an .xlsx file: {}",
                    self.output_path.display()
                )));
            }
        }

        if self.classification.mobile_zone_marker.is_empty() {
            return Err(ReportError::Config(
                "classification.mobile_zone_marker must not be empty".to_string(),
            ));
        }
        if self.classification.mobile_operator_marker.is_empty() {
            return Err(ReportError::Config(
                "classification.mobile_operator_marker must not be empty".to_string(),
            ));
        }

        self.output.validate()
    }
}

/// Layout of the raw usage export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Worksheet to read; the first one when unset
    pub sheet: Option<String>,
    /// Leading metadata columns dropped before the canonical fields
    pub skip_columns: usize,
    /// Legend rows dropped at the top of the data region
    pub skip_rows: usize,
    /// Zone label excluded from the report
    pub excluded_zone: String,
    /// chrono format used for text periods
    pub period_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            skip_columns: 2,
            skip_rows: 5,
            excluded_zone: "International".to_string(),
            period_format: "%d/%m/%Y".to_string(),
        }
    }
}

/// Substring markers that route call minutes to the mobile bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub mobile_zone_marker: String,
    pub mobile_operator_marker: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            mobile_zone_marker: "Mobile".to_string(),
            mobile_operator_marker: "-Mob".to_string(),
        }
    }
}

/// How the month label is derived and rendered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub period_policy: PeriodPolicy,
    pub month_locale: MonthLocale,
}

/// Selection of the period behind the month label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodPolicy {
    /// Every record must fall in the same month
    #[default]
    Strict,
    /// First period of the first zone in sorted order
    FirstZone,
}

/// Language of the month name in the label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthLocale {
    #[default]
    English,
    French,
}

/// Output workbook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sheet_name: String,
    /// RGB hex colour of the header, total and month rows
    pub accent_color: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            accent_color: "5B9BD5".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        let name = &self.sheet_name;
        if name.is_empty() || name.chars().count() > 31 {
            return Err(ReportError::Config(format!(
                "output.sheet_name must be 1 to 31 characters: '{}'",
                name
            )));
        }
        if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
            return Err(ReportError::Config(format!(
                "output.sheet_name contains a forbidden character: '{}'",
                name
            )));
        }

        let color = self.accent_color.trim_start_matches('#');
        if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReportError::Config(format!(
                "output.accent_color must be a 6-digit RGB hex value: '{}'",
                self.accent_color
            )));
        }

        Ok(())
    }

    /// Accent colour in the ARGB form used by spreadsheet styles
    pub fn accent_argb(&self) -> String {
        format!(
            "FF{}",
            self.accent_color.trim_start_matches('#').to_ascii_uppercase()
        )
    }
}
