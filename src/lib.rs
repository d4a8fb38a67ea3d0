//! CWT Verdict - typed outcomes for CWT claims validation
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain types (violations, outcomes, claims) with no I/O
//! - Loading, configuration and report rendering live in their own modules
//! - `VerdictInspector` ties them together for callers that just want a report

pub mod config;
pub mod domain;
pub mod loader;
pub mod report;

// Re-export main types for convenient access
pub use domain::{
    CheckResult, CwtClaims, CwtClaimsBuilder, CwtClaimsResult, MalformedRecord, Outcome,
    OutcomeEntry, OutcomeReport, OutcomeSummary, VerdictError, VerdictResult, Violates,
    WireOutcome,
};

pub use config::{ConfigBuilder, LoaderSettings, ReportSettings, VerdictConfig};

pub use loader::{RecordLoader, SourceKind};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

use std::path::Path;

/// High-level entry point: load outcome records and render reports
pub struct VerdictInspector {
    config: VerdictConfig,
    loader: RecordLoader,
    report_formatter: ReportFormatter,
}

impl VerdictInspector {
    /// Create an inspector with the given configuration
    pub fn new_with_config(config: VerdictConfig) -> VerdictResult<Self> {
        config.validate()?;
        let loader = RecordLoader::new(config.loader.clone());
        let report_formatter = ReportFormatter::new(config.report.report_options());

        Ok(Self {
            config,
            loader,
            report_formatter,
        })
    }

    /// Create an inspector with default configuration
    pub fn new() -> VerdictResult<Self> {
        Self::new_with_config(VerdictConfig::default())
    }

    /// Create an inspector loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> VerdictResult<Self> {
        let config = VerdictConfig::load_from_file(path)?;
        Self::new_with_config(config)
    }

    /// Replace the report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    pub fn config(&self) -> &VerdictConfig {
        &self.config
    }

    /// Load outcome records from files and directories
    pub async fn inspect<P: AsRef<Path>>(&self, paths: &[P]) -> VerdictResult<OutcomeReport> {
        let mut report = self.loader.load_paths(paths).await?;
        report.set_config_fingerprint(self.config.fingerprint());

        tracing::info!(
            "Inspected {} sources: {} passed, {} failed, {} malformed",
            report.summary.total_sources,
            report.summary.passed,
            report.summary.failed,
            report.summary.malformed
        );

        Ok(report)
    }

    /// Format a report with the configured formatter
    pub fn format_report(
        &self,
        report: &OutcomeReport,
        format: OutputFormat,
    ) -> VerdictResult<String> {
        self.report_formatter.format_report(report, format)
    }

    /// Format a report in the format named by the configuration
    pub fn format_default(&self, report: &OutcomeReport) -> VerdictResult<String> {
        let format = self.config.report.output_format()?;
        self.format_report(report, format)
    }
}

/// Decode a single wire record from JSON text
pub fn decode_record(json: &str) -> VerdictResult<WireOutcome> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| VerdictError::decode("input", e.to_string()))?;
    WireOutcome::from_value(value, "input")
}
