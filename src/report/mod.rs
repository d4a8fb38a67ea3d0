//! Report generation with multiple output formats
//!
//! Architecture: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - OutcomeReport (domain) is converted to terminal, JSON, JUnit and GitHub representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Outcomes in JSON output keep the flat wire shape consumers already parse

use crate::domain::report::{MalformedRecord, OutcomeEntry, OutcomeReport};
use crate::domain::violations::{VerdictError, VerdictResult, Violates};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::io::Write;

/// Supported output formats for outcome reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format grouped by violated section
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI/CD integration
    Junit,
    /// GitHub Actions workflow commands
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "junit" => Some(Self::Junit),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to print violation links
    pub show_links: bool,
    /// Maximum number of failures to include
    pub max_failures: Option<usize>,
    /// Leave passing outcomes out of the output
    pub only_failures: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_links: true,
            max_failures: None,
            only_failures: false,
        }
    }
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a report in the specified format
    pub fn format_report(
        &self,
        report: &OutcomeReport,
        format: OutputFormat,
    ) -> VerdictResult<String> {
        let entries = self.select_entries(&report.entries);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &entries)),
            OutputFormat::Json => self.format_json(report, &entries),
            OutputFormat::Junit => Ok(self.format_junit(report, &entries)),
            OutputFormat::GitHub => Ok(self.format_github(report, &entries)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &OutcomeReport,
        format: OutputFormat,
        mut writer: W,
    ) -> VerdictResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Apply `only_failures` and `max_failures`, keeping report order
    fn select_entries<'a>(&self, entries: &'a [OutcomeEntry]) -> Vec<&'a OutcomeEntry> {
        let mut failures_kept = 0usize;

        entries
            .iter()
            .filter(|entry| {
                if entry.result.is_success() {
                    return !self.options.only_failures;
                }
                if let Some(max) = self.options.max_failures {
                    if failures_kept >= max {
                        return false;
                    }
                }
                failures_kept += 1;
                true
            })
            .collect()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Format report in human-readable format
    fn format_human(&self, report: &OutcomeReport, entries: &[&OutcomeEntry]) -> String {
        let mut output = String::new();

        let mut by_section: BTreeMap<&str, Vec<(&OutcomeEntry, &Violates)>> = BTreeMap::new();
        for &entry in entries {
            if let Some(violates) = entry.violates() {
                by_section.entry(violates.section()).or_default().push((entry, violates));
            }
        }

        let has_failures = !by_section.is_empty();

        if !has_failures && report.malformed.is_empty() {
            output.push_str(&format!("✅ {}\n", self.paint("All outcomes passed", "32")));
        } else if has_failures {
            output.push_str(&format!("❌ {}\n\n", self.paint("Claims Validation Failures", "31")));

            for (section, failures) in by_section {
                output.push_str(&format!("§ {}\n", self.paint(section, "1")));
                for (entry, violates) in failures {
                    output.push_str(&format!(
                        "  {}: {}\n",
                        self.paint(&entry.label, "2"),
                        violates.message()
                    ));
                    if self.options.show_links && !violates.link().is_empty() {
                        let link = self.paint(violates.link(), "36");
                        output.push_str(&format!("    🔗 {}\n", link));
                    }
                }
                output.push('\n');
            }
        }

        if !report.malformed.is_empty() {
            output.push_str(&format!("⚠️ {}\n", self.paint("Malformed Records", "33")));
            for record in &report.malformed {
                let label = self.paint(&record.label, "2");
                output.push_str(&format!("  {}: {}\n", label, record.reason));
            }
            output.push('\n');
        }

        let passed: Vec<&&OutcomeEntry> =
            entries.iter().filter(|e| e.result.is_success()).collect();
        if !passed.is_empty() && (has_failures || !report.malformed.is_empty()) {
            output.push_str(&format!("{}\n", self.paint("Passed", "32")));
            for entry in passed {
                match &entry.issuer {
                    Some(issuer) => {
                        output.push_str(&format!("  {} (iss: {})\n", entry.label, issuer))
                    }
                    None => output.push_str(&format!("  {}\n", entry.label)),
                }
            }
            output.push('\n');
        }

        output.push_str(&self.format_summary(report));
        output
    }

    /// Format report in JSON format
    fn format_json(
        &self,
        report: &OutcomeReport,
        entries: &[&OutcomeEntry],
    ) -> VerdictResult<String> {
        let outcomes = entries
            .iter()
            .map(|entry| {
                let mut record = serde_json::to_value(&entry.result)
                    .map_err(|e| VerdictError::report(format!("JSON serialization failed: {e}")))?;
                if let Some(object) = record.as_object_mut() {
                    object.insert("label".to_string(), JsonValue::from(entry.label.clone()));
                    if let Some(issuer) = &entry.issuer {
                        object.insert("issuer".to_string(), JsonValue::from(issuer.clone()));
                    }
                    if let Some(subject) = &entry.subject {
                        object.insert("subject".to_string(), JsonValue::from(subject.clone()));
                    }
                }
                Ok(record)
            })
            .collect::<VerdictResult<Vec<JsonValue>>>()?;

        let malformed: Vec<JsonValue> = report
            .malformed
            .iter()
            .map(|record| serde_json::json!({ "label": record.label, "reason": record.reason }))
            .collect();

        let json_report = serde_json::json!({
            "outcomes": outcomes,
            "malformed": malformed,
            "summary": {
                "total_sources": report.summary.total_sources,
                "passed": report.summary.passed,
                "failed": report.summary.failed,
                "malformed": report.summary.malformed,
                "failures_by_section": report.failures_by_section(),
                "execution_time_ms": report.summary.execution_time_ms,
                "generated_at": report.summary.generated_at.to_rfc3339()
            },
            "config_fingerprint": report.config_fingerprint
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| VerdictError::report(format!("JSON serialization failed: {e}")))
    }

    /// Format report in JUnit XML format
    fn format_junit(&self, report: &OutcomeReport, entries: &[&OutcomeEntry]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failures = entries.iter().filter(|e| e.result.is_failure()).count();
        let errors = report.malformed.len();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"cwt-verdict\" tests=\"{}\" failures=\"{}\" \
             errors=\"{}\" time=\"{:.3}\">\n",
            entries.len() + errors,
            failures,
            errors,
            execution_time
        ));

        for entry in entries {
            let classname = entry
                .violates()
                .map(|v| format!("section {}", v.section()))
                .unwrap_or_else(|| "passed".to_string());
            xml.push_str(&format!(
                "  <testcase classname=\"{}\" name=\"{}\">\n",
                escape_xml(&classname),
                escape_xml(&entry.label)
            ));

            if let Some(violates) = entry.violates() {
                xml.push_str(&format!(
                    "    <failure message=\"{}\">\n",
                    escape_xml(violates.message())
                ));
                xml.push_str(&format!("      Section: {}\n", escape_xml(violates.section())));
                xml.push_str(&format!("      Link: {}\n", escape_xml(violates.link())));
                xml.push_str("    </failure>\n");
            }

            xml.push_str("  </testcase>\n");
        }

        for record in &report.malformed {
            xml.push_str(&self.junit_malformed(record));
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn junit_malformed(&self, record: &MalformedRecord) -> String {
        format!(
            "  <testcase classname=\"malformed\" name=\"{}\">\n    \
             <error message=\"{}\"/>\n  </testcase>\n",
            escape_xml(&record.label),
            escape_xml(&record.reason)
        )
    }

    /// Format report as GitHub Actions workflow commands
    fn format_github(&self, report: &OutcomeReport, entries: &[&OutcomeEntry]) -> String {
        let mut output = String::new();

        for entry in entries {
            if let Some(violates) = entry.violates() {
                let link = if self.options.show_links && !violates.link().is_empty() {
                    format!(" ({})", violates.link())
                } else {
                    String::new()
                };
                let title = format!("Section {}", violates.section());
                let message = format!("{}: {}{}", entry.label, violates.message(), link);
                output.push_str(&format!(
                    "::error title={}::{}\n",
                    escape_workflow_property(&title),
                    escape_workflow_data(&message)
                ));
            }
        }

        for record in &report.malformed {
            let message = format!("{}: {}", record.label, record.reason);
            output.push_str(&format!(
                "::warning title=Malformed record::{}\n",
                escape_workflow_data(&message)
            ));
        }

        output
    }

    /// Format the summary section
    fn format_summary(&self, report: &OutcomeReport) -> String {
        let summary = &report.summary;
        let execution_time = (summary.execution_time_ms as f64) / 1000.0;

        let mut parts = vec![self.paint(&format!("{} passed", summary.passed), "32")];
        if summary.failed > 0 {
            parts.push(self.paint(&format!("{} failed", summary.failed), "31"));
        } else {
            parts.push("0 failed".to_string());
        }
        if summary.malformed > 0 {
            parts.push(self.paint(&format!("{} malformed", summary.malformed), "33"));
        } else {
            parts.push("0 malformed".to_string());
        }

        format!(
            "📊 {} {} in {} source{} ({:.1}s)\n",
            self.paint("Summary:", "1"),
            parts.join(", "),
            summary.total_sources,
            if summary.total_sources == 1 { "" } else { "s" },
            execution_time
        )
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape the message of a workflow command so it stays on one line
fn escape_workflow_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value such as `title`
fn escape_workflow_property(s: &str) -> String {
    escape_workflow_data(s).replace(':', "%3A").replace(',', "%2C")
}
