//! Aggregate of labelled outcomes read from one or more sources
//!
//! `OutcomeReport` is the aggregate root: it owns the entries, keeps the counts in its
//! summary consistent with them, and records sources that could not be trusted.

use crate::domain::claims::CwtClaims;
use crate::domain::outcome::CheckResult;
use crate::domain::violations::Violates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One outcome together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    /// Source label, e.g. `results.jsonl:3`
    pub label: String,
    pub result: CheckResult,
    /// Issuer of the claims, for claims outcomes that succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Subject of the claims, for claims outcomes that succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl OutcomeEntry {
    pub fn new(label: impl Into<String>, result: CheckResult) -> Self {
        Self {
            label: label.into(),
            result,
            issuer: None,
            subject: None,
        }
    }

    /// Attach issuer and subject from extracted claims
    pub fn with_claims(mut self, claims: &CwtClaims) -> Self {
        self.issuer = claims.iss.clone();
        self.subject = claims.sub.clone();
        self
    }

    pub fn violates(&self) -> Option<&Violates> {
        self.result.violates()
    }
}

/// A record that broke the outcome contract or could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRecord {
    pub label: String,
    pub reason: String,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeSummary {
    /// Number of files read
    pub total_sources: usize,
    pub passed: usize,
    pub failed: usize,
    pub malformed: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl OutcomeSummary {
    /// Number of well-formed outcomes
    pub fn total_outcomes(&self) -> usize {
        self.passed + self.failed
    }
}

/// Complete report of outcomes and malformed records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub entries: Vec<OutcomeEntry>,
    pub malformed: Vec<MalformedRecord>,
    pub summary: OutcomeSummary,
    /// Fingerprint of the configuration used to build this report
    pub config_fingerprint: Option<String>,
}

impl OutcomeReport {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            malformed: Vec::new(),
            summary: OutcomeSummary {
                generated_at: Utc::now(),
                ..Default::default()
            },
            config_fingerprint: None,
        }
    }

    /// Add an outcome entry, updating the counts
    pub fn add_outcome(&mut self, entry: OutcomeEntry) {
        if entry.result.is_success() {
            self.summary.passed += 1;
        } else {
            self.summary.failed += 1;
        }
        self.entries.push(entry);
    }

    /// Record a source that could not be turned into an outcome
    pub fn add_malformed(&mut self, label: impl Into<String>, reason: impl Into<String>) {
        self.summary.malformed += 1;
        self.malformed.push(MalformedRecord {
            label: label.into(),
            reason: reason.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// No failures and no malformed records
    pub fn is_clean(&self) -> bool {
        self.summary.failed == 0 && self.summary.malformed == 0
    }

    /// Entries on the failure branch, with their violation
    pub fn failures(&self) -> impl Iterator<Item = (&OutcomeEntry, &Violates)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.violates().map(|violates| (entry, violates)))
    }

    /// Failure counts keyed by violated section
    pub fn failures_by_section(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for (_, violates) in self.failures() {
            *counts.entry(violates.section()).or_insert(0) += 1;
        }
        counts
    }

    pub fn set_sources_read(&mut self, count: usize) {
        self.summary.total_sources = count;
    }

    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: OutcomeReport) {
        for entry in other.entries {
            self.add_outcome(entry);
        }
        for record in other.malformed {
            self.add_malformed(record.label, record.reason);
        }
        self.summary.total_sources += other.summary.total_sources;
    }

    /// Sort entries by label, then by violated section, for stable output
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            a.label.cmp(&b.label).then_with(|| {
                let section_a = a.violates().map(Violates::section).unwrap_or("");
                let section_b = b.violates().map(Violates::section).unwrap_or("");
                section_a.cmp(section_b)
            })
        });
        self.malformed.sort_by(|a, b| a.label.cmp(&b.label));
    }
}

impl Default for OutcomeReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(section: &str) -> CheckResult {
        CheckResult::failure(Violates::new(
            format!("violated {section}"),
            section,
            format!("https://example/spec#{section}"),
        ))
    }

    #[test]
    fn test_report_counts() {
        let mut report = OutcomeReport::new();
        report.add_outcome(OutcomeEntry::new("a.json", CheckResult::Success));
        report.add_outcome(OutcomeEntry::new("b.json", failure("4.1")));
        report.add_outcome(OutcomeEntry::new("c.json", failure("4.1")));
        report.add_outcome(OutcomeEntry::new("d.json", failure("3.1.4")));

        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 3);
        assert_eq!(report.summary.total_outcomes(), 4);
        assert!(report.has_failures());
        assert!(!report.is_clean());

        let by_section = report.failures_by_section();
        assert_eq!(by_section.get("4.1"), Some(&2));
        assert_eq!(by_section.get("3.1.4"), Some(&1));
    }

    #[test]
    fn test_malformed_makes_report_unclean() {
        let mut report = OutcomeReport::new();
        report.add_outcome(OutcomeEntry::new("a.json", CheckResult::Success));
        assert!(report.is_clean());

        report.add_malformed("b.json", "`violates` must be present when `success` is false");
        assert!(!report.has_failures());
        assert!(!report.is_clean());
        assert_eq!(report.summary.malformed, 1);
    }

    #[test]
    fn test_merge_and_sort() {
        let mut first = OutcomeReport::new();
        first.add_outcome(OutcomeEntry::new("z.json", failure("4.1")));
        first.set_sources_read(1);

        let mut second = OutcomeReport::new();
        second.add_outcome(OutcomeEntry::new("a.json", CheckResult::Success));
        second.add_malformed("m.json", "record is not a JSON object");
        second.set_sources_read(2);

        first.merge(second);
        first.sort_entries();

        assert_eq!(first.summary.total_sources, 3);
        assert_eq!(first.summary.passed, 1);
        assert_eq!(first.summary.failed, 1);
        assert_eq!(first.summary.malformed, 1);
        assert_eq!(first.entries[0].label, "a.json");
    }

    #[test]
    fn test_entry_with_claims() {
        let claims = CwtClaims::builder().issuer("DE").subject("holder").build().unwrap();
        let entry = OutcomeEntry::new("a.json", CheckResult::Success).with_claims(&claims);

        assert_eq!(entry.issuer.as_deref(), Some("DE"));
        assert_eq!(entry.subject.as_deref(), Some("holder"));
    }
}
