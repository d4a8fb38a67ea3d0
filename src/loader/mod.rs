//! Loading outcome records from JSON and JSON-lines sources
//!
//! Architecture: Domain Service - the loader turns files into an `OutcomeReport`
//! - A file that cannot be read or is not JSON is an operational error
//! - A record that is JSON but breaks the outcome contract is reported, not raised
//! - Files are read one after another in path order so reports are reproducible

use crate::config::LoaderSettings;
use crate::domain::report::{OutcomeEntry, OutcomeReport};
use crate::domain::violations::{VerdictError, VerdictResult};
use crate::domain::wire::WireOutcome;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Layout of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A single record or an array of records
    Json,
    /// One record per non-blank line
    JsonLines,
}

impl SourceKind {
    /// Pick the layout from the file extension, defaulting to plain JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") | Some("ndjson") => Self::JsonLines,
            _ => Self::Json,
        }
    }
}

/// Reads outcome records into reports
#[derive(Debug, Clone, Default)]
pub struct RecordLoader {
    settings: LoaderSettings,
}

impl RecordLoader {
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }

    /// Load every file named in `paths`, expanding directories one level deep
    pub async fn load_paths<P: AsRef<Path>>(&self, paths: &[P]) -> VerdictResult<OutcomeReport> {
        let start_time = Instant::now();
        let mut report = OutcomeReport::new();
        let files = self.collect_files(paths, &mut report).await?;

        tracing::debug!("Loading outcome records from {} files", files.len());

        for file in &files {
            match self.load_file(file).await {
                Ok(file_report) => report.merge(file_report),
                Err(e) => {
                    if !self.settings.continue_on_error {
                        return Err(e);
                    }
                    tracing::warn!("Failed to load {}: {}", file.display(), e);
                    report.add_malformed(file.display().to_string(), e.to_string());
                }
            }
        }

        report.set_sources_read(files.len());
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        Ok(report)
    }

    /// Load a single file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> VerdictResult<OutcomeReport> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            VerdictError::decode(path.display().to_string(), format!("failed to read file: {e}"))
        })?;

        let mut report = self.parse_content(
            &path.display().to_string(),
            &content,
            SourceKind::from_path(path),
        )?;
        report.set_sources_read(1);
        Ok(report)
    }

    /// Parse already-read content into a report
    pub fn parse_content(
        &self,
        label: &str,
        content: &str,
        kind: SourceKind,
    ) -> VerdictResult<OutcomeReport> {
        let mut report = OutcomeReport::new();

        match kind {
            SourceKind::JsonLines => {
                for (index, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let record_label = format!("{}:{}", label, index + 1);
                    let value: JsonValue = serde_json::from_str(line)
                        .map_err(|e| VerdictError::decode(&record_label, e.to_string()))?;
                    add_record(&mut report, record_label, value);
                }
            }
            SourceKind::Json => {
                let value: JsonValue = serde_json::from_str(content)
                    .map_err(|e| VerdictError::decode(label, e.to_string()))?;
                match value {
                    JsonValue::Array(records) => {
                        for (index, record) in records.into_iter().enumerate() {
                            add_record(&mut report, format!("{label}#{index}"), record);
                        }
                    }
                    record => add_record(&mut report, label.to_string(), record),
                }
            }
        }

        Ok(report)
    }

    /// Expand every path into the files to load, sorted by path within a directory.
    ///
    /// With `continue_on_error`, a path that cannot be accessed or listed is recorded in
    /// `report` as malformed and skipped.
    async fn collect_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        report: &mut OutcomeReport,
    ) -> VerdictResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match self.expand_path(path).await {
                Ok(found) => files.extend(found),
                Err(e) => {
                    if !self.settings.continue_on_error {
                        return Err(e);
                    }
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    report.add_malformed(path.display().to_string(), e.to_string());
                }
            }
        }

        Ok(files)
    }

    /// A file stands for itself; a directory yields its matching files
    async fn expand_path(&self, path: &Path) -> VerdictResult<Vec<PathBuf>> {
        let label = path.display().to_string();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| VerdictError::decode(&label, format!("cannot access path: {e}")))?;

        if !metadata.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let list_error = |e: std::io::Error| {
            VerdictError::decode(&label, format!("cannot list directory: {e}"))
        };
        let mut found = Vec::new();
        let mut dir = tokio::fs::read_dir(path).await.map_err(list_error)?;
        while let Some(entry) = dir.next_entry().await.map_err(list_error)? {
            let candidate = entry.path();
            let file_type = entry.file_type().await.map_err(list_error)?;
            if file_type.is_file() && self.has_wanted_extension(&candidate) {
                found.push(candidate);
            }
        }
        found.sort();
        tracing::debug!("{} matching files in {}", found.len(), path.display());
        Ok(found)
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.settings.extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false)
    }
}

fn add_record(report: &mut OutcomeReport, label: String, value: JsonValue) {
    match WireOutcome::from_value(value, &label) {
        Ok(outcome) => {
            let mut entry = OutcomeEntry::new(label, outcome.as_check());
            if let Some(claims) = outcome.cwt_claims() {
                entry = entry.with_claims(claims);
            }
            report.add_outcome(entry);
        }
        Err(e) => {
            tracing::debug!("Malformed record {}: {}", label, e);
            report.add_malformed(label, e.to_string());
        }
    }
}
