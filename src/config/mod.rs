//! Configuration loading and management for CWT Verdict
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to typed settings with defaults filled in
//! - Validation happens once at load time, consumers can trust the values afterwards
//! - A fingerprint identifies the configuration a report was produced with

use crate::domain::violations::{VerdictError, VerdictResult};
use crate::report::{OutputFormat, ReportOptions};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// File names looked up in the working directory when no config is given
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["cwt_verdict.yaml", "cwt_verdict.yml", ".cwt_verdict.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictConfig {
    /// Configuration format version
    pub version: String,
    /// Report rendering settings
    #[serde(default)]
    pub report: ReportSettings,
    /// Record loading settings
    #[serde(default)]
    pub loader: LoaderSettings,
}

/// Report rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Default output format name
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub use_colors: bool,
    /// Print the link of each violation
    #[serde(default = "default_true")]
    pub show_links: bool,
    /// Maximum number of failures to print
    #[serde(default)]
    pub max_failures: Option<usize>,
    /// Leave passing outcomes out of listings
    #[serde(default)]
    pub only_failures: bool,
}

/// Record loading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// File extensions picked up when a directory is given
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Record unreadable files as malformed instead of aborting
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
            use_colors: true,
            show_links: true,
            max_failures: None,
            only_failures: false,
        }
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            continue_on_error: false,
        }
    }
}

impl ReportSettings {
    /// Parsed output format
    pub fn output_format(&self) -> VerdictResult<OutputFormat> {
        OutputFormat::from_str(&self.format).ok_or_else(|| {
            VerdictError::config(format!(
                "Unknown report format '{}', expected one of: {}",
                self.format,
                OutputFormat::all_formats().join(", ")
            ))
        })
    }

    /// Formatter options derived from these settings
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            use_colors: self.use_colors,
            show_links: self.show_links,
            max_failures: self.max_failures,
            only_failures: self.only_failures,
        }
    }
}

impl VerdictConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> VerdictResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            VerdictError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            VerdictError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> VerdictResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| VerdictError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Look for one of the default config files in `dir`, falling back to defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> VerdictResult<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                tracing::debug!("Using configuration {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }
        Ok(Self::default())
    }

    /// Check the configuration for values the rest of the crate cannot work with
    pub fn validate(&self) -> VerdictResult<()> {
        if self.version != "1.0" {
            return Err(VerdictError::config(format!(
                "Unsupported configuration version '{}', expected '1.0'",
                self.version
            )));
        }

        self.report.output_format()?;

        if self.report.max_failures == Some(0) {
            return Err(VerdictError::config(
                "report.max_failures must be greater than zero when set",
            ));
        }

        if self.loader.extensions.is_empty() {
            return Err(VerdictError::config("loader.extensions must not be empty"));
        }

        for extension in &self.loader.extensions {
            if extension.is_empty() || extension.starts_with('.') {
                return Err(VerdictError::config(format!(
                    "Invalid extension '{extension}': use the bare name, e.g. 'json'"
                )));
            }
        }

        Ok(())
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> VerdictResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VerdictError::config(format!("Failed to serialize config: {e}")))
    }

    /// SHA-256 fingerprint of the configuration
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.version.as_bytes());
        hasher.update(self.report.format.as_bytes());
        hasher.update([
            self.report.use_colors as u8,
            self.report.show_links as u8,
            self.report.only_failures as u8,
            self.loader.continue_on_error as u8,
        ]);
        let max_failures = self.report.max_failures.map_or(0u64, |max| max as u64 + 1);
        hasher.update(max_failures.to_le_bytes());
        for extension in &self.loader.extensions {
            hasher.update(extension.as_bytes());
            hasher.update([0u8]);
        }

        format!("{:x}", hasher.finalize())
    }
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            report: ReportSettings::default(),
            loader: LoaderSettings::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "human".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "jsonl".to_string()]
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: VerdictConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: VerdictConfig::default(),
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.report.format = format.into();
        self
    }

    pub fn use_colors(mut self, enabled: bool) -> Self {
        self.config.report.use_colors = enabled;
        self
    }

    pub fn max_failures(mut self, max: usize) -> Self {
        self.config.report.max_failures = Some(max);
        self
    }

    pub fn only_failures(mut self, enabled: bool) -> Self {
        self.config.report.only_failures = enabled;
        self
    }

    pub fn add_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.loader.extensions.push(extension.into());
        self
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.config.loader.continue_on_error = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> VerdictResult<VerdictConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = VerdictConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.output_format().unwrap(), OutputFormat::Human);
    }

    #[test]
    fn test_load_minimal_yaml() {
        let config = VerdictConfig::load_from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, VerdictConfig::default());
    }

    #[test]
    fn test_load_full_yaml() {
        let yaml = r#"
version: "1.0"
report:
  format: github
  use_colors: false
  max_failures: 5
  only_failures: true
loader:
  extensions: [json]
  continue_on_error: true
"#;
        let config = VerdictConfig::load_from_str(yaml).unwrap();

        assert_eq!(config.report.output_format().unwrap(), OutputFormat::GitHub);
        assert!(config.report.show_links);
        assert_eq!(config.report.max_failures, Some(5));
        assert_eq!(config.loader.extensions, vec!["json".to_string()]);
        assert!(config.loader.continue_on_error);

        let options = config.report.report_options();
        assert!(!options.use_colors);
        assert!(options.only_failures);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(VerdictConfig::load_from_str("version: \"2.0\"\n").is_err());
        let unknown_format = "version: \"1.0\"\nreport:\n  format: xml\n";
        assert!(VerdictConfig::load_from_str(unknown_format).is_err());
        assert!(
            VerdictConfig::load_from_str("version: \"1.0\"\nreport:\n  max_failures: 0\n").is_err()
        );
        assert!(
            VerdictConfig::load_from_str("version: \"1.0\"\nloader:\n  extensions: [\".json\"]\n")
                .is_err()
        );
        assert!(ConfigBuilder::new().format("sarif").build().is_err());
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let base = VerdictConfig::default();
        assert_eq!(base.fingerprint(), VerdictConfig::default().fingerprint());
        assert_eq!(base.fingerprint().len(), 64);

        let changed = ConfigBuilder::new().max_failures(3).build().unwrap();
        assert_ne!(base.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_discover_config_file() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            VerdictConfig::discover(temp_dir.path()).unwrap(),
            VerdictConfig::default()
        );

        fs::write(
            temp_dir.path().join("cwt_verdict.yaml"),
            "version: \"1.0\"\nreport:\n  format: json\n",
        )
        .unwrap();
        let config = VerdictConfig::discover(temp_dir.path()).unwrap();
        assert_eq!(config.report.format, "json");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ConfigBuilder::new()
            .format("junit")
            .use_colors(false)
            .continue_on_error(true)
            .build()
            .unwrap();

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(VerdictConfig::load_from_str(&yaml).unwrap(), config);
        assert!(config.to_json().unwrap().contains("\"junit\""));
    }
}
