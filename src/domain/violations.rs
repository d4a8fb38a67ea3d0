//! Core domain models for rule violations and operational errors
//!
//! Architecture: Value Objects - a violation is an immutable record produced by a validator
//! - The validator that detects the violation owns the decision, this crate only carries it
//! - Violations travel inside failure outcomes, never as `Err` values
//! - Operational problems (files, config, malformed records) use `VerdictError` instead

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule violation detected while validating CWT claims
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violates {
    /// Human-readable description of the violation
    pub message: String,
    /// Identifier of the rule or specification section that was violated
    pub section: String,
    /// Reference locator for the violated rule, usually a documentation URL
    pub link: String,
}

impl Violates {
    /// Create a new violation record
    pub fn new(
        message: impl Into<String>,
        section: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            section: section.into(),
            link: link.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

impl fmt::Display for Violates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (section {}, {})", self.message, self.section, self.link)
    }
}

/// Error types that can occur while loading, decoding or reporting outcomes
#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Content of a source could not be decoded as JSON
    #[error("Decode error in {source_label}: {message}")]
    Decode { source_label: String, message: String },

    /// A record breaks the success/payload pairing contract
    #[error("Contract violation: {message}")]
    Contract { message: String },

    /// A claim value does not fit its registered claim
    #[error("Claims error: {message}")]
    Claims { message: String },

    /// Report rendering failed
    #[error("Report error: {message}")]
    Report { message: String },
}

impl VerdictError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error for a given source
    pub fn decode(source_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            source_label: source_label.into(),
            message: message.into(),
        }
    }

    /// Create a contract error
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    /// Create a claims error
    pub fn claims(message: impl Into<String>) -> Self {
        Self::Claims {
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }
}

/// Result type for crate operations
pub type VerdictResult<T> = Result<T, VerdictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violates_creation() {
        let violates = Violates::new("Missing issuer", "4.1", "https://example/spec#4.1");

        assert_eq!(violates.message(), "Missing issuer");
        assert_eq!(violates.section(), "4.1");
        assert_eq!(violates.link(), "https://example/spec#4.1");
    }

    #[test]
    fn test_violates_display() {
        let violates = Violates::new("Token expired", "3.1.4", "rfc8392#section-3.1.4");

        assert_eq!(
            violates.to_string(),
            "Token expired (section 3.1.4, rfc8392#section-3.1.4)"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = VerdictError::decode("records.json", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "Decode error in records.json: expected value at line 1"
        );

        let err = VerdictError::contract("`violates` must be null when `success` is true");
        assert!(err.to_string().starts_with("Contract violation:"));

        let err = VerdictError::claims("claim `exp` must be an integer NumericDate");
        assert_eq!(
            err.to_string(),
            "Claims error: claim `exp` must be an integer NumericDate"
        );
    }
}
