//! Validation results
//!
//! A [`ManifestResult`] is built step by step: every step consumes the
//! previous result and returns the next one, so partially-built results are
//! never shared.

use serde::Serialize;
use std::fmt;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// What part of the bundle a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// The bundle itself is missing or malformed
    InvalidBundle,
    /// The ClusterServiceVersion breaks a rule
    InvalidCsv,
}

/// A single error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub level: Level,

    pub kind: FindingKind,

    /// Human-readable explanation
    pub detail: String,

    /// The offending value, usually the CSV or bundle name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Finding {
    /// Error about the bundle structure
    pub fn invalid_bundle(detail: impl Into<String>, value: Option<String>) -> Self {
        Self {
            level: Level::Error,
            kind: FindingKind::InvalidBundle,
            detail: detail.into(),
            value,
        }
    }

    /// Error about the ClusterServiceVersion
    pub fn invalid_csv(detail: impl Into<String>, csv_name: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            kind: FindingKind::InvalidCsv,
            detail: detail.into(),
            value: Some(csv_name.into()),
        }
    }

    /// Warning about the ClusterServiceVersion
    pub fn warn_invalid_csv(detail: impl Into<String>, csv_name: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            ..Self::invalid_csv(detail, csv_name)
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: Value : ({}) {}", self.level, value, self.detail),
            None => write!(f, "{}: {}", self.level, self.detail),
        }
    }
}

/// Findings of one validator for one object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestResult {
    /// Name of the validated object
    pub name: String,

    pub errors: Vec<Finding>,

    pub warnings: Vec<Finding>,
}

impl ManifestResult {
    /// Create an empty result for the named object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Return a result with the finding appended to the list matching its level
    #[must_use]
    pub fn with_finding(mut self, finding: Finding) -> Self {
        match finding.level {
            Level::Error => self.errors.push(finding),
            Level::Warning => self.warnings.push(finding),
        }
        self
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the object passed without findings
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// All findings, errors first
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors.iter().chain(self.warnings.iter())
    }
}
