//! Structured error types shared across WMP validation crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`WmpError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, nuclide names, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the validation engine.
///
/// Variants are grouped by how far a failure propagates: `Config` aborts a
/// whole batch before any nuclide is touched, everything else aborts at most
/// the nuclide being processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum WmpError {
    /// Missing or invalid directories and explicit file targets.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Per-nuclide preconditions such as a missing reference file.
    #[error("precondition error: {0}")]
    Precondition(ErrorInfo),
    /// Reference data does not contain the requested temperature label.
    #[error("missing temperature: {0}")]
    MissingTemperature(ErrorInfo),
    /// Energy bounds or grid size rejected by the grid builder.
    #[error("invalid range: {0}")]
    InvalidRange(ErrorInfo),
    /// Malformed persisted data or mismatched array lengths.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Nuclide identity could not be derived.
    #[error("identity error: {0}")]
    Identity(ErrorInfo),
    /// A validation run attempted an out-of-order transition.
    #[error("state error: {0}")]
    State(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl WmpError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            WmpError::Config(info)
            | WmpError::Precondition(info)
            | WmpError::MissingTemperature(info)
            | WmpError::InvalidRange(info)
            | WmpError::Data(info)
            | WmpError::Identity(info)
            | WmpError::State(info)
            | WmpError::Io(info)
            | WmpError::Serde(info) => info,
        }
    }

    /// Returns true when the error must abort the whole batch rather than a
    /// single nuclide.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WmpError::Config(_))
    }

    /// Wraps a filesystem failure with the offending path.
    pub fn io(code: &str, path: &std::path::Path, err: impl ToString) -> Self {
        WmpError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
