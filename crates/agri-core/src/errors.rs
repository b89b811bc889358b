//! Structured error types shared across the planning crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`AgriError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, periods).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the planning pipeline.
///
/// `NotFound` and `Validation` describe caller mistakes or missing data. The
/// remaining families are unrecoverable for the current operation and are
/// propagated without retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum AgriError {
    /// Missing location, crop, climate history or model artifact.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Malformed input: seed windows, driver sequences, chromosomes, configs.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// Failure while fitting a forecaster or a yield model.
    #[error("training error: {0}")]
    Training(ErrorInfo),
    /// Failure while scoring a schedule candidate.
    #[error("evaluation error: {0}")]
    Evaluation(ErrorInfo),
    /// Failure in a persistence collaborator.
    #[error("storage error: {0}")]
    Storage(ErrorInfo),
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

impl AgriError {
    /// Shorthand for a [`AgriError::NotFound`] error.
    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        AgriError::NotFound(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`AgriError::Validation`] error.
    pub fn validation(code: &str, message: impl Into<String>) -> Self {
        AgriError::Validation(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            AgriError::NotFound(info)
            | AgriError::Validation(info)
            | AgriError::Training(info)
            | AgriError::Evaluation(info)
            | AgriError::Storage(info)
            | AgriError::Serde(info) => info,
        }
    }

    /// Whether the error belongs to the unrecoverable families.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AgriError::NotFound(_) | AgriError::Validation(_))
    }

    /// Appends a context entry to the payload, keeping the family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            AgriError::NotFound(info) => AgriError::NotFound(info.with_context(key, value)),
            AgriError::Validation(info) => AgriError::Validation(info.with_context(key, value)),
            AgriError::Training(info) => AgriError::Training(info.with_context(key, value)),
            AgriError::Evaluation(info) => AgriError::Evaluation(info.with_context(key, value)),
            AgriError::Storage(info) => AgriError::Storage(info.with_context(key, value)),
            AgriError::Serde(info) => AgriError::Serde(info.with_context(key, value)),
        }
    }
}
