use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationReport;

/// Core error type shared across datamint crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema file does not exist.
    #[error("schema file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Failure while reading the schema file.
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    /// The schema file is not valid JSON.
    #[error("invalid JSON in schema file: {0}")]
    Json(#[from] serde_json::Error),
    /// The document violates the structural contract.
    #[error("invalid schema document: {0}")]
    InvalidDocument(ValidationReport),
    /// The template contains a malformed directive.
    #[error("invalid template: {0}")]
    Template(#[from] DirectiveError),
    /// The document JSON Schema could not be compiled.
    #[error("json schema error: {0}")]
    Schema(String),
}

/// Convenience alias for results returned by datamint crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`DirectiveError`], for callers that branch on
/// the failure kind rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveErrorKind {
    MalformedDirective,
    UnresolvableProviderPath,
    NonCallableProviderPath,
    ProviderFailed,
    DepthExceeded,
}

/// Failure while compiling or resolving a template node.
///
/// `location` is the JSON pointer of the offending node; it is empty for the
/// template root.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectiveError {
    #[error("{message}{}", at(.location))]
    Malformed { location: String, message: String },
    #[error(
        "Invalid faker method path: \"{path}\". \"{segment}\" does not exist.{}",
        at(.location)
    )]
    UnresolvableProviderPath {
        location: String,
        path: String,
        segment: String,
    },
    #[error(
        "Faker path \"{path}\" does not resolve to a callable method.{}",
        at(.location)
    )]
    NonCallableProviderPath { location: String, path: String },
    #[error("faker \"{path}\" failed: {message}{}", at(.location))]
    ProviderFailed {
        location: String,
        path: String,
        message: String,
    },
    #[error("template nesting exceeds the maximum depth of {limit}{}", at(.location))]
    DepthExceeded { location: String, limit: usize },
}

impl DirectiveError {
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DirectiveErrorKind {
        match self {
            Self::Malformed { .. } => DirectiveErrorKind::MalformedDirective,
            Self::UnresolvableProviderPath { .. } => DirectiveErrorKind::UnresolvableProviderPath,
            Self::NonCallableProviderPath { .. } => DirectiveErrorKind::NonCallableProviderPath,
            Self::ProviderFailed { .. } => DirectiveErrorKind::ProviderFailed,
            Self::DepthExceeded { .. } => DirectiveErrorKind::DepthExceeded,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Self::Malformed { location, .. }
            | Self::UnresolvableProviderPath { location, .. }
            | Self::NonCallableProviderPath { location, .. }
            | Self::ProviderFailed { location, .. }
            | Self::DepthExceeded { location, .. } => location,
        }
    }
}

fn at(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" (at {location})")
    }
}
