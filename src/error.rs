//! Error types for zentinel-routes.
//!
//! Two layers live here:
//!
//! - [`Error`] is for faults: a pattern that cannot be tokenized, a regex that
//!   does not compile, malformed JSON, a config file that cannot be read.
//! - [`RuleError`] is the *value* returned next to a rule list when user
//!   configuration is invalid. It keeps every [`Finding`] and only joins them
//!   into a bulleted message when presented.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zentinel-routes operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A `source` path pattern could not be tokenized.
    #[error("invalid source pattern '{pattern}' at {position}: {message}")]
    Pattern {
        /// The pattern as written by the user.
        pattern: String,
        /// Character offset of the offending token.
        position: usize,
        /// Human-readable error message.
        message: String,
    },

    /// A compiled `src` is not a valid regular expression.
    #[error("invalid regex pattern '{pattern}': {source}")]
    RegexCompile {
        /// The pattern that failed to compile.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: Box<fancy_regex::Error>,
    },

    /// The configuration document is not valid JSON.
    #[error("failed to parse routing configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Compiled rules could not be written as JSON.
    #[error("failed to serialize compiled rules: {0}")]
    Output(#[source] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to load config file {path}: {source}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A glob pattern given on the command line is invalid.
    #[error("invalid glob pattern '{pattern}': {message}")]
    Glob {
        /// The glob pattern.
        pattern: String,
        /// Error message.
        message: String,
    },

    /// The configuration compiled with validation findings.
    #[error(transparent)]
    Rules(#[from] RuleError),
}

impl Error {
    /// Create a pattern error at a character offset.
    pub fn pattern(pattern: &str, position: usize, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.to_string(),
            position,
            message: message.into(),
        }
    }

    /// Convert a fault raised while compiling a feature `source` into a finding
    /// that keeps the offending source string.
    pub fn into_source_finding(self, source: &str) -> Finding {
        let message = match &self {
            Error::RegexCompile { .. } => format!("Invalid regular expression: \"{}\"", source),
            Error::Pattern {
                position, message, ..
            } => format!(
                "Invalid source pattern: \"{}\" ({} at {})",
                source, message, position
            ),
            other => other.to_string(),
        };
        Finding::new(message).with_source(source)
    }
}

/// Error code attached to a [`RuleError`].
///
/// The composer re-tags validation errors with the code of the feature that
/// produced them so callers can point users at the right configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `cleanUrls` produced invalid rules.
    InvalidCleanUrls,
    /// `trailingSlash` produced invalid rules.
    InvalidTrailingSlash,
    /// `redirects` is invalid.
    InvalidRedirects,
    /// `headers` is invalid.
    InvalidHeaders,
    /// `rewrites` is invalid.
    InvalidRewrites,
    /// A low-level rule list is invalid.
    InvalidRoutes,
    /// Mutually exclusive configuration keys were combined.
    InvalidKeys,
}

impl ErrorCode {
    /// Get the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCleanUrls => "invalid_clean_urls",
            ErrorCode::InvalidTrailingSlash => "invalid_trailing_slash",
            ErrorCode::InvalidRedirects => "invalid_redirects",
            ErrorCode::InvalidHeaders => "invalid_headers",
            ErrorCode::InvalidRewrites => "invalid_rewrites",
            ErrorCode::InvalidRoutes => "invalid_routes",
            ErrorCode::InvalidKeys => "invalid_keys",
        }
    }

    /// Map a top-level configuration key to the code used for its errors.
    pub fn for_key(key: &str) -> Self {
        match key {
            "cleanUrls" => ErrorCode::InvalidCleanUrls,
            "trailingSlash" => ErrorCode::InvalidTrailingSlash,
            "redirects" => ErrorCode::InvalidRedirects,
            "headers" => ErrorCode::InvalidHeaders,
            "rewrites" => ErrorCode::InvalidRewrites,
            "routes" => ErrorCode::InvalidRoutes,
            _ => ErrorCode::InvalidKeys,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single validation problem, with whatever context identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Finding {
    /// Human-readable description.
    pub message: String,
    /// The `handle` value of the offending phase marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// The (normalized) `src` of the offending rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// The user-written `source` of the offending redirect/rewrite/header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Location inside the configuration document (e.g. `redirects[0].source`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Finding {
    /// Create a finding with no context.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach the offending `handle` value.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Attach the offending `src`.
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Attach the offending `source`.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a document path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Aggregated validation error returned by the normalizer and composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleError {
    /// Error code, re-tagged per feature by the composer.
    pub code: ErrorCode,
    /// Generic description, without the per-finding lines.
    pub summary: String,
    /// Every finding, in the order it was discovered.
    pub errors: Vec<Finding>,
}

impl RuleError {
    /// Build an error from findings. Returns `None` when there are none.
    pub fn from_findings(
        code: ErrorCode,
        summary: impl Into<String>,
        errors: Vec<Finding>,
    ) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        Some(Self {
            code,
            summary: summary.into(),
            errors,
        })
    }

    /// Replace the error code, keeping summary and findings.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// The user-facing message: summary followed by one `- ` line per finding.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.summary)?;
        for finding in &self.errors {
            write!(f, "\n- {}", finding.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleError {}

impl Serialize for RuleError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RuleError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}
