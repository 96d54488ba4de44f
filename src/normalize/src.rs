//! `src` normalization and regex validation.

use crate::error::{Error, Finding, Result};

/// Anchor `src` and strip escaped forward slashes.
///
/// Idempotent: normalizing an already normalized `src` returns it unchanged.
pub fn normalize_src(src: &str) -> String {
    let mut normalized = String::with_capacity(src.len() + 2);
    if !src.starts_with('^') {
        normalized.push('^');
    }
    normalized.push_str(src);
    if !src.ends_with('$') {
        normalized.push('$');
    }
    normalized.replace("\\/", "/")
}

/// Check that `src` compiles as a regular expression.
///
/// Lookaround (`(?!general)`) is accepted.
pub fn check_regex(src: &str) -> Result<()> {
    fancy_regex::Regex::new(src)
        .map(|_| ())
        .map_err(|e| Error::RegexCompile {
            pattern: src.to_string(),
            source: Box::new(e),
        })
}

/// Validate a normalized `src`, reporting failure as a finding.
pub fn validate_src(src: &str) -> Option<Finding> {
    match check_regex(src) {
        Ok(()) => None,
        Err(e) => {
            tracing::trace!(src = src, error = %e, "src does not compile");
            Some(Finding::new(format!("Invalid regular expression: \"{}\"", src)).with_src(src))
        }
    }
}
