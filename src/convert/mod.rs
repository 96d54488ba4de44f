//! Feature converters.
//!
//! Each high-level feature compiles to a plain list of [`SourceRule`]s:
//!
//! - [`convert_clean_urls`] - two fixed redirects dropping `.html` / `index`
//! - [`convert_trailing_slash`] - one fixed redirect adding or removing `/`
//! - [`convert_redirects`] - `Location` + `status` rules
//! - [`convert_headers`] - `headers` + `continue` rules
//! - [`convert_rewrites`] - `dest` + `check` rules
//!
//! The pattern-based converters check every `source` eagerly and report the
//! offending ones as findings. Phase checks are left to the normalizer.

mod clean_urls;
mod headers;
mod redirects;
mod rewrites;
mod trailing_slash;

pub use clean_urls::{convert_clean_urls, get_clean_urls, CleanUrl};
pub use headers::convert_headers;
pub use redirects::{convert_redirects, DEFAULT_REDIRECT_STATUS};
pub use rewrites::convert_rewrites;
pub use trailing_slash::convert_trailing_slash;

use crate::error::Finding;
use crate::normalize::{check_regex, normalize_src};
use crate::pattern::{source_to_regex, CompiledSource};
use crate::rule::SourceRule;

/// Status used by the fixed clean-URL and trailing-slash redirects.
pub const PERMANENT_REDIRECT: u16 = 308;

/// Rules produced by a pattern-based converter, or every bad `source`.
pub type Converted = std::result::Result<Vec<SourceRule>, Vec<Finding>>;

/// Compile one `source`, checking that the anchored result is a valid regex.
fn compile_source(source: &str) -> std::result::Result<CompiledSource, Finding> {
    let compiled = source_to_regex(source).map_err(|e| e.into_source_finding(source))?;
    check_regex(&normalize_src(&compiled.src)).map_err(|e| e.into_source_finding(source))?;
    Ok(compiled)
}

/// Compile every entry, collecting all failures before giving up.
fn convert_each<T>(
    key: &str,
    entries: &[T],
    source: impl Fn(&T) -> &str,
    build: impl Fn(&T, CompiledSource) -> SourceRule,
) -> Converted {
    let mut rules = Vec::with_capacity(entries.len());
    let mut findings = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        match compile_source(source(entry)) {
            Ok(compiled) => rules.push(build(entry, compiled)),
            Err(finding) => findings.push(finding.with_path(format!("{}[{}].source", key, i))),
        }
    }

    if findings.is_empty() {
        Ok(rules)
    } else {
        Err(findings)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::normalize::normalize_src;
    use crate::rule::SourceRule;

    /// Assert which paths each rule's `src` matches.
    pub fn assert_matches(rules: &[SourceRule], must_match: &[&[&str]], must_not_match: &[&[&str]]) {
        for (i, rule) in rules.iter().enumerate() {
            let src = normalize_src(&rule.src);
            let regex = fancy_regex::Regex::new(&src).unwrap();
            for path in must_match.get(i).copied().unwrap_or_default() {
                assert!(regex.is_match(path).unwrap(), "{} should match {}", src, path);
            }
            for path in must_not_match.get(i).copied().unwrap_or_default() {
                assert!(!regex.is_match(path).unwrap(), "{} should not match {}", src, path);
            }
        }
    }
}
