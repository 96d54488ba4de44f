//! Rule normalizer and validator.
//!
//! `normalize_routes` copies a rule list, anchors every `src`, and checks
//! the whole list in one left-to-right pass:
//!
//! - phase markers: no sibling keys, a known `handle`, each handle once
//! - source rules: a non-empty `src` that compiles after normalization
//! - phase invariants for rules following `hit` and `miss`
//!
//! Every finding is collected. Invalid rules are still returned.

mod phase;
mod src;

pub use phase::PhaseState;
pub use src::{check_regex, normalize_src, validate_src};

use crate::error::{ErrorCode, Finding, RuleError};
use crate::rule::{Rule, SourceRule};

/// Summary used for findings raised while normalizing a rule list.
pub const INVALID_ROUTES: &str = "One or more invalid routes were found";

/// A rule list paired with the validation error for it, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// The rules. `None` when there was nothing to compile.
    pub rules: Option<Vec<Rule>>,
    /// Every problem found, or `None` when the rules are valid.
    pub error: Option<RuleError>,
}

impl Normalized {
    /// Valid rules.
    pub fn ok(rules: Vec<Rule>) -> Self {
        Self {
            rules: Some(rules),
            error: None,
        }
    }

    /// Rules accompanied by an error.
    pub fn failed(rules: Option<Vec<Rule>>, error: RuleError) -> Self {
        Self {
            rules,
            error: Some(error),
        }
    }

    /// Whether an error was reported.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a `Result`, dropping the rules when there is an error.
    pub fn into_result(self) -> std::result::Result<Option<Vec<Rule>>, RuleError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.rules),
        }
    }
}

/// Accumulator for the scan over a rule list.
#[derive(Debug, Default)]
struct Scan {
    phase: PhaseState,
    rules: Vec<Rule>,
    findings: Vec<Finding>,
}

impl Scan {
    fn step(mut self, rule: &Rule) -> Self {
        match rule {
            Rule::Handle(handler) => {
                let (phase, findings) = self.phase.observe(handler);
                self.phase = phase;
                self.findings.extend(findings);
                self.rules.push(Rule::Handle(handler.clone()));
            }
            Rule::Source(source) if source.src.is_empty() => {
                self.findings
                    .push(Finding::new("A route must set either handle or src"));
                self.rules.push(Rule::Source(source.clone()));
            }
            Rule::Source(source) => {
                let normalized = SourceRule {
                    src: normalize_src(&source.src),
                    ..source.clone()
                };
                tracing::trace!(src = normalized.src.as_str(), "normalized src");

                self.findings.extend(validate_src(&normalized.src));
                self.findings.extend(self.phase.check(&normalized));
                self.rules.push(Rule::Source(normalized));
            }
        }
        self
    }
}

/// Normalize and validate a rule list.
///
/// `None` stays `None` and an empty list stays empty, both without error.
pub fn normalize_routes(rules: Option<&[Rule]>) -> Normalized {
    let Some(rules) = rules else {
        return Normalized::default();
    };

    let scan = rules.iter().fold(Scan::default(), Scan::step);
    for finding in &scan.findings {
        tracing::debug!(message = finding.message.as_str(), "invalid route");
    }

    Normalized {
        rules: Some(scan.rules),
        error: RuleError::from_findings(ErrorCode::InvalidRoutes, INVALID_ROUTES, scan.findings),
    }
}
