//! Phase tracking while scanning a rule list.

use crate::error::Finding;
use crate::rule::{Handler, Phase, SourceRule};

/// Phase state threaded through the scan.
///
/// Only phase markers change it; source rules are checked against the phase
/// in effect before them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseState {
    /// Every `handle` value seen so far, as written.
    seen: Vec<String>,
    /// Phase selected by the last accepted marker.
    active: Option<Phase>,
}

impl PhaseState {
    /// Phase currently in effect.
    pub fn active(&self) -> Option<Phase> {
        self.active
    }

    /// Whether a `handle` value has been seen.
    pub fn has_seen(&self, handle: &str) -> bool {
        self.seen.iter().any(|h| h == handle)
    }

    /// Record a phase marker, returning the next state and any findings.
    ///
    /// A repeated marker is reported and leaves the state unchanged.
    pub fn observe(mut self, handler: &Handler) -> (Self, Vec<Finding>) {
        let handle = handler.handle.as_str();
        let mut findings = Vec::new();

        if !handler.extra.is_empty() {
            findings.push(
                Finding::new(format!(
                    "Cannot have any other keys when handle is used (handle: {})",
                    handle
                ))
                .with_handle(handle),
            );
        }

        let phase = handler.phase();
        if phase.is_none() {
            findings.push(
                Finding::new(format!("This is not a valid handler (handle: {})", handle))
                    .with_handle(handle),
            );
        }

        if self.has_seen(handle) {
            findings.push(
                Finding::new(format!(
                    "You can only handle something once (handle: {})",
                    handle
                ))
                .with_handle(handle),
            );
        } else {
            self.seen.push(handle.to_string());
            self.active = phase;
        }

        (self, findings)
    }

    /// Check a source rule against the active phase.
    pub fn check(&self, rule: &SourceRule) -> Vec<Finding> {
        let Some(phase) = self.active else {
            return Vec::new();
        };

        let mut messages = Vec::new();
        match phase {
            Phase::Filesystem => {}
            Phase::Hit => {
                if rule.dest.is_some() {
                    messages.push(r#"You cannot assign "dest" after "handle: hit""#);
                }
                if rule.status.is_some() {
                    messages.push(r#"You cannot assign "status" after "handle: hit""#);
                }
                if !rule.continue_ {
                    messages.push(r#"You must assign "continue: true" after "handle: hit""#);
                }
            }
            Phase::Miss => {
                if rule.dest.is_some() && !rule.check {
                    messages.push(r#"You must assign "check: true" after "handle: miss""#);
                } else if rule.dest.is_none() && !rule.continue_ {
                    messages.push(r#"You must assign "continue: true" after "handle: miss""#);
                }
            }
        }

        messages
            .into_iter()
            .map(|message| {
                Finding::new(message)
                    .with_handle(phase.name())
                    .with_src(rule.src.as_str())
            })
            .collect()
    }
}
