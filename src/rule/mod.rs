//! Low-level routing rules.
//!
//! A compiled route list is a sequence of [`Rule`]s evaluated in order by the
//! edge matcher:
//!
//! ```text
//! { "src": "^/help$", "headers": { "Location": "/support" }, "status": 302 }
//! { "handle": "filesystem" }
//! { "src": "^/v1$", "dest": "/v2/api.py", "check": true }
//! ```
//!
//! A rule is either a phase marker ([`Handler`]) or a pattern rule
//! ([`SourceRule`]). Which fields are valid together is settled by the type;
//! the phase-dependent constraints are checked by [`crate::normalize`].

mod phase;

pub use phase::Phase;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One element of a routing rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    /// Phase marker: `{ "handle": "filesystem" }`.
    Handle(Handler),
    /// Pattern rule: `{ "src": "^/about$", ... }`.
    Source(SourceRule),
}

impl Rule {
    /// Create a phase marker.
    pub fn handle(phase: Phase) -> Self {
        Rule::Handle(Handler::new(phase))
    }

    /// Get the source rule, if this is one.
    pub fn as_source(&self) -> Option<&SourceRule> {
        match self {
            Rule::Source(rule) => Some(rule),
            Rule::Handle(_) => None,
        }
    }

    /// Get the phase marker, if this is one.
    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Rule::Handle(handler) => Some(handler),
            Rule::Source(_) => None,
        }
    }
}

impl From<SourceRule> for Rule {
    fn from(rule: SourceRule) -> Self {
        Rule::Source(rule)
    }
}

/// A `handle` phase marker.
///
/// The value is kept as written so an unknown handle can be reported rather
/// than rejected at deserialization. Sibling keys are captured in `extra`
/// for the same reason: a marker must carry nothing but `handle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    /// The `handle` value (`filesystem`, `hit` or `miss` when valid).
    pub handle: String,
    /// Any other keys found next to `handle`.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Handler {
    /// Create a marker for a phase.
    pub fn new(phase: Phase) -> Self {
        Self {
            handle: phase.name().to_string(),
            extra: BTreeMap::new(),
        }
    }

    /// The phase this marker selects, if the value is a known one.
    pub fn phase(&self) -> Option<Phase> {
        Phase::from_name(&self.handle)
    }
}

/// A pattern-matching rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRule {
    /// Regular expression matched against the request path.
    #[serde(default)]
    pub src: String,
    /// Destination the request is routed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Response headers to set, in declaration order. `$N` references captures from `src`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    /// HTTP methods this rule applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    /// Response status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Keep evaluating later rules after this one matches.
    #[serde(rename = "continue", default, skip_serializing_if = "is_false")]
    pub continue_: bool,
    /// Re-run the pipeline against the produced destination.
    #[serde(default, skip_serializing_if = "is_false")]
    pub check: bool,
}

impl SourceRule {
    /// Create a rule matching `src` with no action.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    /// Create a redirect rule setting `Location`.
    pub fn redirect(src: impl Into<String>, location: impl Into<String>, status: u16) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Location".to_string(), location.into());
        Self {
            src: src.into(),
            headers: Some(headers),
            status: Some(status),
            ..Self::default()
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_handler() {
        let rule: Rule = serde_json::from_value(json!({ "handle": "filesystem" })).unwrap();
        let handler = rule.as_handler().unwrap();
        assert_eq!(handler.phase(), Some(Phase::Filesystem));
        assert!(handler.extra.is_empty());
    }

    #[test]
    fn test_deserialize_handler_keeps_extra_keys() {
        let rule: Rule =
            serde_json::from_value(json!({ "handle": "filesystem", "illegal": true })).unwrap();
        let handler = rule.as_handler().unwrap();
        assert_eq!(handler.extra.get("illegal"), Some(&json!(true)));
    }

    #[test]
    fn test_deserialize_unknown_handle() {
        let rule: Rule = serde_json::from_value(json!({ "handle": "doesnotexist" })).unwrap();
        assert_eq!(rule.as_handler().unwrap().phase(), None);
    }

    #[test]
    fn test_deserialize_source_rule() {
        let rule: Rule = serde_json::from_value(json!({
            "src": "^/blog$",
            "methods": ["GET"],
            "headers": { "Cache-Control": "no-cache" },
            "dest": "/blog",
            "continue": true
        }))
        .unwrap();

        let source = rule.as_source().unwrap();
        assert_eq!(source.src, "^/blog$");
        assert_eq!(source.dest.as_deref(), Some("/blog"));
        assert_eq!(source.methods, Some(vec!["GET".to_string()]));
        assert!(source.continue_);
        assert!(!source.check);
    }

    #[test]
    fn test_headers_keep_declaration_order() {
        let input = r#"{"src":"^/$","headers":{"x-b":"2","x-a":"1","Cache-Control":"no-cache"}}"#;
        let rule: Rule = serde_json::from_str(input).unwrap();
        assert_eq!(serde_json::to_string(&rule).unwrap(), input);
    }

    #[test]
    fn test_serialize_omits_unset_fields() {
        let rule = Rule::from(SourceRule::redirect("^/help$", "/support", 302));
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({ "src": "^/help$", "headers": { "Location": "/support" }, "status": 302 })
        );

        assert_eq!(
            serde_json::to_value(Rule::handle(Phase::Miss)).unwrap(),
            json!({ "handle": "miss" })
        );
    }

    #[test]
    fn test_unknown_source_field_rejected() {
        let result: Result<Rule, _> = serde_json::from_value(json!({ "doesNotExist": true }));
        assert!(result.is_err());
    }
}
