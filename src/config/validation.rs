//! Configuration validation.
//!
//! # Responsibilities
//! - Shape checks over raw JSON: types, required and unknown properties
//! - Size ceilings over typed values: list lengths, string lengths, status ranges
//!
//! # Design Decisions
//! - Every problem in a key is reported, not just the first
//! - Findings are attributed to the configuration key they belong to; the
//!   first failing key in composition order wins
//! - Unknown properties get a suggestion when they look like a common typo

use crate::error::{ErrorCode, Finding, RuleError};
use crate::rule::Rule;
use serde_json::{Map, Value};

use super::schema::RoutingConfig;

/// Maximum items in any rule, redirect, rewrite or header list.
pub const MAX_ITEMS: usize = 1024;
/// Maximum length of patterns, destinations and header keys/values.
pub const MAX_STRING: usize = 4096;
/// Maximum length of a route header name.
pub const MAX_HEADER_NAME: usize = 256;
/// Maximum headers set by one route.
pub const MAX_ROUTE_HEADERS: usize = 100;
/// Maximum methods listed on one route.
pub const MAX_METHODS: usize = 10;
/// Maximum length of a method name.
pub const MAX_METHOD: usize = 32;
/// Maximum length of a `handle` value.
pub const MAX_HANDLE: usize = 32;
/// Smallest accepted status code.
pub const MIN_STATUS: u16 = 100;
/// Largest accepted status code.
pub const MAX_STATUS: u16 = 999;

/// Keys checked, in composition order.
const KEYS: &[&str] = &[
    "routes",
    "cleanUrls",
    "trailingSlash",
    "redirects",
    "headers",
    "rewrites",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Object,
    Array,
    String,
    Boolean,
    Status,
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::Status => "integer",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Kind::Object => value.is_object(),
            Kind::Array => value.is_array(),
            Kind::String => value.is_string(),
            Kind::Boolean => value.is_boolean(),
            Kind::Status => value.is_i64() || value.is_u64(),
        }
    }
}

/// Allowed properties of one object type.
struct ObjectShape {
    required: &'static [&'static str],
    properties: &'static [(&'static str, Kind)],
    suggestions: &'static [(&'static str, &'static str)],
}

const ROUTE: ObjectShape = ObjectShape {
    required: &[],
    properties: &[
        ("src", Kind::String),
        ("dest", Kind::String),
        ("methods", Kind::Array),
        ("headers", Kind::Object),
        ("handle", Kind::String),
        ("continue", Kind::Boolean),
        ("check", Kind::Boolean),
        ("status", Kind::Status),
    ],
    suggestions: &[
        ("source", "src"),
        ("destination", "dest"),
        ("header", "headers"),
        ("method", "methods"),
    ],
};

const REDIRECT: ObjectShape = ObjectShape {
    required: &["source", "destination"],
    properties: &[
        ("source", Kind::String),
        ("destination", Kind::String),
        ("statusCode", Kind::Status),
    ],
    suggestions: &[
        ("src", "source"),
        ("dest", "destination"),
        ("status", "statusCode"),
    ],
};

const REWRITE: ObjectShape = ObjectShape {
    required: &["source", "destination"],
    properties: &[("source", Kind::String), ("destination", Kind::String)],
    suggestions: &[("src", "source"), ("dest", "destination")],
};

const HEADER_SOURCE: ObjectShape = ObjectShape {
    required: &["source", "headers"],
    properties: &[("source", Kind::String), ("headers", Kind::Array)],
    suggestions: &[("src", "source"), ("header", "headers")],
};

const HEADER_ENTRY: ObjectShape = ObjectShape {
    required: &["key", "value"],
    properties: &[("key", Kind::String), ("value", Kind::String)],
    suggestions: &[],
};

/// Collects findings for one configuration key.
#[derive(Debug, Default)]
struct Report {
    findings: Vec<Finding>,
}

impl Report {
    fn push(&mut self, path: &str, message: String) {
        self.findings.push(Finding::new(message).with_path(path));
    }

    fn kind(&mut self, path: &str, value: &Value, kind: Kind) -> bool {
        if kind.matches(value) {
            return true;
        }
        self.push(
            path,
            format!("property `{}` should be of type {}.", path, kind.name()),
        );
        false
    }

    fn object<'v>(
        &mut self,
        path: &str,
        value: &'v Value,
        shape: &ObjectShape,
    ) -> Option<&'v Map<String, Value>> {
        if !self.kind(path, value, Kind::Object) {
            return None;
        }
        let object = value.as_object()?;

        for name in shape.required {
            if !object.contains_key(*name) {
                self.push(
                    path,
                    format!("property `{}` is missing property `{}`.", path, name),
                );
            }
        }

        for (name, value) in object {
            match shape.properties.iter().find(|(p, _)| p == name) {
                Some((_, Kind::Status)) => {
                    self.status_value(&format!("{}.{}", path, name), value);
                }
                Some((_, kind)) => {
                    self.kind(&format!("{}.{}", path, name), value, *kind);
                }
                None => {
                    let hint = match shape.suggestions.iter().find(|(typo, _)| typo == name) {
                        Some((_, fix)) => format!("Did you mean `{}`?", fix),
                        None => "Please remove it.".to_string(),
                    };
                    self.push(
                        path,
                        format!(
                            "property `{}` should NOT have additional property `{}`. {}",
                            path, name, hint
                        ),
                    );
                }
            }
        }

        Some(object)
    }

    fn items<'v>(&mut self, path: &str, value: &'v Value) -> Vec<(String, &'v Value)> {
        if !self.kind(path, value, Kind::Array) {
            return Vec::new();
        }
        value
            .as_array()
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(i, item)| (format!("{}[{}]", path, i), item))
            .collect()
    }

    fn max_items(&mut self, path: &str, len: usize, max: usize) {
        if len > max {
            self.push(
                path,
                format!("property `{}` should NOT have more than {} items.", path, max),
            );
        }
    }

    fn max_length(&mut self, path: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(
                path,
                format!(
                    "property `{}` should NOT be longer than {} characters.",
                    path, max
                ),
            );
        }
    }

    fn status(&mut self, path: &str, status: u16) {
        if status < MIN_STATUS {
            self.push(path, format!("property `{}` should be >= {}.", path, MIN_STATUS));
        } else if status > MAX_STATUS {
            self.push(path, format!("property `{}` should be <= {}.", path, MAX_STATUS));
        }
    }

    /// Type and range check for a raw status value.
    fn status_value(&mut self, path: &str, value: &Value) {
        if !self.kind(path, value, Kind::Status) {
            return;
        }
        match value.as_i64() {
            Some(status) if status < i64::from(MIN_STATUS) => {
                self.push(path, format!("property `{}` should be >= {}.", path, MIN_STATUS));
            }
            Some(status) if status <= i64::from(MAX_STATUS) => {}
            _ => {
                self.push(path, format!("property `{}` should be <= {}.", path, MAX_STATUS));
            }
        }
    }

    fn into_error(self, key: &str) -> Option<RuleError> {
        RuleError::from_findings(
            ErrorCode::for_key(key),
            format!("Invalid `{}` property", key),
            self.findings,
        )
    }
}

/// Check the shape of a raw configuration document.
///
/// `null` values count as absent. Returns the error for the first key, in
/// composition order, that has any finding.
pub fn validate_shape(config: &Value) -> Option<RuleError> {
    let Some(object) = config.as_object() else {
        let mut report = Report::default();
        report.kind("config", config, Kind::Object);
        return RuleError::from_findings(
            ErrorCode::InvalidKeys,
            "Invalid configuration",
            report.findings,
        );
    };

    for key in KEYS {
        let Some(value) = object.get(*key).filter(|v| !v.is_null()) else {
            continue;
        };

        let mut report = Report::default();
        match *key {
            "cleanUrls" | "trailingSlash" => {
                report.kind(key, value, Kind::Boolean);
            }
            "routes" => {
                for (path, item) in report.items(key, value) {
                    shape_route(&mut report, &path, item);
                }
            }
            "redirects" => {
                for (path, item) in report.items(key, value) {
                    report.object(&path, item, &REDIRECT);
                }
            }
            "rewrites" => {
                for (path, item) in report.items(key, value) {
                    report.object(&path, item, &REWRITE);
                }
            }
            _ => {
                for (path, item) in report.items(key, value) {
                    shape_header_source(&mut report, &path, item);
                }
            }
        }

        if let Some(error) = report.into_error(key) {
            return Some(error);
        }
    }

    None
}

fn shape_route(report: &mut Report, path: &str, route: &Value) {
    let Some(object) = report.object(path, route, &ROUTE) else {
        return;
    };

    if let Some(Value::Array(methods)) = object.get("methods") {
        for (i, method) in methods.iter().enumerate() {
            report.kind(&format!("{}.methods[{}]", path, i), method, Kind::String);
        }
    }
    if let Some(Value::Object(headers)) = object.get("headers") {
        for (name, value) in headers {
            report.kind(&format!("{}.headers.{}", path, name), value, Kind::String);
        }
    }
}

fn shape_header_source(report: &mut Report, path: &str, source: &Value) {
    let Some(object) = report.object(path, source, &HEADER_SOURCE) else {
        return;
    };

    if let Some(headers) = object.get("headers").filter(|v| v.is_array()) {
        let headers_path = format!("{}.headers", path);
        for (entry_path, entry) in report.items(&headers_path, headers) {
            report.object(&entry_path, entry, &HEADER_ENTRY);
        }
    }
}

/// Check the size ceilings of a typed configuration.
///
/// Returns the error for the first key, in composition order, that exceeds
/// a ceiling.
pub fn check_limits(config: &RoutingConfig) -> Option<RuleError> {
    if let Some(routes) = &config.routes {
        let mut report = Report::default();
        report.max_items("routes", routes.len(), MAX_ITEMS);
        for (i, rule) in routes.iter().enumerate() {
            limit_route(&mut report, &format!("routes[{}]", i), rule);
        }
        if let Some(error) = report.into_error("routes") {
            return Some(error);
        }
    }

    if let Some(redirects) = &config.redirects {
        let mut report = Report::default();
        report.max_items("redirects", redirects.len(), MAX_ITEMS);
        for (i, redirect) in redirects.iter().enumerate() {
            let path = format!("redirects[{}]", i);
            report.max_length(&format!("{}.source", path), &redirect.source, MAX_STRING);
            report.max_length(
                &format!("{}.destination", path),
                &redirect.destination,
                MAX_STRING,
            );
            if let Some(status) = redirect.status_code {
                report.status(&format!("{}.statusCode", path), status);
            }
        }
        if let Some(error) = report.into_error("redirects") {
            return Some(error);
        }
    }

    if let Some(headers) = &config.headers {
        let mut report = Report::default();
        report.max_items("headers", headers.len(), MAX_ITEMS);
        for (i, source) in headers.iter().enumerate() {
            let path = format!("headers[{}]", i);
            report.max_length(&format!("{}.source", path), &source.source, MAX_STRING);
            report.max_items(&format!("{}.headers", path), source.headers.len(), MAX_ITEMS);
            for (j, entry) in source.headers.iter().enumerate() {
                let entry_path = format!("{}.headers[{}]", path, j);
                report.max_length(&format!("{}.key", entry_path), &entry.key, MAX_STRING);
                report.max_length(&format!("{}.value", entry_path), &entry.value, MAX_STRING);
            }
        }
        if let Some(error) = report.into_error("headers") {
            return Some(error);
        }
    }

    if let Some(rewrites) = &config.rewrites {
        let mut report = Report::default();
        report.max_items("rewrites", rewrites.len(), MAX_ITEMS);
        for (i, rewrite) in rewrites.iter().enumerate() {
            let path = format!("rewrites[{}]", i);
            report.max_length(&format!("{}.source", path), &rewrite.source, MAX_STRING);
            report.max_length(
                &format!("{}.destination", path),
                &rewrite.destination,
                MAX_STRING,
            );
        }
        if let Some(error) = report.into_error("rewrites") {
            return Some(error);
        }
    }

    None
}

fn limit_route(report: &mut Report, path: &str, rule: &Rule) {
    let source = match rule {
        Rule::Handle(handler) => {
            report.max_length(&format!("{}.handle", path), &handler.handle, MAX_HANDLE);
            return;
        }
        Rule::Source(source) => source,
    };

    report.max_length(&format!("{}.src", path), &source.src, MAX_STRING);
    if let Some(dest) = &source.dest {
        report.max_length(&format!("{}.dest", path), dest, MAX_STRING);
    }
    if let Some(status) = source.status {
        report.status(&format!("{}.status", path), status);
    }

    if let Some(methods) = &source.methods {
        let methods_path = format!("{}.methods", path);
        report.max_items(&methods_path, methods.len(), MAX_METHODS);
        for (i, method) in methods.iter().enumerate() {
            report.max_length(&format!("{}[{}]", methods_path, i), method, MAX_METHOD);
        }
    }

    if let Some(headers) = &source.headers {
        let headers_path = format!("{}.headers", path);
        if headers.is_empty() {
            report.push(
                &headers_path,
                format!("property `{}` should NOT have fewer than 1 properties.", headers_path),
            );
        } else if headers.len() > MAX_ROUTE_HEADERS {
            report.push(
                &headers_path,
                format!(
                    "property `{}` should NOT have more than {} properties.",
                    headers_path, MAX_ROUTE_HEADERS
                ),
            );
        }
        for (name, value) in headers {
            let length = name.chars().count();
            if length == 0 || length > MAX_HEADER_NAME {
                report.push(
                    &headers_path,
                    format!(
                        "property `{}` has invalid property name `{}`.",
                        headers_path, name
                    ),
                );
            }
            report.max_length(&format!("{}.{}", headers_path, name), value, MAX_STRING);
        }
    }
}
