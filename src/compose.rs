//! Configuration composer.
//!
//! Turns a [`RoutingConfig`] into one ordered rule list. A hand-written
//! `routes` list is normalized as-is; otherwise the features are compiled in
//! a fixed order:
//!
//! ```text
//! cleanUrls → trailingSlash → redirects → headers → { handle: filesystem } → rewrites
//! ```
//!
//! Each feature's batch is normalized on its own so an error carries the
//! code of the feature that caused it. The first failing feature stops
//! composition; the rules composed before it are returned with the error.

use crate::config::{check_limits, validate_shape, RoutingConfig, MAX_ITEMS};
use crate::convert::{
    convert_clean_urls, convert_headers, convert_redirects, convert_rewrites,
    convert_trailing_slash, Converted,
};
use crate::error::{ErrorCode, Finding, Result, RuleError};
use crate::normalize::{normalize_routes, Normalized};
use crate::rule::{Phase, Rule, SourceRule};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Summary for `routes` combined with feature keys.
pub const MIXED_ROUTES: &str = "Cannot mix legacy routes with new keys";
/// Summary for redirects with an invalid `source`.
pub const INVALID_REDIRECT_SOURCE: &str = "Redirect `source` contains invalid regex";
/// Summary for headers with an invalid `source`.
pub const INVALID_HEADER_SOURCE: &str = "Headers `source` contains invalid regex";
/// Summary for rewrites with an invalid `source`.
pub const INVALID_REWRITE_SOURCE: &str = "Rewrites `source` contains invalid regex";
/// Summary for a composed rule list over the item ceiling.
pub const TOO_MANY_RULES: &str = "Too many routing rules";

/// Compile a routing configuration into an ordered rule list.
///
/// Returns `rules: None` when the configuration sets neither `routes` nor
/// any feature.
pub fn compile(config: &RoutingConfig) -> Normalized {
    if let Some(error) = check_limits(config) {
        return Normalized::failed(None, error);
    }

    let features = config.feature_keys();

    if let Some(routes) = &config.routes {
        let conflicts: Vec<Finding> = features
            .iter()
            .map(|key| Finding::new(format!("Cannot define both `routes` and `{}`", key)))
            .collect();

        if let Some(error) = RuleError::from_findings(ErrorCode::InvalidKeys, MIXED_ROUTES, conflicts)
        {
            return Normalized::failed(Some(routes.clone()), error);
        }

        debug!(rules = routes.len(), "normalizing routes");
        return normalize_routes(Some(routes));
    }

    if features.is_empty() {
        return Normalized::default();
    }

    let mut rules = Vec::new();
    match compose_features(config, &mut rules) {
        Ok(()) => Normalized::ok(rules),
        Err(error) => {
            debug!(code = %error.code, findings = error.errors.len(), "composition failed");
            Normalized::failed(Some(rules), error)
        }
    }
}

/// Validate the shape of a raw JSON configuration, then compile it.
pub fn compile_value(value: &Value) -> Normalized {
    if let Some(error) = validate_shape(value) {
        return Normalized::failed(None, error);
    }

    match RoutingConfig::deserialize(value) {
        Ok(config) => compile(&config),
        Err(e) => Normalized::failed(
            None,
            RuleError {
                code: ErrorCode::InvalidKeys,
                summary: "Invalid configuration".to_string(),
                errors: vec![Finding::new(e.to_string())],
            },
        ),
    }
}

/// Parse a JSON configuration document and compile it.
///
/// Malformed JSON is an [`Error::ConfigParse`](crate::Error::ConfigParse);
/// everything else is reported through the returned [`Normalized`].
pub fn compile_str(input: &str) -> Result<Normalized> {
    let value: Value = serde_json::from_str(input)?;
    Ok(compile_value(&value))
}

fn compose_features(
    config: &RoutingConfig,
    rules: &mut Vec<Rule>,
) -> std::result::Result<(), RuleError> {
    if let Some(enabled) = config.clean_urls {
        let batch = convert_clean_urls(enabled, config.trailing_slash == Some(true));
        let batch = normalize_batch("cleanUrls", batch, ErrorCode::InvalidCleanUrls)?;
        append(rules, batch, "cleanUrls", ErrorCode::InvalidCleanUrls)?;
    }

    if let Some(enabled) = config.trailing_slash {
        let batch = convert_trailing_slash(enabled);
        let batch = normalize_batch("trailingSlash", batch, ErrorCode::InvalidTrailingSlash)?;
        append(rules, batch, "trailingSlash", ErrorCode::InvalidTrailingSlash)?;
    }

    if let Some(redirects) = &config.redirects {
        let batch = checked_sources(
            convert_redirects(redirects),
            ErrorCode::InvalidRedirects,
            INVALID_REDIRECT_SOURCE,
        )?;
        let batch = normalize_batch("redirects", batch, ErrorCode::InvalidRedirects)?;
        append(rules, batch, "redirects", ErrorCode::InvalidRedirects)?;
    }

    if let Some(headers) = &config.headers {
        let batch = checked_sources(
            convert_headers(headers),
            ErrorCode::InvalidHeaders,
            INVALID_HEADER_SOURCE,
        )?;
        let batch = normalize_batch("headers", batch, ErrorCode::InvalidHeaders)?;
        append(rules, batch, "headers", ErrorCode::InvalidHeaders)?;
    }

    if let Some(rewrites) = &config.rewrites {
        let batch = checked_sources(
            convert_rewrites(rewrites),
            ErrorCode::InvalidRewrites,
            INVALID_REWRITE_SOURCE,
        )?;
        let batch = normalize_batch("rewrites", batch, ErrorCode::InvalidRewrites)?;
        let batch = std::iter::once(Rule::handle(Phase::Filesystem))
            .chain(batch)
            .collect();
        append(rules, batch, "rewrites", ErrorCode::InvalidRewrites)?;
    }

    Ok(())
}

/// Append a feature's rules, keeping the composed list within [`MAX_ITEMS`].
fn append(
    rules: &mut Vec<Rule>,
    batch: Vec<Rule>,
    feature: &str,
    code: ErrorCode,
) -> std::result::Result<(), RuleError> {
    let total = rules.len() + batch.len();
    if total > MAX_ITEMS {
        return Err(RuleError {
            code,
            summary: TOO_MANY_RULES.to_string(),
            errors: vec![Finding::new(format!(
                "composed rules should NOT have more than {} items; `{}` brings them to {}.",
                MAX_ITEMS, feature, total
            ))
            .with_path(feature)],
        });
    }

    rules.extend(batch);
    Ok(())
}

fn checked_sources(
    converted: Converted,
    code: ErrorCode,
    summary: &str,
) -> std::result::Result<Vec<SourceRule>, RuleError> {
    converted.map_err(|errors| RuleError {
        code,
        summary: summary.to_string(),
        errors,
    })
}

fn normalize_batch(
    feature: &str,
    batch: Vec<SourceRule>,
    code: ErrorCode,
) -> std::result::Result<Vec<Rule>, RuleError> {
    let batch: Vec<Rule> = batch.into_iter().map(Rule::from).collect();
    let normalized = normalize_routes(Some(&batch));
    if let Some(error) = normalized.error {
        return Err(error.with_code(code));
    }

    let rules = normalized.rules.unwrap_or_default();
    debug!(feature, rules = rules.len(), "composed feature");
    Ok(rules)
}
