//! Configuration schema definitions.

use crate::rule::Rule;
use serde::{Deserialize, Serialize};

/// High-level routing configuration.
///
/// Either `routes` (a hand-written rule list) or any mix of the feature keys
/// may be set, never both. Keys outside this set are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Low-level rule list, passed through the normalizer as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Rule>>,

    /// Redirect `/x.html` and `/x/index` to `/x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_urls: Option<bool>,

    /// Force (`true`) or strip (`false`) a trailing slash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_slash: Option<bool>,

    /// Redirect rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirects: Option<Vec<Redirect>>,

    /// Response header rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderSource>>,

    /// Rewrite rules, applied after the filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrites: Option<Vec<Rewrite>>,
}

impl RoutingConfig {
    /// Feature keys that are set, in composition order.
    pub fn feature_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.clean_urls.is_some() {
            keys.push("cleanUrls");
        }
        if self.trailing_slash.is_some() {
            keys.push("trailingSlash");
        }
        if self.redirects.is_some() {
            keys.push("redirects");
        }
        if self.headers.is_some() {
            keys.push("headers");
        }
        if self.rewrites.is_some() {
            keys.push("rewrites");
        }
        keys
    }
}

/// A redirect: `{ "source": "/help", "destination": "/support", "statusCode": 302 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Redirect {
    /// Path pattern to match.
    pub source: String,
    /// Location to redirect to; may reference `:name` params.
    pub destination: String,
    /// Response status, 308 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// A rewrite: `{ "source": "/v1", "destination": "/v2/api.py" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rewrite {
    /// Path pattern to match.
    pub source: String,
    /// Path served instead; may reference `:name` params.
    pub destination: String,
}

/// Headers applied to every path matching `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderSource {
    /// Path pattern to match.
    pub source: String,
    /// Headers to set, in order.
    pub headers: Vec<HeaderEntry>,
}

/// One response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderEntry {
    /// Header name; may reference `:name` params.
    pub key: String,
    /// Header value; may reference `:name` params.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_features() {
        let config: RoutingConfig = serde_json::from_value(json!({
            "cleanUrls": true,
            "redirects": [{ "source": "/help", "destination": "/support", "statusCode": 302 }],
            "rewrites": [{ "source": "/v1", "destination": "/v2/api.py" }],
            "headers": [{ "source": "/(.*)", "headers": [{ "key": "x-a", "value": "b" }] }],
            "name": "ignored"
        }))
        .unwrap();

        assert_eq!(config.clean_urls, Some(true));
        assert_eq!(config.redirects.as_ref().unwrap()[0].status_code, Some(302));
        assert_eq!(config.rewrites.as_ref().unwrap()[0].destination, "/v2/api.py");
        assert_eq!(config.headers.as_ref().unwrap()[0].headers[0].key, "x-a");
        assert!(config.routes.is_none());
        assert_eq!(
            config.feature_keys(),
            vec!["cleanUrls", "redirects", "headers", "rewrites"]
        );
    }

    #[test]
    fn test_null_routes_is_absent() {
        let config: RoutingConfig = serde_json::from_value(json!({ "routes": null })).unwrap();
        assert_eq!(config, RoutingConfig::default());
    }

    #[test]
    fn test_redirect_rejects_unknown_fields() {
        let result: Result<Redirect, _> =
            serde_json::from_value(json!({ "src": "/a", "destination": "/b" }));
        assert!(result.is_err());
    }
}
