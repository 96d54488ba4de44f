//! Trailing slash policy.

use super::PERMANENT_REDIRECT;
use crate::rule::SourceRule;

/// Add (`true`) or strip (`false`) a trailing slash with a 308 redirect.
pub fn convert_trailing_slash(enabled: bool) -> Vec<SourceRule> {
    let rule = if enabled {
        SourceRule::redirect(r"^/(.*[^\/])$", "/$1/", PERMANENT_REDIRECT)
    } else {
        SourceRule::redirect(r"^/(.*)\/$", "/$1", PERMANENT_REDIRECT)
    };
    vec![rule]
}
