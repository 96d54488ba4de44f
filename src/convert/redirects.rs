//! Redirects.

use super::{convert_each, Converted};
use crate::config::Redirect;
use crate::pattern::replace_segments;
use crate::rule::SourceRule;

/// Status used when a redirect sets no `statusCode`.
pub const DEFAULT_REDIRECT_STATUS: u16 = 308;

/// Compile redirects into `Location` rules.
pub fn convert_redirects(redirects: &[Redirect]) -> Converted {
    convert_each(
        "redirects",
        redirects,
        |r| r.source.as_str(),
        |redirect, compiled| {
            SourceRule::redirect(
                compiled.src,
                replace_segments(&compiled.keys, &redirect.destination),
                redirect.status_code.unwrap_or(DEFAULT_REDIRECT_STATUS),
            )
        },
    )
}
