//! Destination and header templating.
//!
//! Named parameters from a compiled `source` are rewritten into positional
//! backreferences (`:id` becomes `$1`) inside destinations and header values.

use super::ParamKey;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;

/// `:name` references, with an optional trailing repeat modifier.
static PARAM_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+)[*+?]?").unwrap());

/// Named parameters mapped to their 1-based capture index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backrefs {
    /// `(name, index)` in order of first appearance. A repeated name keeps the
    /// index of its last occurrence.
    names: Vec<(String, usize)>,
}

impl Backrefs {
    /// Build from the capture keys of a compiled source.
    pub fn from_keys(keys: &[ParamKey]) -> Self {
        let mut names: Vec<(String, usize)> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            let Some(name) = key.name() else { continue };
            match names.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = i + 1,
                None => names.push((name.to_string(), i + 1)),
            }
        }
        Self { names }
    }

    /// True when the source has no named parameters.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Capture index of a named parameter.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, index)| *index)
    }

    /// Replace every known `:name` in `text` with `$N`. Unknown names are kept.
    pub fn substitute(&self, text: &str) -> String {
        if self.is_empty() || !text.contains(':') {
            return text.to_string();
        }
        PARAM_REF
            .replace_all(text, |caps: &Captures| match self.index_of(&caps[1]) {
                Some(index) => format!("${}", index),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Name referenced by a fragment consisting of a single `:name`.
    fn fragment_ref<'a>(&self, hash: &'a str) -> Option<&'a str> {
        let caps = PARAM_REF.captures(hash)?;
        let whole = caps.get(0)?;
        if whole.start() == 0 && whole.end() == hash.len() {
            caps.get(1).map(|m| m.as_str())
        } else {
            None
        }
    }
}

/// Rewrite a redirect or rewrite destination against the captured params.
///
/// Known `:name` references in the path, query values and fragment become
/// `$N`. The scheme and authority of an absolute destination are left alone. Named params not already used as a query key, and not referenced by
/// a `#:name` fragment, are appended as `name=$N` so nothing captured is
/// dropped. Destinations of sources without named params are returned as-is.
pub fn replace_segments(keys: &[ParamKey], destination: &str) -> String {
    let backrefs = Backrefs::from_keys(keys);
    if backrefs.is_empty() {
        return destination.to_string();
    }

    let (rest, hash) = match destination.split_once('#') {
        Some((rest, hash)) => (rest, Some(hash)),
        None => (destination, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (rest, None),
    };

    let mut query_keys = HashSet::new();
    let mut pairs = Vec::new();
    for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((key, value)) => {
                query_keys.insert(key);
                pairs.push(format!("{}={}", key, backrefs.substitute(value)));
            }
            None => {
                query_keys.insert(pair);
                pairs.push(pair.to_string());
            }
        }
    }

    let in_fragment = hash.and_then(|h| backrefs.fragment_ref(h));
    for (name, index) in &backrefs.names {
        if query_keys.contains(name.as_str()) || in_fragment == Some(name.as_str()) {
            continue;
        }
        pairs.push(format!("{}=${}", name, index));
    }

    let (authority, path) = split_authority(base);
    let mut result = authority.to_string();
    result.push_str(&backrefs.substitute(path));
    if !pairs.is_empty() {
        result.push('?');
        result.push_str(&pairs.join("&"));
    }
    if let Some(hash) = hash {
        result.push('#');
        result.push_str(&backrefs.substitute(hash));
    }
    result
}

/// Split `scheme://host` off the front of an absolute destination.
fn split_authority(base: &str) -> (&str, &str) {
    let Some(end) = base.find("://") else {
        return ("", base);
    };
    let scheme = &base[..end];
    let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return ("", base);
    }

    let host_start = end + 3;
    match base[host_start..].find('/') {
        Some(offset) => base.split_at(host_start + offset),
        None => (base, ""),
    }
}
