//! Clean URLs.

use super::PERMANENT_REDIRECT;
use crate::rule::SourceRule;
use serde::Serialize;

/// `/x/index` and `/x/index.html`, with an optional trailing slash.
const INDEX_SRC: &str = r"^/(?:(.+)/)?index(?:\.html)?/?$";
/// `/x.html`, with an optional trailing slash.
const HTML_SRC: &str = r"^/(.*)\.html/?$";

/// Redirect `.html` and `index` paths to their extension-less form.
///
/// Locations end in `/` when `trailing_slash` is set. Disabled yields no rules.
pub fn convert_clean_urls(enabled: bool, trailing_slash: bool) -> Vec<SourceRule> {
    if !enabled {
        return Vec::new();
    }

    let location = if trailing_slash { "/$1/" } else { "/$1" };
    vec![
        SourceRule::redirect(INDEX_SRC, location, PERMANENT_REDIRECT),
        SourceRule::redirect(HTML_SRC, location, PERMANENT_REDIRECT),
    ]
}

/// An `.html` file and the clean path it is served at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanUrl {
    /// Rooted path of the file, e.g. `/about.html`.
    pub html: String,
    /// Path without the extension, e.g. `/about`.
    pub clean: String,
}

/// Pair every `.html` path with its clean form. Other paths are skipped.
pub fn get_clean_urls<S: AsRef<str>>(paths: &[S]) -> Vec<CleanUrl> {
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            let stem = path.strip_suffix(".html")?;
            let root = if path.starts_with('/') { "" } else { "/" };
            Some(CleanUrl {
                html: format!("{}{}", root, path),
                clean: format!("{}{}", root, stem),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::test_support::assert_matches;

    #[test]
    fn test_clean_urls_enabled() {
        let rules = convert_clean_urls(true, false);
        assert_eq!(
            rules,
            vec![
                SourceRule::redirect(r"^/(?:(.+)/)?index(?:\.html)?/?$", "/$1", 308),
                SourceRule::redirect(r"^/(.*)\.html/?$", "/$1", 308),
            ]
        );

        assert_matches(
            &rules,
            &[
                &["/index", "/index.html", "/sub/index", "/sub/index.html"],
                &["/file.html", "/sub/file.html"],
            ],
            &[
                &[
                    "/someindex",
                    "/someindex.html",
                    "/indexAhtml",
                    "/sub/someindex",
                    "/sub/someindex.html",
                    "/sub/indexAhtml",
                ],
                &["/filehtml", "/sub/filehtml"],
            ],
        );
    }

    #[test]
    fn test_clean_urls_with_trailing_slash() {
        let rules = convert_clean_urls(true, true);
        for rule in &rules {
            assert_eq!(rule.headers.as_ref().unwrap()["Location"], "/$1/");
            assert_eq!(rule.status, Some(308));
        }

        assert_matches(
            &rules,
            &[
                &["/index/", "/index.html/", "/sub/index/", "/sub/index.html/"],
                &["/file.html/", "/sub/file.html/"],
            ],
            &[
                &["/someindex/", "/someindex.html/", "/sub/indexAhtml/"],
                &["/filehtml/", "/sub/filehtml/"],
            ],
        );
    }

    #[test]
    fn test_clean_urls_disabled() {
        assert!(convert_clean_urls(false, false).is_empty());
        assert!(convert_clean_urls(false, true).is_empty());
    }

    #[test]
    fn test_get_clean_urls() {
        let urls = get_clean_urls(&[
            "file.txt",
            "path/to/file.txt",
            "file.js",
            "path/to/file.js",
            "file.html",
            "path/to/file.html",
        ]);
        assert_eq!(
            urls,
            vec![
                CleanUrl {
                    html: "/file.html".to_string(),
                    clean: "/file".to_string(),
                },
                CleanUrl {
                    html: "/path/to/file.html".to_string(),
                    clean: "/path/to/file".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_get_clean_urls_keeps_rooted_paths() {
        let urls = get_clean_urls(&["/docs/index.html".to_string()]);
        assert_eq!(urls[0].html, "/docs/index.html");
        assert_eq!(urls[0].clean, "/docs/index");
    }
}
