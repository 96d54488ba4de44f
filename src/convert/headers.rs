//! Custom response headers.

use super::{convert_each, Converted};
use crate::config::HeaderSource;
use crate::rule::SourceRule;
use indexmap::IndexMap;

/// Compile header sources into annotation rules that fall through.
///
/// Both header names and values may reference `:name` params.
pub fn convert_headers(headers: &[HeaderSource]) -> Converted {
    convert_each(
        "headers",
        headers,
        |h| h.source.as_str(),
        |source, compiled| {
            let backrefs = compiled.backrefs();
            let headers: IndexMap<String, String> = source
                .headers
                .iter()
                .map(|entry| (backrefs.substitute(&entry.key), backrefs.substitute(&entry.value)))
                .collect();

            SourceRule {
                headers: Some(headers),
                continue_: true,
                ..SourceRule::new(compiled.src)
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderEntry;
    use crate::convert::test_support::assert_matches;

    fn header_source(source: &str, headers: &[(&str, &str)]) -> HeaderSource {
        HeaderSource {
            source: source.to_string(),
            headers: headers
                .iter()
                .map(|(key, value)| HeaderEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    fn expected(src: &str, headers: &[(&str, &str)]) -> SourceRule {
        SourceRule {
            headers: Some(
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            continue_: true,
            ..SourceRule::new(src)
        }
    }

    #[test]
    fn test_convert_headers() {
        let rules = convert_headers(&[
            header_source(
                "(.*)+/(.*)\\.(eot|otf|ttf|ttc|woff|font\\.css)",
                &[("Access-Control-Allow-Origin", "*")],
            ),
            header_source(
                "404.html",
                &[("Cache-Control", "max-age=300"), ("Set-Cookie", "error=404")],
            ),
            header_source("/blog/:path*", &[("on-blog", ":path*"), (":path*", "blog")]),
        ])
        .unwrap();

        assert_eq!(
            rules,
            vec![
                expected(
                    r"^(.*)+(?:\/(.*))\.(eot|otf|ttf|ttc|woff|font\.css)$",
                    &[("Access-Control-Allow-Origin", "*")]
                ),
                expected(
                    r"^404\.html$",
                    &[("Cache-Control", "max-age=300"), ("Set-Cookie", "error=404")]
                ),
                expected(
                    r"^\/blog(?:\/((?:[^\/]+?)(?:\/(?:[^\/]+?))*))?$",
                    &[("on-blog", "$1"), ("$1", "blog")]
                ),
            ]
        );

        assert_matches(
            &rules,
            &[
                &["hello/world/file.eot", "another/font.ttf", "dir/arial.font.css"],
                &["404.html"],
                &["/blog/first-post", "/blog/another/one"],
            ],
            &[
                &["hello/file.jpg", "hello/font-css", "dir/arial.font-css"],
                &["403.html", "500.html"],
                &["/blogg", "/random"],
            ],
        );
    }

    #[test]
    fn test_headers_keep_declaration_order() {
        let rules = convert_headers(&[header_source(
            "/",
            &[("x-z", "1"), ("Cache-Control", "no-cache"), ("x-a", "2")],
        )])
        .unwrap();
        let keys: Vec<&str> = rules[0]
            .headers
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["x-z", "Cache-Control", "x-a"]);
        assert_eq!(
            serde_json::to_string(&rules[0]).unwrap(),
            r#"{"src":"^\/$","headers":{"x-z":"1","Cache-Control":"no-cache","x-a":"2"},"continue":true}"#
        );
    }

    #[test]
    fn test_header_rules_carry_no_action() {
        let rules = convert_headers(&[header_source("/a", &[("x", "y")])]).unwrap();
        assert!(rules[0].dest.is_none());
        assert!(rules[0].status.is_none());
        assert!(rules[0].continue_);
    }
}
