//! Path pattern compiler.
//!
//! Turns the user-facing `source` syntax of redirects, rewrites and headers
//! into a regular expression plus the list of captured parameters.
//!
//! ## Pattern Syntax
//!
//! ```text
//! /projects/:id          required segment      (?:\/([^\/]+?))
//! /blog/:slug*           optional catch-all    (?:\/((?:[^\/]+?)(?:\/(?:[^\/]+?))*))?
//! /docs/:path+           required catch-all    (?:\/((?:[^\/]+?)(?:\/(?:[^\/]+?))*))
//! /proxy/(.*)            unnamed capture       (?:\/(.*))
//! /feedback/((?!x).*)    regex inside capture, copied verbatim
//! ```
//!
//! Literal text is regex-escaped; a `/` or `.` directly in front of a
//! parameter is folded into the parameter's group so optional parameters
//! take their separator with them.

mod destination;
mod lexer;

pub use destination::{replace_segments, Backrefs};
pub use lexer::{Lexer, Token, TokenKind};

use crate::error::{Error, Result};

/// Pattern used for a parameter without an explicit `( ... )`.
pub const DEFAULT_PATTERN: &str = "[^\\/]+?";

/// Characters folded into a following parameter as its prefix.
const PREFIXES: &[char] = &['/', '.'];

/// How a captured parameter is referred to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKey {
    /// `:name` parameter, addressable from destinations and headers.
    Named(String),
    /// Bare `( ... )` capture, only addressable positionally.
    Unnamed(usize),
}

impl ParamKey {
    /// The parameter name, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ParamKey::Named(name) => Some(name),
            ParamKey::Unnamed(_) => None,
        }
    }
}

/// A capturing parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter key.
    pub key: ParamKey,
    /// Literal text matched before the capture (`/`, `.` or a `{...}` prefix).
    pub prefix: String,
    /// Literal text matched after the capture (only inside `{...}`).
    pub suffix: String,
    /// Regex body of the capture.
    pub pattern: String,
    /// `*`, `+` or `?`.
    pub modifier: Option<char>,
}

/// A parsed piece of a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal path text (escaped on output).
    Literal(String),
    /// A `(?...)` group copied through as written, with its modifier.
    Raw(String),
    /// `{prefix suffix}` group without a capture.
    Group {
        /// Literal text inside the braces.
        prefix: String,
        /// Literal text after the (absent) capture.
        suffix: String,
        /// `*`, `+` or `?`.
        modifier: Option<char>,
    },
    /// A capturing parameter.
    Param(Param),
}

/// Result of compiling a `source` pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSource {
    /// Anchored regular expression.
    pub src: String,
    /// Captured parameters, in capture order (`$1` is `keys[0]`).
    pub keys: Vec<ParamKey>,
}

impl CompiledSource {
    /// Positional backreferences for the named parameters.
    pub fn backrefs(&self) -> Backrefs {
        Backrefs::from_keys(&self.keys)
    }
}

/// Compile a `source` path pattern into an anchored regex.
pub fn source_to_regex(source: &str) -> Result<CompiledSource> {
    let segments = parse(source)?;
    let keys = segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Param(param) => Some(param.key.clone()),
            _ => None,
        })
        .collect();

    Ok(CompiledSource {
        src: to_regex(&segments),
        keys,
    })
}

/// Parse a pattern into segments.
pub fn parse(source: &str) -> Result<Vec<Segment>> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut stream = TokenStream {
        source,
        tokens,
        index: 0,
    };
    let mut segments = Vec::new();
    let mut path = String::new();
    let mut unnamed = 0;

    while stream.index < stream.tokens.len() {
        let position = stream.position();
        let ch = stream.try_char();
        let name = stream.try_name();
        let pattern = stream.try_pattern();

        if name.is_some() || pattern.is_some() {
            let mut prefix = ch.map(String::from).unwrap_or_default();
            if let Some(c) = ch {
                if !PREFIXES.contains(&c) {
                    path.push(c);
                    prefix.clear();
                }
            }

            if let Some(ref name) = name {
                if prefix.is_empty() && (position > 0 || ch.is_some()) {
                    tracing::warn!(
                        source = source,
                        param = name.as_str(),
                        position,
                        "parameter does not start a path segment"
                    );
                }
            }

            flush(&mut path, &mut segments);
            let key = match name {
                Some(name) => ParamKey::Named(name),
                None => {
                    unnamed += 1;
                    ParamKey::Unnamed(unnamed - 1)
                }
            };
            segments.push(Segment::Param(Param {
                key,
                prefix,
                suffix: String::new(),
                pattern: pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
                modifier: stream.try_modifier(),
            }));
            continue;
        }

        if let Some(value) = ch.or_else(|| stream.try_escaped()) {
            path.push(value);
            continue;
        }

        flush(&mut path, &mut segments);

        if let Some(mut raw) = stream.try_raw() {
            if let Some(modifier) = stream.try_modifier() {
                raw.push(modifier);
            }
            segments.push(Segment::Raw(raw));
            continue;
        }

        if stream.try_open() {
            let prefix = stream.consume_text();
            let name = stream.try_name();
            let pattern = stream.try_pattern();
            let suffix = stream.consume_text();
            stream.expect_close()?;
            let modifier = stream.try_modifier();

            if name.is_none() && pattern.is_none() {
                segments.push(Segment::Group {
                    prefix,
                    suffix,
                    modifier,
                });
                continue;
            }

            let key = match name {
                Some(name) => ParamKey::Named(name),
                None => {
                    unnamed += 1;
                    ParamKey::Unnamed(unnamed - 1)
                }
            };
            segments.push(Segment::Param(Param {
                key,
                prefix,
                suffix,
                pattern: pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
                modifier,
            }));
            continue;
        }

        stream.expect_end()?;
    }

    Ok(segments)
}

/// Render segments as an anchored regex.
pub fn to_regex(segments: &[Segment]) -> String {
    let mut route = String::from("^");

    for segment in segments {
        match segment {
            Segment::Literal(text) => route.push_str(&escape(text)),
            Segment::Raw(raw) => route.push_str(raw),
            Segment::Group {
                prefix,
                suffix,
                modifier,
            } => {
                route.push_str(&format!("(?:{}{})", escape(prefix), escape(suffix)));
                route.extend(modifier);
            }
            Segment::Param(param) => route.push_str(&param_to_regex(param)),
        }
    }

    route.push('$');
    route
}

fn param_to_regex(param: &Param) -> String {
    let prefix = escape(&param.prefix);
    let suffix = escape(&param.suffix);
    let pattern = &param.pattern;
    let modifier = param.modifier.map(String::from).unwrap_or_default();

    if prefix.is_empty() && suffix.is_empty() {
        return format!("({}){}", pattern, modifier);
    }

    match param.modifier {
        Some(repeat @ ('*' | '+')) => {
            let optional = if repeat == '*' { "?" } else { "" };
            format!(
                "(?:{p}((?:{pat})(?:{s}{p}(?:{pat}))*){s}){o}",
                p = prefix,
                s = suffix,
                pat = pattern,
                o = optional
            )
        }
        _ => format!("(?:{}({}){}){}", prefix, pattern, suffix, modifier),
    }
}

/// Escape regex metacharacters in literal path text.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '{' | '}' | '[' | ']' | '|' | '/' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn flush(path: &mut String, segments: &mut Vec<Segment>) {
    if !path.is_empty() {
        segments.push(Segment::Literal(std::mem::take(path)));
    }
}

/// Cursor over lexer tokens.
struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream<'_> {
    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|t| t.position)
            .unwrap_or(self.source.len())
    }

    fn take<T>(&mut self, pick: impl FnOnce(&TokenKind) -> Option<T>) -> Option<T> {
        let value = self.tokens.get(self.index).and_then(|t| pick(&t.kind))?;
        self.index += 1;
        Some(value)
    }

    fn try_char(&mut self) -> Option<char> {
        self.take(|kind| match kind {
            TokenKind::Char(c) => Some(*c),
            _ => None,
        })
    }

    fn try_escaped(&mut self) -> Option<char> {
        self.take(|kind| match kind {
            TokenKind::Escaped(c) => Some(*c),
            _ => None,
        })
    }

    fn try_name(&mut self) -> Option<String> {
        self.take(|kind| match kind {
            TokenKind::Name(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn try_pattern(&mut self) -> Option<String> {
        self.take(|kind| match kind {
            TokenKind::Pattern(pattern) => Some(pattern.clone()),
            _ => None,
        })
    }

    fn try_raw(&mut self) -> Option<String> {
        self.take(|kind| match kind {
            TokenKind::Raw(raw) => Some(raw.clone()),
            _ => None,
        })
    }

    fn try_modifier(&mut self) -> Option<char> {
        self.take(|kind| match kind {
            TokenKind::Modifier(c) => Some(*c),
            _ => None,
        })
    }

    fn try_open(&mut self) -> bool {
        self.take(|kind| matches!(kind, TokenKind::Open).then_some(()))
            .is_some()
    }

    /// Consume a run of plain and escaped characters.
    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.try_char().or_else(|| self.try_escaped()) {
            text.push(c);
        }
        text
    }

    fn expect_close(&mut self) -> Result<()> {
        self.expect(|kind| matches!(kind, TokenKind::Close), "'}'")
    }

    fn expect_end(&mut self) -> Result<()> {
        self.expect(|kind| matches!(kind, TokenKind::End), "end of pattern")
    }

    fn expect(&mut self, accept: impl Fn(&TokenKind) -> bool, expected: &str) -> Result<()> {
        match self.tokens.get(self.index) {
            Some(token) if accept(&token.kind) => {
                self.index += 1;
                Ok(())
            }
            Some(token) => Err(Error::pattern(
                self.source,
                token.position,
                format!("Unexpected {}, expected {}", describe(&token.kind), expected),
            )),
            None => Err(Error::pattern(
                self.source,
                self.source.len(),
                format!("Unexpected end of pattern, expected {}", expected),
            )),
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Modifier(c) => format!("modifier '{}'", c),
        TokenKind::Escaped(c) => format!("escaped '{}'", c),
        TokenKind::Open => "'{'".to_string(),
        TokenKind::Close => "'}'".to_string(),
        TokenKind::Name(name) => format!("parameter ':{}'", name),
        TokenKind::Pattern(pattern) => format!("pattern '({})'", pattern),
        TokenKind::Raw(raw) => format!("group '{}'", raw),
        TokenKind::Char(c) => format!("'{}'", c),
        TokenKind::End => "end of pattern".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(source: &str) -> String {
        source_to_regex(source).unwrap().src
    }

    #[test]
    fn test_static_path_is_escaped() {
        assert_eq!(src("/some/old/path"), r"^\/some\/old\/path$");
        assert_eq!(src("404.html"), r"^404\.html$");
    }

    #[test]
    fn test_required_params() {
        let compiled = source_to_regex("/projects/:id/:action").unwrap();
        assert_eq!(
            compiled.src,
            r"^\/projects(?:\/([^\/]+?))(?:\/([^\/]+?))$"
        );
        assert_eq!(
            compiled.keys,
            vec![
                ParamKey::Named("id".to_string()),
                ParamKey::Named("action".to_string())
            ]
        );
    }

    #[test]
    fn test_param_between_literals() {
        assert_eq!(src("/old/:segment/path"), r"^\/old(?:\/([^\/]+?))\/path$");
    }

    #[test]
    fn test_catch_all_params() {
        assert_eq!(
            src("/catchall/:hello*"),
            r"^\/catchall(?:\/((?:[^\/]+?)(?:\/(?:[^\/]+?))*))?$"
        );
        assert_eq!(
            src("/another-catch/:hello+/"),
            r"^\/another-catch(?:\/((?:[^\/]+?)(?:\/(?:[^\/]+?))*))\/$"
        );
    }

    #[test]
    fn test_unnamed_patterns_pass_through() {
        assert_eq!(src("/proxy/(.*)"), r"^\/proxy(?:\/(.*))$");
        assert_eq!(src("/next(\\.js)?"), r"^\/next(\.js)?$");
        assert_eq!(
            src("/feedback/((?!general).*)"),
            r"^\/feedback(?:\/((?!general).*))$"
        );
        assert_eq!(
            src("(.*)+/(.*)\\.(eot|otf|ttf|ttc|woff|font\\.css)"),
            r"^(.*)+(?:\/(.*))\.(eot|otf|ttf|ttc|woff|font\.css)$"
        );

        let compiled = source_to_regex("/proxy/(.*)").unwrap();
        assert_eq!(compiled.keys, vec![ParamKey::Unnamed(0)]);
    }

    #[test]
    fn test_leading_param() {
        assert_eq!(src("/:file/:id"), r"^(?:\/([^\/]+?))(?:\/([^\/]+?))$");
    }

    #[test]
    fn test_dot_prefix() {
        assert_eq!(src("/file.:ext"), r"^\/file(?:\.([^\/]+?))$");
    }

    #[test]
    fn test_custom_param_pattern() {
        assert_eq!(src("/user/:id(\\d+)"), r"^\/user(?:\/(\d+))$");
    }

    #[test]
    fn test_raw_group_is_not_a_param() {
        let compiled = source_to_regex("/(?:en|fr)?/:page").unwrap();
        assert_eq!(compiled.src, r"^\/(?:en|fr)?(?:\/([^\/]+?))$");
        assert_eq!(compiled.keys, vec![ParamKey::Named("page".to_string())]);
    }

    #[test]
    fn test_brace_group() {
        assert_eq!(src("/book{-:id}?"), r"^\/book(?:-([^\/]+?))?$");
        assert_eq!(src("/a{/b}?"), r"^\/a(?:\/b)?$");
    }

    #[test]
    fn test_stray_modifier_rejected() {
        let err = source_to_regex("/api/*").unwrap_err();
        assert!(matches!(err, Error::Pattern { position: 5, .. }));
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(source_to_regex("/:?").is_err());
    }

    #[test]
    fn test_unclosed_brace_rejected() {
        let err = source_to_regex("/a{/b").unwrap_err();
        assert!(matches!(err, Error::Pattern { ref message, .. } if message.contains("expected '}'")));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a.b/c"), r"a\.b\/c");
        assert_eq!(escape("a-b_c"), "a-b_c");
    }
}
