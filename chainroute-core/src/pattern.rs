//! Method and path patterns
//!
//! Patterns decide whether a route participates in a request.
//!
//! # Method patterns
//!
//! - `*` matches every method
//! - anything else is a literal compared case-insensitively (`get` matches `GET`)
//!
//! # Path patterns
//!
//! - `*` matches every URL
//! - `/users` matches the path exactly (a trailing slash is ignored)
//! - `/users/:id` captures the `id` segment
//! - `/files/*rest` captures the remaining segments as `rest` (`*` alone
//!   captures them as `*`)
//! - `https://api.example.com/users/:id` also requires scheme, host and port
//!   to match
//! - [`PathPattern::regex`] matches the full URL string; named groups are
//!   captured
//!
//! # Examples
//!
//! ```
//! use chainroute_core::PathPattern;
//! use url::Url;
//!
//! let pattern = PathPattern::new("/users/:id/posts/:post");
//! let url = Url::parse("http://h/users/42/posts/hello%20world").unwrap();
//!
//! let params = pattern.captures(&url).unwrap();
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(params.get("post"), Some("hello world"));
//! ```

use crate::{Error, HttpMethod, PathParams, Result};
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use url::Url;

/// Name used for an unnamed trailing `*` capture.
pub const WILDCARD_PARAM: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    Any,
    Exact(String),
}

impl MethodPattern {
    /// Strict parse used by dynamic registration.
    ///
    /// Rejects empty input and anything that is not an HTTP token.
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::InvalidArguments(
                "method pattern must not be empty".to_string(),
            ));
        }
        if pattern == "*" {
            return Ok(MethodPattern::Any);
        }
        if !pattern.bytes().all(is_token_byte) {
            return Err(Error::InvalidArguments(format!(
                "invalid method pattern: {:?}",
                pattern
            )));
        }
        Ok(MethodPattern::Exact(pattern.to_ascii_uppercase()))
    }

    pub fn matches(&self, method: &str) -> bool {
        match self {
            MethodPattern::Any => true,
            MethodPattern::Exact(expected) => expected.eq_ignore_ascii_case(method),
        }
    }
}

// RFC 9110 token characters
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

impl From<HttpMethod> for MethodPattern {
    fn from(method: HttpMethod) -> Self {
        MethodPattern::Exact(method.as_str().to_string())
    }
}

impl From<&str> for MethodPattern {
    fn from(pattern: &str) -> Self {
        match pattern.trim() {
            "*" => MethodPattern::Any,
            other => MethodPattern::Exact(other.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for MethodPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodPattern::Any => f.write_str("*"),
            MethodPattern::Exact(method) => f.write_str(method),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

#[derive(Debug, Clone)]
struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        for part in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = part.strip_prefix(':') {
                segments.push(Segment::Param(name.to_string()));
            } else if let Some(name) = part.strip_prefix('*') {
                let name = if name.is_empty() { WILDCARD_PARAM } else { name };
                segments.push(Segment::CatchAll(name.to_string()));
                // Nothing after a catch-all can ever match.
                break;
            } else {
                segments.push(Segment::Static(decode(part).into_owned()));
            }
        }
        Self { segments }
    }

    fn captures(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = PathParams::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest: Vec<Cow<'_, str>> =
                        parts.iter().skip(index).map(|part| decode(part)).collect();
                    params.insert(name.as_str(), rest.join("/"));
                    return Some(params);
                }
                Segment::Param(name) => {
                    let part = parts.get(index)?;
                    params.insert(name.as_str(), decode(part));
                }
                Segment::Static(expected) => {
                    let part = parts.get(index)?;
                    if decode(part) != expected.as_str() {
                        return None;
                    }
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

fn decode(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

#[derive(Debug, Clone)]
enum PatternKind {
    Any,
    Path(PathTemplate),
    Absolute { origin: String, path: PathTemplate },
    Regex(Regex),
}

/// Compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    kind: PatternKind,
}

impl PathPattern {
    /// Compile a literal, templated or absolute-URL pattern.
    pub fn new(pattern: &str) -> Self {
        let source = pattern.to_string();
        if pattern.trim() == "*" {
            return Self {
                source,
                kind: PatternKind::Any,
            };
        }

        let kind = match Url::parse(pattern) {
            Ok(url) if url.has_host() => PatternKind::Absolute {
                origin: url.origin().ascii_serialization(),
                path: PathTemplate::parse(url.path()),
            },
            _ => PatternKind::Path(PathTemplate::parse(pattern)),
        };

        Self { source, kind }
    }

    /// Strict variant of [`PathPattern::new`] for dynamic registration.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "path pattern must not be empty".to_string(),
            ));
        }
        Ok(Self::new(pattern))
    }

    /// Compile a regular expression matched against the full URL string.
    pub fn regex(expression: &str) -> Result<Self> {
        let regex = Regex::new(expression).map_err(|e| {
            Error::InvalidArguments(format!("invalid path expression {:?}: {}", expression, e))
        })?;
        Ok(regex.into())
    }

    pub fn any() -> Self {
        Self::new("*")
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.captures(url).is_some()
    }

    /// Match `url`, returning the captured parameters on success.
    pub fn captures(&self, url: &Url) -> Option<PathParams> {
        match &self.kind {
            PatternKind::Any => Some(PathParams::new()),
            PatternKind::Path(template) => template.captures(url.path()),
            PatternKind::Absolute { origin, path } => {
                if url.origin().ascii_serialization() != *origin {
                    return None;
                }
                path.captures(url.path())
            }
            PatternKind::Regex(regex) => {
                let caps = regex.captures(url.as_str())?;
                Some(
                    regex
                        .capture_names()
                        .flatten()
                        .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
                        .collect(),
                )
            }
        }
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for PathPattern {
    fn from(pattern: String) -> Self {
        Self::new(&pattern)
    }
}

impl From<Regex> for PathPattern {
    fn from(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            kind: PatternKind::Regex(regex),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
