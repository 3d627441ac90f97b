//! Path templates.
//!
//! A template is a `/`-separated list of segments, each either a literal or a
//! `{name}` parameter covering the whole segment. Leading, trailing and
//! repeated slashes are ignored on both sides of a match.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One segment of a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment, e.g. `pets`.
    Literal(String),
    /// A parameter segment, e.g. `{petId}`.
    Param(String),
}

impl Segment {
    /// Returns `true` for literal segments.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

/// A parsed path template such as `/pets/{petId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// The result of matching a concrete path against a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathMatch {
    /// Percent-decoded parameter values, in template order.
    pub params: IndexMap<String, String>,
}

impl PathTemplate {
    /// Parses a template. Never fails: anything that is not a well-formed
    /// `{name}` segment is kept as a literal.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = split(&raw)
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                    Segment::Param(name.to_string())
                }
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// Returns the template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` when the template has no parameters.
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(Segment::is_literal)
    }

    /// Matches a concrete request path.
    pub fn matches(&self, path: &str) -> Option<PathMatch> {
        let actual: Vec<&str> = split(path).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut found = PathMatch::default();
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    let decoded = urlencoding::decode(value)
                        .map(|cow| cow.into_owned())
                        .unwrap_or_else(|_| value.to_string());
                    found.params.insert(name.clone(), decoded);
                }
            }
        }
        Some(found)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

impl From<String> for PathTemplate {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
