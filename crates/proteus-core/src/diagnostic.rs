//! Validation diagnostics.
//!
//! A [`Diagnostic`] describes one validation finding. A failed validation step
//! is reported as [`Diagnostics`], a list that is non-empty by construction:
//! there is no constructor that yields zero entries.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The element violates its contract.
    Error,
    /// The element is accepted but uses something discouraged.
    Warning,
    /// Informational finding.
    Information,
    /// Hint for the user.
    Hint,
}

impl Severity {
    /// Returns the lowercase name of this severity.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
///
/// # Example
///
/// ```
/// use proteus_core::{Diagnostic, Severity};
///
/// let diagnostic = Diagnostic::error("required", "missing required query parameter 'limit'")
///     .at(["query", "limit"]);
///
/// assert_eq!(diagnostic.severity, Severity::Error);
/// assert_eq!(diagnostic.path, vec!["query", "limit"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Machine-readable code (e.g. `required`, `type`, `401`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Path into the validated element (e.g. `["body", "user", "email"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Free-form tags attached by the validator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity.
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            path: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates an informational diagnostic.
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Information, code, message)
    }

    /// Sets the path of this diagnostic.
    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns `true` if this diagnostic has error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.severity, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.severity, self.path.join("."), self.message)
        }
    }
}

/// A non-empty, ordered list of diagnostics produced by one failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    head: Diagnostic,
    tail: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates a list holding a single diagnostic.
    pub fn new(first: Diagnostic) -> Self {
        Self {
            head: first,
            tail: Vec::new(),
        }
    }

    /// Builds a list from a vector, returning `None` when the vector is empty.
    pub fn from_vec(diagnostics: Vec<Diagnostic>) -> Option<Self> {
        let mut iter = diagnostics.into_iter();
        let head = iter.next()?;
        Some(Self {
            head,
            tail: iter.collect(),
        })
    }

    /// Turns the findings of a validator into its result.
    ///
    /// No findings means the element passed and is handed back unchanged.
    pub fn check<E>(element: &E, found: Vec<Diagnostic>) -> Result<&E, Self> {
        match Self::from_vec(found) {
            Some(diagnostics) => Err(diagnostics),
            None => Ok(element),
        }
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.tail.push(diagnostic);
    }

    /// Appends every diagnostic of `other`, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.tail.extend(other);
    }

    /// Returns the first diagnostic.
    pub fn first(&self) -> &Diagnostic {
        &self.head
    }

    /// Returns the number of diagnostics (always at least one).
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Returns `true` if at least one diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }

    /// Returns `true` if any diagnostic carries the given code.
    pub fn contains_code(&self, code: &str) -> bool {
        self.iter().any(|d| d.code == code)
    }

    /// Converts the list into a plain vector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        let mut all = Vec::with_capacity(self.len());
        all.push(self.head);
        all.extend(self.tail);
        all
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(diagnostic)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::iter::Chain<std::iter::Once<Diagnostic>, std::vec::IntoIter<Diagnostic>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.head).chain(self.tail)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("; "))
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for Diagnostics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let all = Vec::<Diagnostic>::deserialize(deserializer)?;
        Self::from_vec(all)
            .ok_or_else(|| serde::de::Error::custom("diagnostics list must not be empty"))
    }
}
