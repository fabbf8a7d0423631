//! `domain:path` asset codes and wildcard patterns over them.
//!
//! A code without an explicit domain lives in [`DEFAULT_DOMAIN`]. Any code
//! whose domain or path contains `*` is a pattern; `*` matches any run of
//! characters, including the empty run. Matching is case-sensitive and always
//! covers the full `domain:path` string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain assumed for codes written without one.
pub const DEFAULT_DOMAIN: &str = "game";

const WILDCARD: char = '*';

/// Errors produced while parsing an asset code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("asset code is empty")]
    Empty,
    #[error("asset code '{0}' has an empty domain or path")]
    EmptyPart(String),
    #[error("asset code '{0}' contains more than one ':' separator")]
    TooManySeparators(String),
}

/// An identifier of a catalog entry, e.g. `game:flower-lily`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode {
    domain: String,
    path: String,
}

impl AssetCode {
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// Parse `domain:path` or bare `path`.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CodeError::Empty);
        }
        match s.split_once(':') {
            None => Ok(Self::new(DEFAULT_DOMAIN, s)),
            Some((domain, path)) => {
                if path.contains(':') {
                    return Err(CodeError::TooManySeparators(s.to_string()));
                }
                if domain.is_empty() || path.is_empty() {
                    return Err(CodeError::EmptyPart(s.to_string()));
                }
                Ok(Self::new(domain, path))
            }
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True if the domain or the path contains a wildcard.
    pub fn is_pattern(&self) -> bool {
        self.domain.contains(WILDCARD) || self.path.contains(WILDCARD)
    }

    /// True if the path (not the domain) contains a wildcard.
    pub fn path_has_wildcard(&self) -> bool {
        self.path.contains(WILDCARD)
    }

    /// Same domain, different path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self::new(self.domain.clone(), path)
    }

    /// Replace every `*` in the path with `token`.
    pub fn substitute_wildcard(&self, token: &str) -> Self {
        self.with_path(self.path.replace(WILDCARD, token))
    }

    /// Replace every `{key}` placeholder in the path with `value`.
    pub fn fill_placeholder(&self, key: &str, value: &str) -> Self {
        self.with_path(fill_placeholder(&self.path, key, value))
    }

    /// Compile this code into a reusable matcher.
    pub fn to_pattern(&self) -> CodePattern {
        CodePattern::new(self.clone())
    }

    /// One-shot match of `candidate` against `self` used as a pattern.
    pub fn matches(&self, candidate: &AssetCode) -> bool {
        self.to_pattern().matches(candidate)
    }
}

/// Replace every `{key}` in `text` with `value`.
pub fn fill_placeholder(text: &str, key: &str, value: &str) -> String {
    text.replace(&format!("{{{key}}}"), value)
}

/// True if `text` contains a `{key}` placeholder.
pub fn has_placeholder(text: &str, key: &str) -> bool {
    text.contains(&format!("{{{key}}}"))
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.path)
    }
}

impl FromStr for AssetCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetCode> for String {
    fn from(code: AssetCode) -> Self {
        code.to_string()
    }
}

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

/// A code compiled for repeated matching. Literal codes compare by equality;
/// wildcard codes compile to a glob where only `*` is special.
#[derive(Debug, Clone)]
pub struct CodePattern {
    code: AssetCode,
    glob: Option<glob::Pattern>,
}

impl PartialEq for CodePattern {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for CodePattern {}

impl CodePattern {
    pub fn new(code: AssetCode) -> Self {
        let glob = if code.is_pattern() {
            let text = code.to_string();
            let mut glob_text = String::with_capacity(text.len());
            for (i, piece) in text.split(WILDCARD).enumerate() {
                // Runs of `*` collapse to one; `**` means something else to glob.
                if i > 0 && !glob_text.ends_with(WILDCARD) {
                    glob_text.push(WILDCARD);
                }
                glob_text.push_str(&glob::Pattern::escape(piece));
            }
            glob::Pattern::new(&glob_text).ok()
        } else {
            None
        };
        Self { code, glob }
    }

    pub fn code(&self) -> &AssetCode {
        &self.code
    }

    pub fn is_wildcard(&self) -> bool {
        self.glob.is_some()
    }

    pub fn matches(&self, candidate: &AssetCode) -> bool {
        match &self.glob {
            Some(glob) => glob.matches(&candidate.to_string()),
            None => self.code == *candidate,
        }
    }

    /// The substring of `candidate`'s path captured between the first and
    /// last `*` of this pattern's path. `None` if the pattern's path has no
    /// wildcard or the candidate does not match.
    pub fn capture(&self, candidate: &AssetCode) -> Option<String> {
        let pattern_path = self.code.path();
        let first = pattern_path.find(WILDCARD)?;
        let last = pattern_path.rfind(WILDCARD)?;
        if !self.matches(candidate) {
            return None;
        }
        let prefix_len = first;
        let suffix_len = pattern_path.len() - last - 1;
        let path = candidate.path();
        if path.len() < prefix_len + suffix_len {
            return None;
        }
        path.get(prefix_len..path.len() - suffix_len)
            .map(str::to_string)
    }
}
