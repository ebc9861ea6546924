use std::fmt;
use std::str::FromStr;

use regex::Regex;

use super::id::{IdError, ResourceId};
use crate::error::{ChainError, ErrorSeverity};

/// A textual filter entry resolved against block, item or entity ids.
///
/// | Syntax              | Meaning                         |
/// |---------------------|---------------------------------|
/// | `*`                 | anything                        |
/// | `#minecraft:logs`   | anything carrying the tag       |
/// | `minecraft:*_ore`   | glob over the full id (`*`, `?`)|
/// | `stone`             | exactly `minecraft:stone`       |
#[derive(Clone, Debug)]
pub enum Selector {
    Any,
    Id(ResourceId),
    Tag(ResourceId),
    Pattern(Pattern),
}

impl Selector {
    /// Returns whether `id` is selected. `has_tag` answers tag membership for
    /// the thing `id` names.
    pub fn matches<F>(&self, id: &ResourceId, has_tag: F) -> bool
    where
        F: FnOnce(&ResourceId) -> bool,
    {
        match self {
            Self::Any => true,
            Self::Id(expected) => expected == id,
            Self::Tag(tag) => has_tag(tag),
            Self::Pattern(pattern) => pattern.is_match(id),
        }
    }

    pub fn as_tag(&self) -> Option<&ResourceId> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }
        if s == "*" {
            return Ok(Self::Any);
        }
        if let Some(tag) = s.strip_prefix('#') {
            return Ok(Self::Tag(tag.parse()?));
        }
        if s.contains(['*', '?']) {
            return Ok(Self::Pattern(Pattern::compile(s)?));
        }
        Ok(Self::Id(s.parse()?))
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Id(a), Self::Id(b)) | (Self::Tag(a), Self::Tag(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.source == b.source,
            _ => false,
        }
    }
}

impl Eq for Selector {}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Tag(tag) => write!(f, "#{tag}"),
            Self::Pattern(pattern) => f.write_str(&pattern.source),
        }
    }
}

/// Glob over a full resource id, compiled to an anchored regex.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn compile(raw: &str) -> Result<Self, SelectorError> {
        let source = if raw.contains(':') {
            raw.to_owned()
        } else {
            format!("{}:{raw}", ResourceId::DEFAULT_NAMESPACE)
        };

        let mut expr = String::with_capacity(source.len() * 2 + 2);
        expr.push('^');
        for c in source.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| SelectorError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    pub fn is_match(&self, id: &ResourceId) -> bool {
        self.regex.is_match(id.as_str())
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Errors produced while parsing a [`Selector`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,

    #[error("invalid id in selector: {0}")]
    Id(#[from] IdError),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ChainError for SelectorError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "SELECTOR_EMPTY",
            Self::Id(_) => "SELECTOR_INVALID_ID",
            Self::InvalidPattern { .. } => "SELECTOR_INVALID_PATTERN",
        }
    }
}
