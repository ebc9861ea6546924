use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ChainError, ErrorSeverity};

/// Namespaced identifier such as `minecraft:stone`.
///
/// Parsing adds the [`ResourceId::DEFAULT_NAMESPACE`] when the namespace is
/// omitted, so `"stone"` and `"minecraft:stone"` are the same id. Cloning is
/// cheap (shared string).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ResourceId {
    full: Arc<str>,
    split: usize,
}

impl ResourceId {
    pub const DEFAULT_NAMESPACE: &'static str = "minecraft";

    /// Builds an id from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if either part is empty or contains characters
    /// outside `[a-z0-9_.-]` (plus `/` in the path).
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdError> {
        validate_namespace(namespace)?;
        validate_path(path)?;
        Ok(Self {
            full: Arc::from(format!("{namespace}:{path}")),
            split: namespace.len(),
        })
    }

    /// Builds an id from parts the crate itself spells out.
    pub(crate) fn known(namespace: &str, path: &str) -> Self {
        debug_assert!(validate_namespace(namespace).is_ok() && validate_path(path).is_ok());
        Self {
            full: Arc::from(format!("{namespace}:{path}")),
            split: namespace.len(),
        }
    }

    /// Shorthand for an id in the default namespace.
    pub fn vanilla(path: &str) -> Result<Self, IdError> {
        Self::new(Self::DEFAULT_NAMESPACE, path)
    }

    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }
}

fn validate_namespace(namespace: &str) -> Result<(), IdError> {
    if namespace.is_empty() {
        return Err(IdError::EmptyNamespace);
    }
    match namespace
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-'))
    {
        Some(found) => Err(IdError::InvalidNamespaceChar(found)),
        None => Ok(()),
    }
}

fn validate_path(path: &str) -> Result<(), IdError> {
    if path.is_empty() {
        return Err(IdError::EmptyPath);
    }
    match path
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-' | '/'))
    {
        Some(found) => Err(IdError::InvalidPathChar(found)),
        None => Ok(()),
    }
}

impl FromStr for ResourceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::vanilla(s),
        }
    }
}

impl TryFrom<String> for ResourceId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.full.to_string()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.full)
    }
}

/// Errors produced while parsing a [`ResourceId`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("resource id namespace is empty")]
    EmptyNamespace,

    #[error("resource id path is empty")]
    EmptyPath,

    #[error("invalid character {0:?} in resource id namespace")]
    InvalidNamespaceChar(char),

    #[error("invalid character {0:?} in resource id path")]
    InvalidPathChar(char),
}

impl ChainError for IdError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyNamespace => "ID_EMPTY_NAMESPACE",
            Self::EmptyPath => "ID_EMPTY_PATH",
            Self::InvalidNamespaceChar(_) => "ID_INVALID_NAMESPACE_CHAR",
            Self::InvalidPathChar(_) => "ID_INVALID_PATH_CHAR",
        }
    }
}
