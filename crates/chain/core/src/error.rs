//! Common error infrastructure for chain-core.
//!
//! Domain errors (`IdError`, `SelectorError`, `BudgetError`, ...) live next to
//! the types they validate. They all implement [`ChainError`] so hosts can log
//! and classify them uniformly.
//!
//! None of these errors escape [`crate::Dispatcher::dispatch`]; the dispatcher
//! folds every failure into a [`crate::StopReason`]. They surface only from
//! construction and registration APIs.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (e.g. a lock was busy)
/// - **Validation**: malformed input that must be fixed before retrying
/// - **Internal**: unexpected state inconsistency that should be investigated
/// - **Fatal**: the engine cannot run with the given environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or a broken host.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all error types in chain-core.
pub trait ChainError: std::error::Error {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, e.g. `"SELECTOR_INVALID_PATTERN"`.
    fn error_code(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert_eq!(ErrorSeverity::Fatal.as_str(), "fatal");
    }
}
