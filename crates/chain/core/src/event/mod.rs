//! Pre/post action event pipeline.
//!
//! The dispatcher fires a [`PreActionEvent`] after collecting targets and a
//! [`PostActionEvent`] after executing them. Pre listeners may cancel the
//! action or rewrite its target list; post listeners only observe.
//!
//! Subscriptions are global, filtered by [`ActionType`], or filtered by a
//! predicate over the event. Listeners report failure through
//! [`ListenerError`]; a failing listener never stops the others.
mod bus;
mod types;

pub use bus::EventBus;
pub use types::{PostActionEvent, PreActionEvent};

use std::fmt;

use crate::action::ActionType;
use crate::error::{ChainError, ErrorSeverity};

/// Handle returned by registration, used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    #[error("listener rejected {action} event: {reason}")]
    Rejected { action: ActionType, reason: String },

    #[error("{0}")]
    Failed(String),
}

impl ListenerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl ChainError for ListenerError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "LISTENER_REJECTED",
            Self::Failed(_) => "LISTENER_FAILED",
        }
    }
}
