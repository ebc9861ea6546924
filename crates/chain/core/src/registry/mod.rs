//! Identifiers, selectors and the injected filter and rule registries.
//!
//! Both registries are shared across dispatches and may be read from several
//! worker threads at once; writes are serialized behind an `RwLock`.
//! Registration never panics: malformed entries are logged and reported with
//! a `false` return (or a [`SelectorError`] from the `try_*` variants).
mod filters;
mod id;
mod rules;
mod selector;

pub use filters::{FilterEntries, FilterList, FilterRegistry, InteractionValidator};
pub use id::{IdError, ResourceId};
pub use rules::{RuleRegistry, TargetKind, ToolRule};
pub use selector::{Pattern, Selector, SelectorError};
