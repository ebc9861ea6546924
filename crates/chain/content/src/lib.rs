//! Data-driven engine content and loaders.
//!
//! This crate reads chain-engine content from TOML/RON data files:
//! - Engine configuration (`config.toml`, TOML)
//! - Allow/deny lists and block groups (`filters.toml`, TOML)
//! - External tool rules (`rules.ron`, RON)
//! - Fixture worlds for the in-memory host (`worlds/*.ron`, RON)
//!
//! Loaders deserialize chain-core types directly through its `serde` feature
//! and hand back ready-to-inject registries.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorSpec, ConfigLoader, ContentFactory, FiltersLoader, LoadResult, RequestSpec, RulesLoader,
    Scenario, WorldLoader,
};
