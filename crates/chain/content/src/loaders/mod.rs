//! Content loaders for reading engine data from files.
//!
//! Every loader has a `load(path)` entry point and a `parse`/`apply` variant
//! over an in-memory string, so embedded defaults and on-disk files share one
//! code path.

pub mod config;
pub mod factory;
pub mod filters;
pub mod rules;
pub mod world;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use filters::FiltersLoader;
pub use rules::RulesLoader;
pub use world::{ActorSpec, RequestSpec, Scenario, WorldLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Parses RON with `implicit_some`, so optional fields take bare values.
pub(crate) fn parse_ron<T>(content: &str) -> ron::error::SpannedResult<T>
where
    T: serde::de::DeserializeOwned,
{
    ron::Options::default()
        .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
        .from_str(content)
}
