//! Content factory for building engine inputs from data files.

use std::path::{Path, PathBuf};

use chain_core::{ChainConfig, FilterRegistry, RuleRegistry};

use crate::loaders::{ConfigLoader, FiltersLoader, LoadResult, RulesLoader, Scenario, WorldLoader};

const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");
const EMBEDDED_FILTERS: &str = include_str!("../../data/filters.toml");
const EMBEDDED_RULES: &str = include_str!("../../data/rules.ron");

/// Content factory that loads all engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── filters.toml
/// ├── rules.ron
/// └── worlds/
///     ├── ore_vein.ron
///     └── wheat_farm.ron
/// ```
///
/// Missing `filters.toml` or `rules.ron` yield empty registries; a missing
/// `config.toml` yields the defaults.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<ChainConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "chain::config", path = %path.display(), "no config file, using defaults");
            return Ok(ChainConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load allow/deny lists from `filters.toml`.
    pub fn load_filters(&self) -> LoadResult<FilterRegistry> {
        let path = self.data_dir.join("filters.toml");
        if !path.exists() {
            return Ok(FilterRegistry::new());
        }
        FiltersLoader::load(&path)
    }

    /// Load tool rules from `rules.ron`.
    pub fn load_rules(&self) -> LoadResult<RuleRegistry> {
        let path = self.data_dir.join("rules.ron");
        if !path.exists() {
            return Ok(RuleRegistry::new());
        }
        RulesLoader::load(&path)
    }

    /// Load a scenario from `worlds/{world_name}.ron`.
    ///
    /// # Arguments
    ///
    /// * `world_name` - Name of the world file (without `.ron` extension)
    pub fn load_world(&self, world_name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("worlds").join(format!("{}.ron", world_name));
        WorldLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ===== embedded defaults =====

    /// The configuration shipped with the crate.
    pub fn embedded_config() -> LoadResult<ChainConfig> {
        ConfigLoader::parse(EMBEDDED_CONFIG)
    }

    pub fn embedded_filters() -> LoadResult<FilterRegistry> {
        let registry = FilterRegistry::new();
        FiltersLoader::apply(EMBEDDED_FILTERS, &registry)?;
        Ok(registry)
    }

    pub fn embedded_rules() -> LoadResult<RuleRegistry> {
        let registry = RuleRegistry::new();
        RulesLoader::apply(EMBEDDED_RULES, &registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn embedded_content_loads() {
        let config = ContentFactory::embedded_config().unwrap();
        assert_eq!(config.validate(), Ok(()));
        ContentFactory::embedded_filters().unwrap();
        assert!(!ContentFactory::embedded_rules().unwrap().is_empty());
    }
}
