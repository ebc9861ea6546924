//! Engine configuration loader.

use std::path::Path;

use chain_core::ChainConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`ChainConfig`] from TOML files.
///
/// Missing keys take their defaults; out-of-range values are clamped (and
/// logged) rather than rejected.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<ChainConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ChainConfig> {
        let config: ChainConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config.validated())
    }
}
