//! Allow/deny list loader.

use std::collections::BTreeMap;
use std::path::Path;

use chain_core::{FilterList, FilterRegistry};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// One `[list]` table in `filters.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ListToml {
    allow: Vec<String>,
    deny: Vec<String>,
}

/// Layout of `filters.toml`.
///
/// ```toml
/// [blocks]
/// allow = ["#c:ores", "*_log"]
/// deny = ["bedrock"]
///
/// [groups]
/// iron = ["iron_ore", "deepslate_iron_ore"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FiltersToml {
    blocks: ListToml,
    tools: ListToml,
    interaction_tools: ListToml,
    plantables: ListToml,
    interactive_items: ListToml,
    groups: BTreeMap<String, Vec<String>>,
}

impl FiltersToml {
    fn lists(&self) -> [(FilterList, &ListToml); 5] {
        [
            (FilterList::Blocks, &self.blocks),
            (FilterList::Tools, &self.tools),
            (FilterList::InteractionTools, &self.interaction_tools),
            (FilterList::Plantables, &self.plantables),
            (FilterList::InteractiveItems, &self.interactive_items),
        ]
    }
}

/// Loader for [`FilterRegistry`] contents from TOML files.
pub struct FiltersLoader;

impl FiltersLoader {
    /// Load a fresh registry from a TOML file.
    pub fn load(path: &Path) -> LoadResult<FilterRegistry> {
        let registry = FilterRegistry::new();
        let content = read_file(path)?;
        Self::apply(&content, &registry)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(registry)
    }

    /// Adds every entry in `content` to `registry`.
    ///
    /// Returns the number of entries added. The first invalid selector aborts
    /// the load; entries before it stay registered.
    pub fn apply(content: &str, registry: &FilterRegistry) -> LoadResult<usize> {
        let data: FiltersToml = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse filters TOML: {}", e))?;

        let mut added = 0;
        for (list, entries) in data.lists() {
            for entry in &entries.allow {
                let fresh = registry
                    .try_allow(list, entry)
                    .map_err(|e| anyhow::anyhow!("[{}] allow {:?}: {}", list, entry, e))?;
                added += usize::from(fresh);
            }
            for entry in &entries.deny {
                let fresh = registry
                    .try_deny(list, entry)
                    .map_err(|e| anyhow::anyhow!("[{}] deny {:?}: {}", list, entry, e))?;
                added += usize::from(fresh);
            }
        }

        for (name, members) in &data.groups {
            let members: Vec<&str> = members.iter().map(String::as_str).collect();
            if !registry.add_group(name, &members) {
                anyhow::bail!("[groups] {} has no valid members", name);
            }
            added += 1;
        }

        tracing::debug!(target: "chain::registry", added, "applied filter lists");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
        [blocks]
        allow = ["#c:ores", "*_log"]
        deny = ["bedrock"]

        [plantables]
        deny = ["torchflower_seeds"]

        [groups]
        iron = ["iron_ore", "deepslate_iron_ore"]
    "##;

    #[test]
    fn entries_land_in_their_lists() {
        let registry = FilterRegistry::new();
        let added = FiltersLoader::apply(SAMPLE, &registry).unwrap();

        assert_eq!(added, 5);
        let blocks = registry.entries(FilterList::Blocks);
        assert_eq!(blocks.allow, ["#c:ores", "minecraft:*_log"]);
        assert_eq!(blocks.deny, ["minecraft:bedrock"]);
        assert_eq!(
            registry.entries(FilterList::Plantables).deny,
            ["minecraft:torchflower_seeds"]
        );
        assert!(registry.entries(FilterList::Tools).allow.is_empty());
    }

    #[test]
    fn invalid_selector_names_the_list() {
        let registry = FilterRegistry::new();
        let err = FiltersLoader::apply("[tools]\nallow = [\"Bad Entry\"]\n", &registry).unwrap_err();
        assert!(err.to_string().contains("[tools] allow"));
    }

    #[test]
    fn unknown_lists_are_rejected() {
        let registry = FilterRegistry::new();
        assert!(FiltersLoader::apply("[weapons]\nallow = []\n", &registry).is_err());
    }
}
