//! Tool rule loader.

use std::path::Path;

use chain_core::{ActionType, InteractionKind, RuleRegistry, TargetKind, ToolRule};
use serde::Deserialize;

use crate::loaders::{LoadResult, parse_ron, read_file};

/// One rule entry in `rules.ron`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleRon {
    tool: String,
    target: TargetKind,
    action: ActionType,
    #[serde(default)]
    kind: Option<InteractionKind>,
    #[serde(default)]
    targets: Vec<String>,
}

impl RuleRon {
    fn build(&self) -> LoadResult<ToolRule> {
        let mut rule = ToolRule::new(&self.tool, self.target, self.action)?;
        if let Some(kind) = self.kind {
            rule = rule.with_kind(kind);
        }
        Ok(rule.with_targets(&self.targets)?)
    }
}

/// Loader for [`RuleRegistry`] contents from RON files.
///
/// The file is a list of rules kept in file order, which is also match order.
pub struct RulesLoader;

impl RulesLoader {
    pub fn load(path: &Path) -> LoadResult<RuleRegistry> {
        let registry = RuleRegistry::new();
        let content = read_file(path)?;
        Self::apply(&content, &registry)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(registry)
    }

    /// Appends every rule in `content` to `registry` and returns how many
    /// were registered. Nothing is registered if any rule is invalid.
    pub fn apply(content: &str, registry: &RuleRegistry) -> LoadResult<usize> {
        let data: Vec<RuleRon> = parse_ron(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules RON: {}", e))?;

        let rules = data
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build()
                    .map_err(|e| anyhow::anyhow!("rule #{} ({}): {}", index, spec.tool, e))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let mut registered = 0;
        for rule in rules {
            if !registry.register(rule) {
                anyhow::bail!("rule registry is unavailable");
            }
            registered += 1;
        }
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_keep_file_order() {
        let registry = RuleRegistry::new();
        let count = RulesLoader::apply(
            r##"[
                (tool: "mymod:sickle", target: block, action: harvesting, targets: ["#minecraft:crops"]),
                (tool: "mymod:*", target: block, action: interaction, kind: Some(generic_item_use)),
            ]"##,
            &registry,
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn one_bad_rule_registers_nothing() {
        let registry = RuleRegistry::new();
        let err = RulesLoader::apply(
            r##"[
                (tool: "mymod:sickle", target: block, action: harvesting),
                (tool: "Not Valid", target: entity, action: interaction),
            ]"##,
            &registry,
        )
        .unwrap_err();

        assert!(err.to_string().contains("rule #1"));
        assert!(registry.is_empty());
    }
}
