//! Externally registered tool rules.
//!
//! A rule grants a tool an action on a set of targets and, for interactions,
//! may pin the sub-kind. Rules are consulted before capability inference;
//! the first matching rule wins.

use std::sync::RwLock;

use super::{ResourceId, Selector, SelectorError};
use crate::action::{ActionType, InteractionKind, ItemStack};
use crate::env::{BlockRegistry, BlockState};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetKind {
    Block,
    Entity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolRule {
    tool: Selector,
    target: TargetKind,
    action: ActionType,
    kind: Option<InteractionKind>,
    /// Empty means every target of `target` kind.
    targets: Vec<Selector>,
}

impl ToolRule {
    /// # Errors
    ///
    /// Returns [`SelectorError`] if `tool` is not a valid selector.
    pub fn new(tool: &str, target: TargetKind, action: ActionType) -> Result<Self, SelectorError> {
        Ok(Self {
            tool: tool.parse()?,
            target,
            action,
            kind: None,
            targets: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// # Errors
    ///
    /// Returns [`SelectorError`] on the first target that does not parse.
    pub fn with_targets<I, S>(mut self, targets: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for target in targets {
            self.targets.push(target.as_ref().parse()?);
        }
        Ok(self)
    }

    pub fn tool(&self) -> &Selector {
        &self.tool
    }

    pub fn target(&self) -> TargetKind {
        self.target
    }

    pub fn action(&self) -> ActionType {
        self.action
    }

    pub fn kind(&self) -> Option<InteractionKind> {
        self.kind
    }

    pub fn targets(&self) -> &[Selector] {
        &self.targets
    }

    fn matches_tool(&self, item: &ItemStack, registry: &dyn BlockRegistry) -> bool {
        item.item()
            .is_some_and(|id| self.tool.matches(id, |tag| registry.item_has_tag(id, tag)))
    }

    fn matches_block(&self, state: &BlockState, registry: &dyn BlockRegistry) -> bool {
        self.targets.is_empty()
            || self.targets.iter().any(|s| {
                s.matches(state.block(), |tag| registry.block_has_tag(state, tag))
            })
    }

    fn matches_entity(&self, kind: &ResourceId, registry: &dyn BlockRegistry) -> bool {
        self.targets.is_empty()
            || self
                .targets
                .iter()
                .any(|s| s.matches(kind, |tag| registry.entity_has_tag(kind, tag)))
    }
}

#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<Vec<ToolRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, rule: ToolRule) -> bool {
        match self.rules.write() {
            Ok(mut rules) => {
                tracing::debug!(
                    target: "chain::registry",
                    tool = %rule.tool,
                    action = %rule.action,
                    target_kind = %rule.target,
                    "registered tool rule"
                );
                rules.push(rule);
                true
            }
            Err(_) => false,
        }
    }

    /// Parses and registers a rule. Returns `false` for invalid selectors.
    pub fn register_str(
        &self,
        tool: &str,
        target: TargetKind,
        action: ActionType,
        kind: Option<InteractionKind>,
        targets: &[&str],
    ) -> bool {
        let rule = ToolRule::new(tool, target, action).and_then(|rule| {
            let rule = match kind {
                Some(kind) => rule.with_kind(kind),
                None => rule,
            };
            rule.with_targets(targets)
        });
        match rule {
            Ok(rule) => self.register(rule),
            Err(e) => {
                tracing::warn!(
                    target: "chain::registry",
                    tool,
                    %action,
                    error = %e,
                    "rejected tool rule"
                );
                false
            }
        }
    }

    /// First block rule for `item` acting on `state`.
    pub fn find_block(
        &self,
        item: &ItemStack,
        state: &BlockState,
        action: ActionType,
        registry: &dyn BlockRegistry,
    ) -> Option<ToolRule> {
        self.find(|rule| {
            rule.target == TargetKind::Block
                && rule.action == action
                && rule.matches_tool(item, registry)
                && rule.matches_block(state, registry)
        })
    }

    /// First entity rule for `item` acting on an entity of type `kind`.
    pub fn find_entity(
        &self,
        item: &ItemStack,
        kind: &ResourceId,
        action: ActionType,
        registry: &dyn BlockRegistry,
    ) -> Option<ToolRule> {
        self.find(|rule| {
            rule.target == TargetKind::Entity
                && rule.action == action
                && rule.matches_tool(item, registry)
                && rule.matches_entity(kind, registry)
        })
    }

    /// Whether any rule grants `item` the `action`, regardless of target.
    pub fn has_rule_for(
        &self,
        item: &ItemStack,
        action: ActionType,
        registry: &dyn BlockRegistry,
    ) -> bool {
        self.find(|rule| rule.action == action && rule.matches_tool(item, registry))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.read().map(|rules| rules.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut rules) = self.rules.write() {
            rules.clear();
        }
    }

    fn find(&self, predicate: impl Fn(&ToolRule) -> bool) -> Option<ToolRule> {
        let rules = self.rules.read().ok()?;
        rules.iter().find(|rule| predicate(rule)).cloned()
    }
}
