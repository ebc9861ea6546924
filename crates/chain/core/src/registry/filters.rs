//! Allow/deny lists consulted for eligibility and loose matching.
//!
//! Deny entries always win over allow entries. The registry is injected into
//! the dispatcher rather than living in a process-wide singleton, so each test
//! or world can carry its own fixture lists.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{ResourceId, Selector, SelectorError};
use crate::action::{ItemStack, ToolCapabilities};
use crate::env::{BlockRegistry, BlockState};

/// Named list in a [`FilterRegistry`].
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
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FilterList {
    /// Blocks chain mining may start on.
    Blocks,
    /// Tools chain mining may be performed with.
    Tools,
    /// Items that trigger chain interaction.
    InteractionTools,
    /// Items that chain planting accepts as seeds.
    Plantables,
    /// Items used through the generic item-use pathway.
    InteractiveItems,
}

/// Extra veto for generic item-use targets.
pub type InteractionValidator = Arc<dyn Fn(&ItemStack, &BlockState) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Denied,
    Allowed,
    Unlisted,
}

#[derive(Clone, Debug, Default)]
struct ListFilter {
    allow: Vec<Selector>,
    deny: Vec<Selector>,
}

impl ListFilter {
    fn verdict<F>(&self, id: &ResourceId, has_tag: F) -> Verdict
    where
        F: Fn(&ResourceId) -> bool,
    {
        if self.deny.iter().any(|s| s.matches(id, &has_tag)) {
            Verdict::Denied
        } else if self.allow.iter().any(|s| s.matches(id, &has_tag)) {
            Verdict::Allowed
        } else {
            Verdict::Unlisted
        }
    }
}

#[derive(Clone, Debug)]
struct BlockGroup {
    name: String,
    members: Vec<Selector>,
}

#[derive(Default)]
struct Filters {
    lists: HashMap<FilterList, ListFilter>,
    groups: Vec<BlockGroup>,
    validators: Vec<InteractionValidator>,
}

impl Filters {
    fn list(&self, list: FilterList) -> Option<&ListFilter> {
        self.lists.get(&list)
    }
}

/// Snapshot of one list's entries, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterEntries {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

#[derive(Default)]
pub struct FilterRegistry {
    inner: RwLock<Filters>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== registration =====

    /// Adds an allow entry. Returns `Ok(false)` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when `entry` does not parse.
    pub fn try_allow(&self, list: FilterList, entry: &str) -> Result<bool, SelectorError> {
        let selector: Selector = entry.parse()?;
        Ok(self.write(|filters| {
            let allow = &mut filters.lists.entry(list).or_default().allow;
            push_unique(allow, selector)
        }))
    }

    /// Adds a deny entry. Returns `Ok(false)` if it was already present.
    pub fn try_deny(&self, list: FilterList, entry: &str) -> Result<bool, SelectorError> {
        let selector: Selector = entry.parse()?;
        Ok(self.write(|filters| {
            let deny = &mut filters.lists.entry(list).or_default().deny;
            push_unique(deny, selector)
        }))
    }

    /// Like [`Self::try_allow`], but logs and reports `false` on invalid input.
    pub fn allow(&self, list: FilterList, entry: &str) -> bool {
        self.try_allow(list, entry)
            .unwrap_or_else(|e| reject(list, entry, &e))
    }

    pub fn deny(&self, list: FilterList, entry: &str) -> bool {
        self.try_deny(list, entry)
            .unwrap_or_else(|e| reject(list, entry, &e))
    }

    /// Removes `entry` from both sides of `list`.
    pub fn remove(&self, list: FilterList, entry: &str) -> bool {
        let Ok(selector) = entry.parse::<Selector>() else {
            return false;
        };
        self.write(|filters| {
            let Some(lists) = filters.lists.get_mut(&list) else {
                return false;
            };
            let before = lists.allow.len() + lists.deny.len();
            lists.allow.retain(|s| s != &selector);
            lists.deny.retain(|s| s != &selector);
            before != lists.allow.len() + lists.deny.len()
        })
    }

    pub fn clear(&self, list: FilterList) {
        self.write(|filters| filters.lists.remove(&list).is_some());
    }

    pub fn entries(&self, list: FilterList) -> FilterEntries {
        self.read(|filters| {
            filters
                .list(list)
                .map(|l| FilterEntries {
                    allow: l.allow.iter().map(ToString::to_string).collect(),
                    deny: l.deny.iter().map(ToString::to_string).collect(),
                })
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// Declares blocks that loose matching treats as one chain, e.g. an ore
    /// and its deepslate variant. Rejected entirely if any member is invalid.
    pub fn add_group(&self, name: &str, members: &[&str]) -> bool {
        let parsed: Result<Vec<Selector>, SelectorError> =
            members.iter().map(|m| m.parse()).collect();
        match parsed {
            Ok(members) if !members.is_empty() => self.write(|filters| {
                filters.groups.retain(|g| g.name != name);
                filters.groups.push(BlockGroup {
                    name: name.to_owned(),
                    members,
                });
                true
            }),
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(
                    target: "chain::registry",
                    group = name,
                    error = %e,
                    "rejected block group"
                );
                false
            }
        }
    }

    pub fn add_validator<F>(&self, validator: F) -> bool
    where
        F: Fn(&ItemStack, &BlockState) -> bool + Send + Sync + 'static,
    {
        self.write(|filters| {
            filters.validators.push(Arc::new(validator));
            true
        })
    }

    // ===== queries =====

    /// Deny wins; then `mine_all` admits everything; else the allow list decides.
    pub fn is_block_allowed(
        &self,
        state: &BlockState,
        registry: &dyn BlockRegistry,
        mine_all: bool,
    ) -> bool {
        let verdict = self.block_verdict(FilterList::Blocks, state, registry);
        match verdict {
            Verdict::Denied => false,
            Verdict::Allowed => true,
            Verdict::Unlisted => mine_all,
        }
    }

    /// Empty hands follow `allow_bare_hand`; an empty allow list admits every tool.
    pub fn is_tool_allowed(
        &self,
        item: &ItemStack,
        registry: &dyn BlockRegistry,
        allow_bare_hand: bool,
    ) -> bool {
        let Some(id) = item.item() else {
            return allow_bare_hand;
        };
        self.read(|filters| {
            let Some(list) = filters.list(FilterList::Tools) else {
                return true;
            };
            match list.verdict(id, |tag| registry.item_has_tag(id, tag)) {
                Verdict::Denied => false,
                Verdict::Allowed => true,
                Verdict::Unlisted => list.allow.is_empty(),
            }
        })
        .unwrap_or(false)
    }

    pub fn is_interaction_tool(&self, item: &ItemStack, registry: &dyn BlockRegistry) -> bool {
        match self.item_verdict(FilterList::InteractionTools, item, registry) {
            Verdict::Denied => false,
            Verdict::Allowed => true,
            Verdict::Unlisted => {
                item.capabilities()
                    .intersects(ToolCapabilities::INTERACTION_TOOLS)
                    || self.is_interactive_item(item, registry)
            }
        }
    }

    pub fn is_interactive_item(&self, item: &ItemStack, registry: &dyn BlockRegistry) -> bool {
        self.item_verdict(FilterList::InteractiveItems, item, registry) == Verdict::Allowed
    }

    /// Whether `item` may be chain-planted. Denied seeds never are.
    pub fn is_plantable(&self, item: &ItemStack, registry: &dyn BlockRegistry) -> bool {
        match self.item_verdict(FilterList::Plantables, item, registry) {
            Verdict::Denied => false,
            Verdict::Allowed => true,
            Verdict::Unlisted => registry.is_plantable(item),
        }
    }

    pub fn is_block_denied(&self, state: &BlockState, registry: &dyn BlockRegistry) -> bool {
        self.block_verdict(FilterList::Blocks, state, registry) == Verdict::Denied
    }

    /// Loose-mode kinship: both blocks share an allowed block tag, or belong
    /// to the same block group.
    pub fn loosely_related(
        &self,
        a: &BlockState,
        b: &BlockState,
        registry: &dyn BlockRegistry,
    ) -> bool {
        self.read(|filters| {
            let shared_tag = filters.list(FilterList::Blocks).is_some_and(|list| {
                list.allow.iter().filter_map(Selector::as_tag).any(|tag| {
                    registry.block_has_tag(a, tag) && registry.block_has_tag(b, tag)
                })
            });
            shared_tag
                || filters.groups.iter().any(|group| {
                    let contains = |state: &BlockState| {
                        group.members.iter().any(|m| {
                            m.matches(state.block(), |tag| registry.block_has_tag(state, tag))
                        })
                    };
                    contains(a) && contains(b)
                })
        })
        .unwrap_or(false)
    }

    pub fn validators_pass(&self, item: &ItemStack, state: &BlockState) -> bool {
        let validators = self
            .read(|filters| filters.validators.clone())
            .unwrap_or_default();
        validators.iter().all(|validate| validate(item, state))
    }

    // ===== internals =====

    fn block_verdict(
        &self,
        list: FilterList,
        state: &BlockState,
        registry: &dyn BlockRegistry,
    ) -> Verdict {
        self.read(|filters| {
            filters.list(list).map_or(Verdict::Unlisted, |l| {
                l.verdict(state.block(), |tag| registry.block_has_tag(state, tag))
            })
        })
        .unwrap_or(Verdict::Denied)
    }

    fn item_verdict(
        &self,
        list: FilterList,
        item: &ItemStack,
        registry: &dyn BlockRegistry,
    ) -> Verdict {
        let Some(id) = item.item() else {
            return Verdict::Denied;
        };
        self.read(|filters| {
            filters.list(list).map_or(Verdict::Unlisted, |l| {
                l.verdict(id, |tag| registry.item_has_tag(id, tag))
            })
        })
        .unwrap_or(Verdict::Denied)
    }

    fn read<R>(&self, f: impl FnOnce(&Filters) -> R) -> Option<R> {
        match self.inner.read() {
            Ok(filters) => Some(f(&filters)),
            Err(_) => {
                tracing::error!(target: "chain::registry", "filter registry lock poisoned");
                None
            }
        }
    }

    fn write(&self, f: impl FnOnce(&mut Filters) -> bool) -> bool {
        match self.inner.write() {
            Ok(mut filters) => f(&mut filters),
            Err(_) => {
                tracing::error!(target: "chain::registry", "filter registry lock poisoned");
                false
            }
        }
    }
}

fn push_unique(list: &mut Vec<Selector>, selector: Selector) -> bool {
    if list.contains(&selector) {
        false
    } else {
        list.push(selector);
        true
    }
}

fn reject(list: FilterList, entry: &str, error: &SelectorError) -> bool {
    tracing::warn!(
        target: "chain::registry",
        %list,
        entry,
        error = %error,
        "rejected filter entry"
    );
    false
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryWorld;

    fn id(s: &str) -> ResourceId {
        s.parse().unwrap()
    }

    fn state(s: &str) -> BlockState {
        BlockState::new(id(s))
    }

    #[test]
    fn deny_beats_allow_and_mine_all() {
        let world = MemoryWorld::new();
        let filters = FilterRegistry::new();
        assert!(filters.allow(FilterList::Blocks, "*_ore"));
        assert!(filters.deny(FilterList::Blocks, "ancient_debris"));
        assert!(filters.deny(FilterList::Blocks, "diamond_ore"));

        assert!(filters.is_block_allowed(&state("iron_ore"), &world, false));
        assert!(!filters.is_block_allowed(&state("diamond_ore"), &world, false));
        assert!(!filters.is_block_allowed(&state("diamond_ore"), &world, true));
        assert!(!filters.is_block_allowed(&state("stone"), &world, false));
        assert!(filters.is_block_allowed(&state("stone"), &world, true));
        assert!(!filters.is_block_allowed(&state("ancient_debris"), &world, true));
    }

    #[test]
    fn tag_entries_use_host_tags() {
        let mut world = MemoryWorld::new();
        world.tag_block(id("oak_log"), id("logs"));
        let filters = FilterRegistry::new();
        filters.allow(FilterList::Blocks, "#minecraft:logs");
        assert!(filters.is_block_allowed(&state("oak_log"), &world, false));
        assert!(!filters.is_block_allowed(&state("oak_planks"), &world, false));
    }

    #[test]
    fn tool_rules() {
        let world = MemoryWorld::new();
        let filters = FilterRegistry::new();
        let pick = ItemStack::new(id("iron_pickaxe"), 1);
        let stick = ItemStack::new(id("stick"), 1);

        assert!(filters.is_tool_allowed(&ItemStack::empty(), &world, true));
        assert!(!filters.is_tool_allowed(&ItemStack::empty(), &world, false));
        assert!(filters.is_tool_allowed(&stick, &world, true));

        filters.allow(FilterList::Tools, "*_pickaxe");
        assert!(filters.is_tool_allowed(&pick, &world, true));
        assert!(!filters.is_tool_allowed(&stick, &world, true));

        filters.deny(FilterList::Tools, "iron_pickaxe");
        assert!(!filters.is_tool_allowed(&pick, &world, true));
    }

    #[test]
    fn invalid_entries_are_rejected_without_panicking() {
        let filters = FilterRegistry::new();
        assert!(!filters.allow(FilterList::Blocks, "Not Valid"));
        assert!(filters.try_deny(FilterList::Tools, "#").is_err());
        assert!(!filters.add_group("broken", &["stone", "BAD"]));
        assert_eq!(filters.entries(FilterList::Blocks), FilterEntries::default());
    }

    #[test]
    fn duplicates_and_removal() {
        let filters = FilterRegistry::new();
        assert!(filters.allow(FilterList::Blocks, "stone"));
        assert!(!filters.allow(FilterList::Blocks, "minecraft:stone"));
        assert_eq!(filters.entries(FilterList::Blocks).allow, vec!["minecraft:stone"]);
        assert!(filters.remove(FilterList::Blocks, "stone"));
        assert!(!filters.remove(FilterList::Blocks, "stone"));
    }

    #[test]
    fn groups_and_tags_relate_blocks() {
        let mut world = MemoryWorld::new();
        world.tag_block(id("oak_log"), id("logs"));
        world.tag_block(id("birch_log"), id("logs"));
        let filters = FilterRegistry::new();

        assert!(!filters.loosely_related(&state("oak_log"), &state("birch_log"), &world));
        filters.allow(FilterList::Blocks, "#logs");
        assert!(filters.loosely_related(&state("oak_log"), &state("birch_log"), &world));

        assert!(filters.add_group("iron", &["iron_ore", "deepslate_iron_ore"]));
        assert!(filters.loosely_related(
            &state("iron_ore"),
            &state("deepslate_iron_ore"),
            &world
        ));
        assert!(!filters.loosely_related(&state("iron_ore"), &state("gold_ore"), &world));
    }

    #[test]
    fn plantables_respect_deny_list() {
        let mut world = MemoryWorld::new();
        world.add_crop(
            id("wheat"),
            crate::env::memory::CropSpec {
                mature_at: 7,
                seed: id("wheat_seeds"),
                drops: Vec::new(),
            },
        );
        let filters = FilterRegistry::new();
        let seeds = ItemStack::new(id("wheat_seeds"), 4);
        assert!(filters.is_plantable(&seeds, &world));
        filters.deny(FilterList::Plantables, "wheat_seeds");
        assert!(!filters.is_plantable(&seeds, &world));
        assert!(!filters.is_plantable(&ItemStack::empty(), &world));
    }

    #[test]
    fn validators_can_veto() {
        let filters = FilterRegistry::new();
        let item = ItemStack::new(id("bone_meal"), 1);
        assert!(filters.validators_pass(&item, &state("grass_block")));
        filters.add_validator(|_, target| target.block().path() != "grass_block");
        assert!(!filters.validators_pass(&item, &state("grass_block")));
        assert!(filters.validators_pass(&item, &state("moss_block")));
    }
}
