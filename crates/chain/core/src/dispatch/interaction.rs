//! Chain interaction over blocks and entities.
//!
//! The [`InteractionKind`] decides both halves of the pipeline. Every kind
//! except shearing flood fills from the origin over blocks the held item
//! acts on. Shearing instead gathers live
//! shearable entities around the origin, nearest to the actor first, with
//! the clicked entity ahead of all others.
//!
//! Every use goes through the host's generic item-use pathway, so tool wear
//! and item consumption are the host's own.

use tracing::debug;

use super::pipeline::{Pipeline, Reject, Run, ToolWatch, has_any_tag, tag, with_origin};
use crate::action::{ActionResult, ActionType, InteractionKind, ItemStack, StopReason};
use crate::env::{BlockLookup, BlockRegistry, BlockState, EntityView};
use crate::geom::BlockPos;
use crate::registry::FilterRegistry;
use crate::shape::{Connected, Expansion, Neighborhood, SearchOutcome};

/// Radius, per axis, in which a sheared target position is re-resolved to an
/// entity.
const ENTITY_SLACK: u32 = 1;

/// Chain interaction: uses the held item on every qualifying block through
/// the host's generic item-use pathway, or shears nearby entities.
pub(crate) struct InteractionPipeline;

impl InteractionPipeline {
    /// Override first, then a block rule's kind, then capability inference.
    fn kind(run: &Run<'_>, registry: &dyn BlockRegistry) -> InteractionKind {
        if let Some(kind) = run.ctx.kind_override() {
            return kind;
        }
        let tool = run.ctx.held_item();
        run.rules
            .find_block(tool, run.ctx.origin_state(), ActionType::Interaction, registry)
            .and_then(|rule| rule.kind())
            .unwrap_or_else(|| {
                InteractionKind::infer(
                    tool.capabilities(),
                    run.filters.is_interactive_item(tool, registry),
                )
            })
    }

    fn collect_entities(run: &Run<'_>) -> Result<SearchOutcome, Reject> {
        let entities = run.ctx.env().entities()?;
        let budget = run.budget()?;
        let radius = run
            .ctx
            .max_distance()
            .unwrap_or_else(|| run.config.shear_radius());
        let from = run.actor().position;
        let clicked = run.ctx.entity();

        let mut found: Vec<EntityView> = entities
            .entities_near(run.ctx.origin(), radius)
            .into_iter()
            .filter(|entity| entity.alive && entity.shearable)
            .collect();
        // The clicked entity goes first so the budget never drops it.
        found.sort_by_key(|entity| {
            (
                Some(entity.id) != clicked,
                entity.position.distance_squared(from),
                entity.id,
            )
        });
        found.truncate(budget.max_count_usize());

        Ok(SearchOutcome {
            targets: found.into_iter().map(|entity| entity.position).collect(),
            limit: None,
        })
    }

    fn shear(run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let env = run.ctx.env();
        let effects = env.effects()?;
        let entities = env.entities()?;
        let resources = env.resources()?;
        let permissions = run.permissions()?;
        let actor = run.actor();
        let hand = run.ctx.hand();

        let watch = ToolWatch::new(run, resources);
        let mut result = ActionResult::stopped(ActionType::Interaction, StopReason::Completed);
        for pos in targets {
            if watch.is_low() {
                result.stop_reason = StopReason::ToolDurabilityLow;
                break;
            }
            let Some(entity) = entities
                .entities_near(pos, ENTITY_SLACK)
                .into_iter()
                .filter(|entity| entity.alive && entity.shearable)
                .min_by_key(|entity| (entity.position.distance_squared(pos), entity.id))
            else {
                continue;
            };
            if permissions.is_some_and(|gate| !gate.can_interact_with(actor, entity.id)) {
                debug!(target: "chain::dispatch", %pos, "no permission, skipped");
                continue;
            }

            if effects.shear(actor, entity.id, hand) {
                result.targets.push(pos);
            }
            if watch.is_broken() {
                result.stop_reason = StopReason::ToolBroken;
                break;
            }
        }
        result.durability_used = watch.used();
        Ok(result)
    }

    fn use_on_blocks(run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let env = run.ctx.env();
        let effects = env.effects()?;
        let resources = env.resources()?;
        let permissions = run.permissions()?;
        let actor = run.actor();
        let hand = run.ctx.hand();

        let watch = ToolWatch::new(run, resources);
        let mut result = ActionResult::stopped(ActionType::Interaction, StopReason::Completed);
        for pos in targets {
            if watch.is_low() {
                result.stop_reason = StopReason::ToolDurabilityLow;
                break;
            }
            if permissions.is_some_and(|gate| !gate.can_modify(actor, pos)) {
                debug!(target: "chain::dispatch", %pos, "no permission, skipped");
                continue;
            }

            let item = resources.held_item(actor, hand);
            if effects.use_item_on(actor, pos, hand, &item) {
                result.targets.push(pos);
            }
            if watch.is_broken() {
                result.stop_reason = StopReason::ToolBroken;
                break;
            }
        }
        result.durability_used = watch.used();
        Ok(result)
    }
}

impl Pipeline for InteractionPipeline {
    fn action_type(&self) -> ActionType {
        ActionType::Interaction
    }

    fn pre_validate(&self, run: &Run<'_>) -> Result<(), Reject> {
        let tool = run.ctx.held_item();
        if tool.is_empty() {
            return Err(Reject::Ineligible("nothing held"));
        }
        let registry = run.ctx.env().registry()?;
        let eligible = run.filters.is_interaction_tool(tool, registry)
            || run.filters.is_interactive_item(tool, registry)
            || run.rules.has_rule_for(tool, ActionType::Interaction, registry);
        if !eligible {
            return Err(Reject::Ineligible("item is not an interaction tool"));
        }
        Ok(())
    }

    fn collect(&self, run: &Run<'_>) -> Result<SearchOutcome, Reject> {
        let env = run.ctx.env();
        let registry = env.registry()?;
        let kind = Self::kind(run, registry);
        debug!(target: "chain::dispatch", %kind, "collecting interaction targets");
        if kind.targets_entities() {
            return Self::collect_entities(run);
        }

        let grid = env.blocks()?;
        let target = BlockTarget {
            kind,
            origin: run.ctx.origin_state(),
            item: run.ctx.held_item(),
            grid,
            registry,
            filters: run.filters,
        };
        let budget = run.budget()?;
        let matcher = |_: BlockPos, state: &BlockState| target.accepts(state);
        let outcome = run.search(
            &Connected::new(Neighborhood::FromBudget, Expansion::Area),
            run.ctx.origin(),
            run.ctx.origin_state(),
            &budget,
            &matcher,
        )?;
        Ok(with_origin(
            outcome,
            run.ctx.origin(),
            target.accepts(run.ctx.origin_state()),
            budget.max_count(),
        ))
    }

    fn execute(&self, run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let kind = Self::kind(run, run.ctx.env().registry()?);
        if kind.targets_entities() {
            Self::shear(run, targets)
        } else {
            Self::use_on_blocks(run, targets)
        }
    }
}

/// Per-kind predicate over candidate blocks.
struct BlockTarget<'a> {
    kind: InteractionKind,
    origin: &'a BlockState,
    item: &'a ItemStack,
    grid: &'a dyn BlockLookup,
    registry: &'a dyn BlockRegistry,
    filters: &'a FilterRegistry,
}

impl BlockTarget<'_> {
    fn accepts(&self, state: &BlockState) -> bool {
        if self.grid.is_empty(state) {
            return false;
        }
        let registry = self.registry;
        match self.kind {
            InteractionKind::Tilling => has_any_tag(registry, state, &[tag::DIRT, tag::TILLABLE]),
            InteractionKind::Stripping => has_any_tag(registry, state, &[tag::LOGS]),
            InteractionKind::PathMaking => has_any_tag(registry, state, &[tag::DIRT]),
            InteractionKind::Brushing => {
                has_any_tag(registry, state, &[tag::BRUSHABLE, tag::SUSPICIOUS])
            }
            InteractionKind::GenericItemUse => self.filters.validators_pass(self.item, state),
            InteractionKind::Generic => state.same_block(self.origin),
            InteractionKind::Shearing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryWorld;
    use crate::registry::ResourceId;

    fn id(s: &str) -> ResourceId {
        s.parse().unwrap()
    }

    #[test]
    fn kinds_select_their_blocks() {
        let mut world = MemoryWorld::new();
        world.tag_block(id("grass_block"), id("minecraft:dirt"));
        world.tag_block(id("oak_log"), id("minecraft:logs"));
        let filters = FilterRegistry::new();
        let origin = BlockState::new(id("grass_block"));
        let hoe = ItemStack::new(id("iron_hoe"), 1);

        let target = |kind| BlockTarget {
            kind,
            origin: &origin,
            item: &hoe,
            grid: &world,
            registry: &world,
            filters: &filters,
        };
        let grass = BlockState::new(id("grass_block"));
        let log = BlockState::new(id("oak_log"));

        assert!(target(InteractionKind::Tilling).accepts(&grass));
        assert!(!target(InteractionKind::Tilling).accepts(&log));
        assert!(target(InteractionKind::Stripping).accepts(&log));
        assert!(target(InteractionKind::Generic).accepts(&grass));
        assert!(!target(InteractionKind::Generic).accepts(&log));
        assert!(!target(InteractionKind::GenericItemUse).accepts(&world.air()));
    }
}
