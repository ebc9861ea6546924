//! Chain mining.
//!
//! The host has already broken the origin when a mining request arrives, so
//! the origin is never a target here. Eligibility checks run in this order:
//!
//! - **Origin**: must be non-empty and allowed, either by a tool rule or by
//!   the block filter list (deny wins).
//! - **Tool**: must be allowed by the tool list or named by a mining rule.
//! - **Harvest**: a non-empty tool must be able to harvest the origin block.
//!
//! Execution breaks targets in order through the host's break pathway and
//! re-reads tool durability and food level before each one. Drops and
//! experience are swept afterwards from the box around the mined area.

use tracing::debug;

use super::pipeline::{Pipeline, Reject, Run, ToolWatch};
use crate::action::{ActionResult, ActionType, StopReason};
use crate::geom::{BlockBox, BlockPos};
use crate::shape::{BlockMatcher, MatchMode, SearchOutcome};

/// Loose drops are collected from the mined area grown by this margin.
const COLLECT_MARGIN: i32 = 2;

/// Chain mining: breaks every connected matching block through the host's
/// real break pathway.
pub(crate) struct MiningPipeline;

impl Pipeline for MiningPipeline {
    fn action_type(&self) -> ActionType {
        ActionType::Mining
    }

    fn pre_validate(&self, run: &Run<'_>) -> Result<(), Reject> {
        let env = run.ctx.env();
        let registry = env.registry()?;
        let origin = run.ctx.origin_state();
        let tool = run.ctx.held_item();

        if env.blocks()?.is_empty(origin) {
            return Err(Reject::Ineligible("origin is empty"));
        }
        let rule = run.rules.find_block(tool, origin, ActionType::Mining, registry);
        if rule.is_none() && !run.filters.is_block_allowed(origin, registry, run.config.mine_all_blocks) {
            return Err(Reject::Ineligible("origin block not allowed"));
        }
        let tool_allowed = run.filters.is_tool_allowed(tool, registry, run.config.allow_bare_hand)
            || run.rules.has_rule_for(tool, ActionType::Mining, registry);
        if !tool_allowed {
            return Err(Reject::Ineligible("tool not allowed"));
        }
        if !tool.is_empty() && !registry.can_harvest(tool, origin) {
            return Err(Reject::Ineligible("tool cannot harvest origin"));
        }
        Ok(())
    }

    fn collect(&self, run: &Run<'_>) -> Result<SearchOutcome, Reject> {
        let env = run.ctx.env();
        let selected = match run.ctx.shape() {
            Some(shape) => shape.to_owned(),
            None => env
                .activation()?
                .selected_shape(run.actor().id)
                .unwrap_or_else(|| run.config.shape.clone()),
        };
        let strategy = run.shapes.get_or_default(&selected).ok_or(Reject::NoShape)?;

        let mode = if run.config.strict_matching {
            MatchMode::Exact
        } else {
            MatchMode::Loose
        };
        let matcher = BlockMatcher::new(
            run.ctx.origin_state().clone(),
            mode,
            env.blocks()?,
            env.registry()?,
            run.filters,
        );
        let budget = run.budget()?;
        debug!(
            target: "chain::dispatch",
            shape = strategy.id(),
            %mode,
            max_count = budget.max_count(),
            max_distance = budget.max_distance(),
            "collecting mining targets"
        );
        Ok(run.search(
            &*strategy,
            run.ctx.origin(),
            run.ctx.origin_state(),
            &budget,
            &matcher,
        )?)
    }

    fn execute(&self, run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let env = run.ctx.env();
        let effects = env.effects()?;
        let resources = env.resources()?;
        let activation = env.activation()?;
        let permissions = run.permissions()?;
        let actor = run.actor();
        let config = run.config;

        let watch = ToolWatch::new(run, resources);
        let charge_hunger = config.consume_hunger && !run.unrestricted();
        let cost = config.hunger_cost();

        let mut result = ActionResult::stopped(self.action_type(), StopReason::Completed);
        for pos in targets {
            if watch.is_low() {
                result.stop_reason = StopReason::ToolDurabilityLow;
                break;
            }
            if charge_hunger && resources.food_level(actor) <= config.min_hunger_level {
                result.stop_reason = StopReason::HungerLow;
                break;
            }
            if permissions.is_some_and(|gate| !gate.can_modify(actor, pos)) {
                debug!(target: "chain::dispatch", %pos, "no permission, skipped");
                continue;
            }

            if effects.remove_block(actor, pos) {
                result.targets.push(pos);
                if charge_hunger && cost > 0.0 {
                    resources.add_exhaustion(actor, cost);
                    result.hunger_used += cost;
                }
            }
            if watch.is_broken() {
                result.stop_reason = StopReason::ToolBroken;
                break;
            }
        }
        result.durability_used = watch.used();

        let collect_items = activation
            .collect_drops(actor.id)
            .unwrap_or(config.collect_drops);
        let collect_experience = activation
            .collect_experience(actor.id)
            .unwrap_or(config.collect_experience);
        let origin = run.ctx.origin();
        if (collect_items || collect_experience)
            && !result.targets.is_empty()
            && let Some(area) = BlockBox::enclosing(std::iter::once(&origin).chain(&result.targets))
        {
            let loose = effects.collect_loose(area.inflate(COLLECT_MARGIN), collect_items, collect_experience);
            if !loose.items.is_empty() {
                resources.give(actor, loose.items.clone());
            }
            if loose.experience > 0 {
                resources.give_experience(actor, loose.experience);
            }
            result.yields = loose.items;
            result.experience = loose.experience;
        }

        Ok(result)
    }
}
