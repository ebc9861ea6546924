use tracing::debug;

use super::pipeline::{Pipeline, Reject, Run, take_one, with_origin};
use crate::action::{ActionResult, ActionType, ItemStack, StopReason};
use crate::env::BlockState;
use crate::geom::BlockPos;
use crate::shape::{Connected, Expansion, Neighborhood, SearchOutcome};

/// Chain harvesting: gathers every mature crop of the origin's type in the
/// connected horizontal patch, optionally replanting each one.
pub(crate) struct HarvestingPipeline;

impl Pipeline for HarvestingPipeline {
    fn action_type(&self) -> ActionType {
        ActionType::Harvesting
    }

    fn pre_validate(&self, run: &Run<'_>) -> Result<(), Reject> {
        if !run.ctx.env().registry()?.is_mature(run.ctx.origin_state()) {
            return Err(Reject::Ineligible("origin is not mature"));
        }
        Ok(())
    }

    fn collect(&self, run: &Run<'_>) -> Result<SearchOutcome, Reject> {
        let registry = run.ctx.env().registry()?;
        let origin = run.ctx.origin_state();
        let budget = run.budget()?;
        let matcher =
            |_: BlockPos, state: &BlockState| state.same_block(origin) && registry.is_mature(state);
        let outcome = run.search(
            &Connected::new(Neighborhood::Horizontal, Expansion::Matching),
            run.ctx.origin(),
            origin,
            &budget,
            &matcher,
        )?;
        Ok(with_origin(outcome, run.ctx.origin(), true, budget.max_count()))
    }

    fn execute(&self, run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let env = run.ctx.env();
        let grid = env.blocks()?;
        let registry = env.registry()?;
        let effects = env.effects()?;
        let resources = env.resources()?;
        let activation = env.activation()?;
        let permissions = run.permissions()?;
        let actor = run.actor();
        let config = run.config;
        let origin = run.ctx.origin_state();

        let give_to_actor = activation
            .collect_drops(actor.id)
            .unwrap_or(config.collect_drops);
        let cost = if config.consume_hunger && !run.unrestricted() {
            config.hunger_cost()
        } else {
            0.0
        };

        let mut result = ActionResult::stopped(ActionType::Harvesting, StopReason::Completed);
        for pos in targets {
            let state = grid.block_state(pos);
            if !state.same_block(origin) || !registry.is_mature(&state) {
                continue;
            }
            if permissions.is_some_and(|gate| !gate.can_modify(actor, pos)) {
                debug!(target: "chain::dispatch", %pos, "no permission, skipped");
                continue;
            }
            let Some(mut drops) = effects.harvest(actor, pos) else {
                continue;
            };
            result.targets.push(pos);
            result.hunger_used += cost;

            if config.harvest_replant
                && let Some(replant) = registry.replant(&state)
                && take_one(&mut drops, &replant.seed)
                && !effects.place_block(pos, &replant.state)
            {
                drops.push(ItemStack::new(replant.seed, 1));
            }

            result.yields.extend(drops.iter().cloned());
            if give_to_actor {
                resources.give(actor, drops);
            } else {
                effects.drop_items(pos, drops);
            }
        }

        if result.hunger_used > 0.0 {
            resources.add_exhaustion(actor, result.hunger_used);
        }
        Ok(result)
    }
}
