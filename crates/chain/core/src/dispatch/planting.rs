//! Chain planting onto empty cells the held seed can survive in.

use tracing::debug;

use super::pipeline::{Pipeline, Reject, Run, has_any_tag, tag, with_origin};
use crate::action::{ActionResult, ActionType, ItemStack, StopReason};
use crate::env::{BlockLookup, BlockRegistry, BlockState};
use crate::geom::BlockPos;
use crate::registry::Selector;
use crate::shape::{Connected, Expansion, Neighborhood, SearchOutcome};

/// Chain planting: places the held seed on every valid site around the
/// clicked surface, one seed per site.
pub(crate) struct PlantingPipeline;

impl PlantingPipeline {
    /// The clicked block is the supporting surface; sites start one above it
    /// unless the click landed on an empty cell.
    fn start(run: &Run<'_>, grid: &dyn BlockLookup) -> BlockPos {
        let origin = run.ctx.origin();
        if grid.is_empty(run.ctx.origin_state()) {
            origin
        } else {
            origin.above()
        }
    }
}

impl Pipeline for PlantingPipeline {
    fn action_type(&self) -> ActionType {
        ActionType::Planting
    }

    fn pre_validate(&self, run: &Run<'_>) -> Result<(), Reject> {
        let registry = run.ctx.env().registry()?;
        if !run.filters.is_plantable(run.ctx.held_item(), registry) {
            return Err(Reject::Ineligible("item is not plantable"));
        }
        Ok(())
    }

    fn collect(&self, run: &Run<'_>) -> Result<SearchOutcome, Reject> {
        let env = run.ctx.env();
        let grid = env.blocks()?;
        let site = Site {
            item: run.ctx.held_item(),
            grid,
            registry: env.registry()?,
            farmland: run.config.farmland_selectors(),
        };

        let start = Self::start(run, grid);
        let start_state = grid.block_state(start);
        let budget = run.budget()?;
        let matcher = |pos: BlockPos, state: &BlockState| site.accepts(pos, state);
        let outcome = run.search(
            &Connected::new(Neighborhood::Horizontal, Expansion::Area),
            start,
            &start_state,
            &budget,
            &matcher,
        )?;
        Ok(with_origin(
            outcome,
            start,
            site.accepts(start, &start_state),
            budget.max_count(),
        ))
    }

    fn execute(&self, run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject> {
        let env = run.ctx.env();
        let effects = env.effects()?;
        let resources = env.resources()?;
        let permissions = run.permissions()?;
        let actor = run.actor();
        let hand = run.ctx.hand();
        let item = run.ctx.held_item();
        let Some(seed) = item.item() else {
            return Err(Reject::Ineligible("nothing held"));
        };

        let mut result = ActionResult::stopped(ActionType::Planting, StopReason::Completed);
        for pos in targets {
            if !run.unrestricted() && resources.item_count(actor, seed) == 0 {
                result.stop_reason = StopReason::ItemsExhausted;
                break;
            }
            if permissions.is_some_and(|gate| !gate.can_modify(actor, pos)) {
                debug!(target: "chain::dispatch", %pos, "no permission, skipped");
                continue;
            }
            if effects.use_item_on(actor, pos.below(), hand, item) {
                result.targets.push(pos);
            }
        }
        Ok(result)
    }
}

/// Whether a cell can take the held seed.
struct Site<'a> {
    item: &'a ItemStack,
    grid: &'a dyn BlockLookup,
    registry: &'a dyn BlockRegistry,
    /// Accepted surfaces below a site; empty means the dirt and farmland tags.
    farmland: Vec<Selector>,
}

impl Site<'_> {
    fn accepts(&self, pos: BlockPos, state: &BlockState) -> bool {
        self.grid.is_empty(state)
            && self.registry.can_survive(self.item, pos)
            && self.is_farmland(&self.grid.block_state(pos.below()))
    }

    fn is_farmland(&self, below: &BlockState) -> bool {
        if self.farmland.is_empty() {
            return has_any_tag(self.registry, below, &[tag::DIRT, tag::FARMLAND]);
        }
        self.farmland.iter().any(|selector| {
            selector.matches(below.block(), |t| self.registry.block_has_tag(below, t))
        })
    }
}
