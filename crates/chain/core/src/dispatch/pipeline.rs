//! Shared plumbing of the per-action pipelines.
//!
//! Each action type implements [`Pipeline`]. The dispatcher drives its
//! stages and owns what surrounds them, such as the trigger and the events. A stage that cannot go on returns a [`Reject`]:
//!
//! - **Ineligible**: the request is well formed but does not qualify and ends
//!   as [`StopReason::EventCancelled`].
//! - **Host / Budget / NoShape**: a collaborator or limit is missing and the
//!   request ends as [`StopReason::Error`].
//!
//! [`Run`] snapshots the request together with the registries, and the free
//! helpers here are the small rules every pipeline shares.

use crate::action::{ActionContext, ActionResult, ActionType, Actor, Hand, StopReason};
use crate::config::ChainConfig;
use crate::env::{ActorResources, BlockRegistry, BlockState, OracleError, PermissionGate};
use crate::geom::BlockPos;
use crate::registry::{FilterRegistry, ResourceId, RuleRegistry};
use crate::shape::{BudgetError, Matcher, SearchBudget, SearchOutcome, ShapeContext, ShapeRegistry};

/// One action type's collection and execution semantics.
///
/// Mirrors a state transition: `pre_validate` reads only, `collect` searches,
/// `execute` mutates the host through its effect pathway.
pub(crate) trait Pipeline {
    fn action_type(&self) -> ActionType;

    /// Eligibility of the request before any search.
    fn pre_validate(&self, _run: &Run<'_>) -> Result<(), Reject> {
        Ok(())
    }

    fn collect(&self, run: &Run<'_>) -> Result<SearchOutcome, Reject>;

    /// Runs the authoritative target list. Effects already applied are never
    /// rolled back when the loop stops early.
    fn execute(&self, run: &Run<'_>, targets: Vec<BlockPos>) -> Result<ActionResult, Reject>;
}

/// Why a request ended before its execution loop.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Reject {
    #[error("not eligible: {0}")]
    Ineligible(&'static str),

    #[error(transparent)]
    Host(#[from] OracleError),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error("no shape strategy registered")]
    NoShape,
}

impl Reject {
    pub(crate) fn stop_reason(&self) -> StopReason {
        match self {
            Self::Ineligible(_) => StopReason::EventCancelled,
            Self::Host(_) | Self::Budget(_) | Self::NoShape => StopReason::Error,
        }
    }
}

/// Everything one dispatch reads: the request and a snapshot of the engine's
/// configuration and registries.
pub(crate) struct Run<'r> {
    pub ctx: &'r ActionContext<'r>,
    pub config: &'r ChainConfig,
    pub filters: &'r FilterRegistry,
    pub rules: &'r RuleRegistry,
    pub shapes: &'r ShapeRegistry,
}

impl<'r> Run<'r> {
    pub fn actor(&self) -> &'r Actor {
        self.ctx.actor()
    }

    pub fn unrestricted(&self) -> bool {
        self.ctx.is_unrestricted()
    }

    /// Configured budget with the request's overrides applied.
    pub fn budget(&self) -> Result<SearchBudget, BudgetError> {
        let mut budget = self.config.budget(self.unrestricted())?;
        if let Some(count) = self.ctx.max_count() {
            budget = budget.with_max_count(count)?;
        }
        if let Some(distance) = self.ctx.max_distance() {
            budget = budget.with_max_distance(distance)?;
        }
        Ok(budget)
    }

    /// `None` when the request skips permission checks.
    pub fn permissions(&self) -> Result<Option<&'r dyn PermissionGate>, OracleError> {
        if self.ctx.skip_permission_check() {
            Ok(None)
        } else {
            self.ctx.env().permissions().map(Some)
        }
    }

    /// Searches with `strategy` around `origin` using `matcher`.
    pub fn search(
        &self,
        strategy: &dyn crate::shape::ShapeStrategy,
        origin: BlockPos,
        origin_state: &BlockState,
        budget: &SearchBudget,
        matcher: &dyn Matcher,
    ) -> Result<SearchOutcome, OracleError> {
        let ctx = ShapeContext {
            grid: self.ctx.env().blocks()?,
            origin,
            origin_state,
            budget,
            matcher,
            facing: self.actor().facing,
        };
        Ok(strategy.collect(&ctx))
    }
}

/// Puts `origin` first when it qualifies, keeping the count budget.
pub(crate) fn with_origin(mut outcome: SearchOutcome, origin: BlockPos, qualifies: bool, max: u32) -> SearchOutcome {
    if qualifies {
        outcome.targets.insert(0, origin);
        outcome
            .targets
            .truncate(usize::try_from(max).unwrap_or(usize::MAX));
    }
    outcome
}

/// Live view of the held tool during an execution loop.
pub(crate) struct ToolWatch<'r> {
    resources: &'r dyn ActorResources,
    actor: &'r Actor,
    hand: Hand,
    had_tool: bool,
    start: Option<u32>,
    stop_when_low: bool,
    preserve: u32,
}

impl<'r> ToolWatch<'r> {
    pub fn new(run: &Run<'r>, resources: &'r dyn ActorResources) -> Self {
        let actor = run.actor();
        let hand = run.ctx.hand();
        let config = run.config;
        Self {
            resources,
            actor,
            hand,
            had_tool: !run.ctx.held_item().is_empty(),
            start: resources.durability(actor, hand),
            stop_when_low: config.consume_durability
                && config.stop_on_low_durability
                && !run.unrestricted(),
            preserve: config.preserve_durability,
        }
    }

    /// Remaining uses are at or below the preserve threshold.
    pub fn is_low(&self) -> bool {
        self.stop_when_low
            && self
                .resources
                .durability(self.actor, self.hand)
                .is_some_and(|left| left <= self.preserve)
    }

    /// The hand held a tool at the start and is empty now.
    pub fn is_broken(&self) -> bool {
        self.had_tool && self.resources.held_item(self.actor, self.hand).is_empty()
    }

    /// Uses consumed since the watch started.
    pub fn used(&self) -> u32 {
        match (self.start, self.resources.durability(self.actor, self.hand)) {
            (Some(start), Some(now)) => start.saturating_sub(now),
            (Some(start), None) if self.is_broken() => start,
            _ => 0,
        }
    }
}

/// Block tags the pipelines test, as `(namespace, path)`.
pub(crate) mod tag {
    pub const DIRT: (&str, &str) = ("minecraft", "dirt");
    pub const LOGS: (&str, &str) = ("minecraft", "logs");
    pub const BRUSHABLE: (&str, &str) = ("minecraft", "brushable");
    pub const SUSPICIOUS: (&str, &str) = ("minecraft", "suspicious_blocks");
    pub const TILLABLE: (&str, &str) = ("c", "tillable");
    pub const FARMLAND: (&str, &str) = ("c", "farmland");
}

pub(crate) fn has_any_tag(registry: &dyn BlockRegistry, state: &BlockState, tags: &[(&str, &str)]) -> bool {
    tags.iter()
        .any(|&(namespace, path)| registry.block_has_tag(state, &ResourceId::known(namespace, path)))
}

/// Removes one `item` from `stacks`. Returns `false` if none was present.
pub(crate) fn take_one(stacks: &mut Vec<crate::action::ItemStack>, item: &ResourceId) -> bool {
    let Some(index) = stacks.iter().position(|s| s.item() == Some(item)) else {
        return false;
    };
    let left = stacks[index].count().saturating_sub(1);
    if left == 0 {
        stacks.remove(index);
    } else {
        stacks[index] = stacks[index].clone().with_count(left);
    }
    true
}
