//! The single entry point of the engine.
//!
//! [`Dispatcher::dispatch`] validates a request, collects its targets, lets
//! pre-action listeners cancel or rewrite them, runs the per-action execution
//! loop and reports an [`ActionResult`]. It never returns an error: every
//! failure is a [`StopReason`].
mod guard;
mod harvesting;
mod interaction;
mod mining;
mod pipeline;
mod planting;

pub use guard::is_dispatching;

use std::sync::{Arc, RwLock};

use tracing::{debug, error, warn};

use self::guard::DispatchGuard;
use self::harvesting::HarvestingPipeline;
use self::interaction::InteractionPipeline;
use self::mining::MiningPipeline;
use self::pipeline::{Pipeline, Reject, Run};
use self::planting::PlantingPipeline;
use crate::action::{ActionContext, ActionResult, ActionType, StopReason};
use crate::config::ChainConfig;
use crate::event::{EventBus, PostActionEvent, PreActionEvent};
use crate::registry::{FilterRegistry, RuleRegistry};
use crate::shape::ShapeRegistry;

/// Owns the injected registries and the configuration snapshot every
/// dispatch reads.
///
/// The dispatcher holds no per-call state. One instance may serve several
/// threads; each dispatch takes a copy of the configuration when it starts.
pub struct Dispatcher {
    config: RwLock<ChainConfig>,
    filters: Arc<FilterRegistry>,
    rules: Arc<RuleRegistry>,
    shapes: Arc<ShapeRegistry>,
    events: Arc<EventBus>,
}

impl Dispatcher {
    /// Dispatcher with empty filter and rule registries and the builtin shapes.
    pub fn new(config: ChainConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Replaces the configuration. Out-of-range values are clamped.
    pub fn update_config(&self, config: ChainConfig) {
        let config = config.validated();
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => {
                error!(target: "chain::dispatch", "config lock poisoned; overwriting");
                *poisoned.into_inner() = config;
            }
        }
    }

    pub fn config(&self) -> ChainConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn filters(&self) -> &Arc<FilterRegistry> {
        &self.filters
    }

    pub fn rules(&self) -> &Arc<RuleRegistry> {
        &self.rules
    }

    pub fn shapes(&self) -> &Arc<ShapeRegistry> {
        &self.shapes
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Runs one chain action to completion.
    ///
    /// A call made while the same thread is already dispatching (for example
    /// from inside a host effect) returns [`StopReason::Error`] immediately.
    pub fn dispatch(&self, ctx: &ActionContext<'_>) -> ActionResult {
        let action = ctx.action_type();
        let Some(_guard) = DispatchGuard::acquire() else {
            warn!(
                target: "chain::dispatch",
                %action,
                actor = %ctx.actor().id,
                origin = %ctx.origin(),
                "reentrant dispatch refused"
            );
            return ActionResult::stopped(action, StopReason::Error);
        };

        let config = self.config();
        debug!(
            target: "chain::dispatch",
            %action,
            actor = %ctx.actor().id,
            origin = %ctx.origin(),
            "dispatch started"
        );

        let result = match self.run(ctx, &config) {
            Ok(result) => result,
            Err(reject) => {
                debug!(
                    target: "chain::dispatch",
                    %action,
                    reason = %reject,
                    "dispatch rejected"
                );
                ActionResult::stopped(action, reject.stop_reason())
            }
        };

        debug!(
            target: "chain::dispatch",
            %action,
            targets = result.total_count(),
            stop = %result.stop_reason(),
            "dispatch finished"
        );
        result
    }

    fn run(&self, ctx: &ActionContext<'_>, config: &ChainConfig) -> Result<ActionResult, Reject> {
        let action = ctx.action_type();
        if !config.is_enabled(action) {
            return Err(Reject::Ineligible("action disabled"));
        }
        if !ctx.env().activation()?.is_triggered(ctx.actor().id) {
            return Err(Reject::Ineligible("activation not held"));
        }

        let run = Run {
            ctx,
            config,
            filters: &self.filters,
            rules: &self.rules,
            shapes: &self.shapes,
        };
        let pipeline = pipeline_for(action);
        pipeline.pre_validate(&run)?;

        let outcome = pipeline.collect(&run)?;
        if outcome.targets.is_empty() {
            let mut result = ActionResult::stopped(action, StopReason::Completed);
            result.search_limit = outcome.limit;
            return Ok(result);
        }

        let mut event = PreActionEvent::new(ctx, outcome.targets);
        self.events.fire_pre(&mut event);
        if event.is_cancelled() {
            debug!(
                target: "chain::dispatch",
                %action,
                reason = event.cancel_reason().unwrap_or("none"),
                "cancelled by listener"
            );
            return Ok(ActionResult::stopped(action, StopReason::EventCancelled));
        }

        let mut result = pipeline.execute(&run, event.into_targets())?;
        result.search_limit = outcome.limit;

        self.events.fire_post(&PostActionEvent::new(ctx, &result));
        Ok(result)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("filters", &self.filters)
            .field("rules", &self.rules.len())
            .field("shapes", &self.shapes)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

fn pipeline_for(action: ActionType) -> &'static dyn Pipeline {
    match action {
        ActionType::Mining => &MiningPipeline,
        ActionType::Interaction => &InteractionPipeline,
        ActionType::Planting => &PlantingPipeline,
        ActionType::Harvesting => &HarvestingPipeline,
    }
}

/// Builder for [`Dispatcher`]. Registries left unset start empty (shapes
/// start with the builtins).
pub struct DispatcherBuilder {
    config: ChainConfig,
    filters: Option<Arc<FilterRegistry>>,
    rules: Option<Arc<RuleRegistry>>,
    shapes: Option<Arc<ShapeRegistry>>,
    events: Option<Arc<EventBus>>,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self {
            config: ChainConfig::default(),
            filters: None,
            rules: None,
            shapes: None,
            events: None,
        }
    }

    pub fn config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn filters(mut self, filters: Arc<FilterRegistry>) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn rules(mut self, rules: Arc<RuleRegistry>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn shapes(mut self, shapes: Arc<ShapeRegistry>) -> Self {
        self.shapes = Some(shapes);
        self
    }

    pub fn events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            config: RwLock::new(self.config.validated()),
            filters: self.filters.unwrap_or_default(),
            rules: self.rules.unwrap_or_default(),
            shapes: self.shapes.unwrap_or_default(),
            events: self.events.unwrap_or_default(),
        }
    }
}
