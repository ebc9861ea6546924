//! Chain-action engine: one player action, many voxels.
//!
//! `chain-core` takes a single triggered action (breaking a block, using a
//! tool on one, planting or harvesting), discovers the bounded set of further
//! voxels that belong to the same action, executes the action on each through
//! the host, and reports an aggregate [`ActionResult`]. Every world, inventory
//! and permission query goes through the host traits in [`env`]; the crate
//! itself performs no I/O.
//!
//! All requests flow through [`Dispatcher::dispatch`].
pub mod action;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod event;
pub mod geom;
pub mod registry;
pub mod shape;

pub use action::{
    ActionContext, ActionContextBuilder, ActionResult, ActionType, Actor, ActorId, ContextError,
    EntityId, Hand, InteractionKind, ItemStack, StopReason, ToolCapabilities,
};
pub use config::{ChainConfig, ConfigError};
pub use dispatch::{Dispatcher, DispatcherBuilder, is_dispatching};
pub use env::{
    ActivationGate, ActivationStore, ActorActivation, ActorResources, BlockLookup, BlockRegistry,
    BlockState, EffectSimulator, EntityLookup, EntityView, Host, HostEnv, LooseYield, OracleError,
    PermissionGate, Replant,
};
pub use error::{ChainError, ErrorSeverity};
pub use event::{EventBus, ListenerError, ListenerId, PostActionEvent, PreActionEvent};
pub use geom::{BlockBox, BlockPos, Direction, Facing};
pub use registry::{
    FilterEntries, FilterList, FilterRegistry, IdError, InteractionValidator, Pattern,
    ResourceId, RuleRegistry, Selector, SelectorError, TargetKind, ToolRule,
};
pub use shape::{
    BlockMatcher, BudgetError, Column, Connected, CrossSection, Cuboid, DistanceMetric,
    Expansion, MatchMode, Matcher, Neighborhood, Plane, SearchBudget, SearchLimit, SearchMeter,
    SearchOutcome, Shaft, ShaftSlope, ShapeContext, ShapeRegistry, ShapeStrategy, Tunnel,
};
