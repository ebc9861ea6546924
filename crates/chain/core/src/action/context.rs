use super::{ActionType, Actor, EntityId, Hand, InteractionKind, ItemStack};
use crate::env::{BlockState, EntityView, HostEnv, OracleError};
use crate::error::{ChainError, ErrorSeverity};
use crate::geom::BlockPos;

/// Frozen request for one chain action.
///
/// Built once through [`ActionContext::builder`] and never mutated; the
/// dispatcher only reads it.
#[derive(Clone, Debug)]
pub struct ActionContext<'a> {
    env: HostEnv<'a>,
    actor: Actor,
    origin: BlockPos,
    origin_state: BlockState,
    action_type: ActionType,
    kind_override: Option<InteractionKind>,
    held_item: ItemStack,
    hand: Hand,
    max_count: Option<u32>,
    max_distance: Option<u32>,
    shape: Option<String>,
    skip_permission_check: bool,
    entity: Option<EntityId>,
}

impl<'a> ActionContext<'a> {
    pub fn builder(env: HostEnv<'a>, actor: Actor, action_type: ActionType) -> ActionContextBuilder<'a> {
        ActionContextBuilder::new(env, actor, action_type)
    }

    /// Interaction aimed at an entity, pinned to [`InteractionKind::Shearing`].
    ///
    /// The search is centred on the entity's position.
    pub fn for_entity_interaction(
        env: HostEnv<'a>,
        actor: Actor,
        entity: &EntityView,
        hand: Hand,
    ) -> Result<Self, ContextError> {
        Self::builder(env, actor, ActionType::Interaction)
            .origin(entity.position)
            .hand(hand)
            .kind(InteractionKind::Shearing)
            .entity(entity.id)
            .build()
    }

    pub fn env(&self) -> &HostEnv<'a> {
        &self.env
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    /// Snapshot of the origin taken when the context was built.
    pub fn origin_state(&self) -> &BlockState {
        &self.origin_state
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn kind_override(&self) -> Option<InteractionKind> {
        self.kind_override
    }

    pub fn held_item(&self) -> &ItemStack {
        &self.held_item
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn max_count(&self) -> Option<u32> {
        self.max_count
    }

    pub fn max_distance(&self) -> Option<u32> {
        self.max_distance
    }

    pub fn shape(&self) -> Option<&str> {
        self.shape.as_deref()
    }

    pub fn skip_permission_check(&self) -> bool {
        self.skip_permission_check
    }

    /// The entity an entity-targeted interaction was started on.
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn is_unrestricted(&self) -> bool {
        self.actor.unrestricted
    }
}

pub struct ActionContextBuilder<'a> {
    env: HostEnv<'a>,
    actor: Actor,
    action_type: ActionType,
    origin: Option<BlockPos>,
    origin_state: Option<BlockState>,
    kind_override: Option<InteractionKind>,
    held_item: Option<ItemStack>,
    hand: Hand,
    max_count: Option<u32>,
    max_distance: Option<u32>,
    shape: Option<String>,
    skip_permission_check: bool,
    entity: Option<EntityId>,
}

impl<'a> ActionContextBuilder<'a> {
    fn new(env: HostEnv<'a>, actor: Actor, action_type: ActionType) -> Self {
        Self {
            env,
            actor,
            action_type,
            origin: None,
            origin_state: None,
            kind_override: None,
            held_item: None,
            hand: Hand::Main,
            max_count: None,
            max_distance: None,
            shape: None,
            skip_permission_check: false,
            entity: None,
        }
    }

    pub fn origin(mut self, origin: BlockPos) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Origin state snapshot. Read from the grid when omitted.
    pub fn origin_state(mut self, state: BlockState) -> Self {
        self.origin_state = Some(state);
        self
    }

    pub fn kind(mut self, kind: InteractionKind) -> Self {
        self.kind_override = Some(kind);
        self
    }

    /// Held item snapshot. Read from the actor's hand when omitted.
    pub fn held_item(mut self, item: ItemStack) -> Self {
        self.held_item = Some(item);
        self
    }

    pub fn hand(mut self, hand: Hand) -> Self {
        self.hand = hand;
        self
    }

    pub fn max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn skip_permission_check(mut self, skip: bool) -> Self {
        self.skip_permission_check = skip;
        self
    }

    pub fn entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    /// # Errors
    ///
    /// Fails when the origin is missing, an override is zero, or a snapshot
    /// has to be read from a host collaborator that was not provided.
    pub fn build(self) -> Result<ActionContext<'a>, ContextError> {
        let origin = self.origin.ok_or(ContextError::MissingOrigin)?;
        if self.max_count == Some(0) {
            return Err(ContextError::ZeroOverride("max_count"));
        }
        if self.max_distance == Some(0) {
            return Err(ContextError::ZeroOverride("max_distance"));
        }

        let origin_state = match self.origin_state {
            Some(state) => state,
            None => self.env.blocks()?.block_state(origin),
        };
        let held_item = match self.held_item {
            Some(item) => item,
            None => self.env.resources()?.held_item(&self.actor, self.hand),
        };

        Ok(ActionContext {
            env: self.env,
            actor: self.actor,
            origin,
            origin_state,
            action_type: self.action_type,
            kind_override: self.kind_override,
            held_item,
            hand: self.hand,
            max_count: self.max_count,
            max_distance: self.max_distance,
            shape: self.shape,
            skip_permission_check: self.skip_permission_check,
            entity: self.entity,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("action context needs an origin")]
    MissingOrigin,

    #[error("override `{0}` must be greater than zero")]
    ZeroOverride(&'static str),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl ChainError for ContextError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingOrigin | Self::ZeroOverride(_) => ErrorSeverity::Validation,
            Self::Oracle(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingOrigin => "CONTEXT_MISSING_ORIGIN",
            Self::ZeroOverride(_) => "CONTEXT_ZERO_OVERRIDE",
            Self::Oracle(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActorId;
    use crate::env::memory::{ActorSlot, MemoryWorld};
    use crate::registry::ResourceId;

    fn id(s: &str) -> ResourceId {
        s.parse().unwrap()
    }

    #[test]
    fn snapshots_are_read_from_the_host() {
        let mut world = MemoryWorld::new();
        let stone = BlockState::new(id("stone"));
        world.set_block(BlockPos::new(0, 64, 0), stone.clone());
        world.add_actor(ActorId(1), ActorSlot::holding(ItemStack::new(id("stone_pickaxe"), 1), Some(10)));

        let actor = Actor::new(ActorId(1), BlockPos::new(0, 65, 2));
        let ctx = ActionContext::builder(HostEnv::with_all(&world), actor, ActionType::Mining)
            .origin(BlockPos::new(0, 64, 0))
            .build()
            .unwrap();

        assert_eq!(ctx.origin_state(), &stone);
        assert_eq!(ctx.held_item().item(), Some(&id("stone_pickaxe")));
        assert_eq!(ctx.hand(), Hand::Main);
        assert!(!ctx.skip_permission_check());
    }

    #[test]
    fn missing_inputs_are_errors() {
        let actor = Actor::new(ActorId(1), BlockPos::ORIGIN);
        let err = ActionContext::builder(HostEnv::empty(), actor, ActionType::Mining)
            .build()
            .unwrap_err();
        assert_eq!(err, ContextError::MissingOrigin);

        let err = ActionContext::builder(HostEnv::empty(), actor, ActionType::Mining)
            .origin(BlockPos::ORIGIN)
            .build()
            .unwrap_err();
        assert_eq!(err, ContextError::Oracle(OracleError::BlocksNotAvailable));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);

        let err = ActionContext::builder(HostEnv::empty(), actor, ActionType::Mining)
            .origin(BlockPos::ORIGIN)
            .max_count(0)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "CONTEXT_ZERO_OVERRIDE");
    }

    #[test]
    fn entity_interaction_pins_shearing() {
        let world = MemoryWorld::new();
        let sheep = EntityView {
            id: EntityId(7),
            kind: id("sheep"),
            position: BlockPos::new(3, 64, 3),
            alive: true,
            shearable: true,
        };
        let actor = Actor::new(ActorId(1), BlockPos::new(0, 64, 0));
        let ctx = ActionContext::for_entity_interaction(HostEnv::with_all(&world), actor, &sheep, Hand::Main)
            .unwrap();
        assert_eq!(ctx.kind_override(), Some(InteractionKind::Shearing));
        assert_eq!(ctx.entity(), Some(EntityId(7)));
        assert_eq!(ctx.origin(), sheep.position);
    }
}
