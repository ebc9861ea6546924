use crate::action::{Actor, ActorId, EntityId, Hand, ItemStack};
use crate::geom::BlockPos;
use crate::registry::ResourceId;

/// Host-owned resource counters of an actor.
///
/// Every query reads live state: the execution loop calls these between
/// targets to observe the effect of the targets already processed. Tool wear
/// is not applied here; the host charges it inside the block and entity
/// effects themselves.
pub trait ActorResources {
    fn held_item(&self, actor: &Actor, hand: Hand) -> ItemStack;

    /// Remaining uses of the held item, `None` when it cannot be damaged.
    fn durability(&self, actor: &Actor, hand: Hand) -> Option<u32>;

    fn food_level(&self, actor: &Actor) -> u32;

    fn add_exhaustion(&self, actor: &Actor, amount: f32);

    fn item_count(&self, actor: &Actor, item: &ResourceId) -> u32;

    /// Removes up to `amount` items and returns how many were removed.
    fn consume(&self, actor: &Actor, item: &ResourceId, amount: u32) -> u32;

    /// Hands items to the actor; the host drops whatever does not fit.
    fn give(&self, actor: &Actor, items: Vec<ItemStack>);

    fn give_experience(&self, actor: &Actor, amount: u32);
}

pub trait PermissionGate {
    fn can_modify(&self, actor: &Actor, pos: BlockPos) -> bool;

    fn can_interact_with(&self, _actor: &Actor, _entity: EntityId) -> bool {
        true
    }
}

/// External state store toggled by a client-originated trigger signal.
pub trait ActivationGate {
    fn is_triggered(&self, actor: ActorId) -> bool;

    /// Per-actor shape selection, overriding the configured shape.
    fn selected_shape(&self, _actor: ActorId) -> Option<String> {
        None
    }

    /// Per-actor preference for pulling mined drops to the actor.
    fn collect_drops(&self, _actor: ActorId) -> Option<bool> {
        None
    }

    /// Per-actor preference for pulling experience to the actor.
    fn collect_experience(&self, _actor: ActorId) -> Option<bool> {
        None
    }
}
