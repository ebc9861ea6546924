use crate::action::{Actor, EntityId, Hand, ItemStack};
use crate::env::BlockState;
use crate::geom::{BlockBox, BlockPos};
use crate::registry::ResourceId;

/// Mutations the engine asks the host to perform.
///
/// Every method goes through the host's real pathway (break pipeline, item
/// use, entity capability). Implementations may re-enter the dispatcher;
/// such calls are refused.
pub trait EffectSimulator {
    /// Breaks the block as if the actor mined it: drops, tool wear, signals.
    fn remove_block(&self, actor: &Actor, pos: BlockPos) -> bool;

    fn use_item_on(&self, actor: &Actor, pos: BlockPos, hand: Hand, item: &ItemStack) -> bool;

    /// Removes a matured block directly and returns its drops.
    ///
    /// Returns `None` when nothing was removed.
    fn harvest(&self, actor: &Actor, pos: BlockPos) -> Option<Vec<ItemStack>>;

    fn place_block(&self, pos: BlockPos, state: &BlockState) -> bool;

    fn drop_items(&self, pos: BlockPos, items: Vec<ItemStack>);

    fn shear(&self, actor: &Actor, entity: EntityId, hand: Hand) -> bool;

    /// Picks up loose item and experience entities inside `area`.
    fn collect_loose(&self, area: BlockBox, items: bool, experience: bool) -> LooseYield;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LooseYield {
    pub items: Vec<ItemStack>,
    pub experience: u32,
}

/// Snapshot of an entity near the interaction origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: ResourceId,
    pub position: BlockPos,
    pub alive: bool,
    /// Ready to be sheared right now.
    pub shearable: bool,
}

pub trait EntityLookup {
    /// Entities whose position lies within `radius` (per axis) of `center`.
    fn entities_near(&self, center: BlockPos, radius: u32) -> Vec<EntityView>;
}
