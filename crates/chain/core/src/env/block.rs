use crate::action::ItemStack;
use crate::geom::BlockPos;
use crate::registry::ResourceId;

/// Opaque handle the host returns for a coordinate.
///
/// The engine compares states for matching only. `data` is a host-defined
/// variant (crop age, axis, ...) that the engine never interprets; maturity
/// and emptiness are answered by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockState {
    block: ResourceId,
    #[cfg_attr(feature = "serde", serde(default))]
    data: u32,
}

impl BlockState {
    pub fn new(block: ResourceId) -> Self {
        Self { block, data: 0 }
    }

    pub fn with_data(block: ResourceId, data: u32) -> Self {
        Self { block, data }
    }

    pub fn block(&self) -> &ResourceId {
        &self.block
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    /// Same block kind, ignoring the variant.
    pub fn same_block(&self, other: &Self) -> bool {
        self.block == other.block
    }
}

/// Read access to the host grid.
pub trait BlockLookup {
    fn block_state(&self, pos: BlockPos) -> BlockState;

    /// Whether `state` is air (or any other "nothing here" state).
    fn is_empty(&self, state: &BlockState) -> bool;

    fn is_empty_at(&self, pos: BlockPos) -> bool {
        self.is_empty(&self.block_state(pos))
    }
}

/// Host block and item registry queries.
pub trait BlockRegistry {
    fn block_has_tag(&self, state: &BlockState, tag: &ResourceId) -> bool;

    fn item_has_tag(&self, item: &ResourceId, tag: &ResourceId) -> bool;

    fn entity_has_tag(&self, _entity: &ResourceId, _tag: &ResourceId) -> bool {
        false
    }

    /// Whether `tool` makes `state` yield drops. Blocks that need no
    /// particular tool return `true` for any item.
    fn can_harvest(&self, tool: &ItemStack, state: &BlockState) -> bool;

    /// Whether a crop has reached its final growth stage.
    fn is_mature(&self, state: &BlockState) -> bool;

    /// Whether `item` places a plant when used on a surface.
    fn is_plantable(&self, item: &ItemStack) -> bool;

    /// Whether the plant placed by `item` could survive at `pos`.
    fn can_survive(&self, item: &ItemStack, pos: BlockPos) -> bool;

    /// The young state and seed item that regrow `crop`, if it can be replanted.
    fn replant(&self, crop: &BlockState) -> Option<Replant>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replant {
    pub seed: ResourceId,
    pub state: BlockState,
}
