//! In-memory host.
//!
//! [`MemoryWorld`] implements every host interface over hash maps. It is the
//! fixture host for tests and the backing world of the simulator binary; it
//! is not meant to model a real game faithfully, only deterministically.
//!
//! Setup methods take `&mut self`; once the world is handed to a dispatch it is
//! mutated through interior mutability like a real host would be.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    ActivationGate, ActorResources, BlockLookup, BlockRegistry, BlockState, EffectSimulator,
    EntityLookup, EntityView, LooseYield, PermissionGate, Replant,
};
use crate::action::{Actor, ActorId, EntityId, Hand, ItemStack, ToolCapabilities};
use crate::geom::{BlockBox, BlockPos};
use crate::registry::ResourceId;

/// Resource counters of one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSlot {
    pub main_hand: ItemStack,
    pub off_hand: ItemStack,
    /// Remaining uses of the main-hand item when it is damageable.
    pub durability: Option<u32>,
    pub food_level: u32,
    pub exhaustion: f32,
    pub inventory: HashMap<ResourceId, u32>,
    pub experience: u32,
    /// Items handed over through [`ActorResources::give`].
    pub received: Vec<ItemStack>,
}

impl Default for ActorSlot {
    fn default() -> Self {
        Self {
            main_hand: ItemStack::empty(),
            off_hand: ItemStack::empty(),
            durability: None,
            food_level: MemoryWorld::MAX_FOOD_LEVEL,
            exhaustion: 0.0,
            inventory: HashMap::new(),
            experience: 0,
            received: Vec::new(),
        }
    }
}

impl ActorSlot {
    pub fn holding(item: ItemStack, durability: Option<u32>) -> Self {
        Self {
            main_hand: item,
            durability,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_inventory(mut self, item: ResourceId, count: u32) -> Self {
        *self.inventory.entry(item).or_default() += count;
        self
    }

    #[must_use]
    pub fn with_food_level(mut self, food_level: u32) -> Self {
        self.food_level = food_level;
        self
    }
}

/// Crop growth description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropSpec {
    /// State data at which the crop counts as mature.
    pub mature_at: u32,
    pub seed: ResourceId,
    pub drops: Vec<ItemStack>,
}

/// Block conversion performed by using an item on a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    /// Capabilities the used item must declare; empty accepts any item.
    pub tool: ToolCapabilities,
    pub from: ResourceId,
    pub to: BlockState,
}

/// Effects applied to the world, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectRecord {
    Removed(BlockPos),
    Used(BlockPos),
    Planted(BlockPos),
    Harvested(BlockPos),
    Placed(BlockPos),
    Sheared(EntityId),
}

#[derive(Clone, Debug)]
struct MemoryEntity {
    view: EntityView,
    wool: ItemStack,
}

#[derive(Debug)]
pub struct MemoryWorld {
    blocks: RefCell<HashMap<BlockPos, BlockState>>,
    air: BlockState,
    empty_blocks: HashSet<ResourceId>,
    block_tags: HashMap<ResourceId, HashSet<ResourceId>>,
    item_tags: HashMap<ResourceId, HashSet<ResourceId>>,
    entity_tags: HashMap<ResourceId, HashSet<ResourceId>>,
    tool_requirements: HashMap<ResourceId, ToolCapabilities>,
    crops: HashMap<ResourceId, CropSpec>,
    seeds: HashMap<ResourceId, ResourceId>,
    conversions: Vec<Conversion>,
    drops: HashMap<ResourceId, Vec<ItemStack>>,
    experience: HashMap<ResourceId, u32>,
    denied: RefCell<HashSet<BlockPos>>,
    actors: RefCell<HashMap<ActorId, ActorSlot>>,
    gate: RefCell<HashMap<ActorId, bool>>,
    entities: RefCell<BTreeMap<EntityId, MemoryEntity>>,
    loose_items: RefCell<Vec<(BlockPos, ItemStack)>>,
    loose_experience: RefCell<Vec<(BlockPos, u32)>>,
    log: RefCell<Vec<EffectRecord>>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub const MAX_FOOD_LEVEL: u32 = 20;

    pub fn new() -> Self {
        let air = ResourceId::known(ResourceId::DEFAULT_NAMESPACE, "air");
        let empty_blocks = [
            air.clone(),
            ResourceId::known(ResourceId::DEFAULT_NAMESPACE, "cave_air"),
            ResourceId::known(ResourceId::DEFAULT_NAMESPACE, "void_air"),
        ]
        .into_iter()
        .collect();
        Self {
            blocks: RefCell::default(),
            air: BlockState::new(air),
            empty_blocks,
            block_tags: HashMap::new(),
            item_tags: HashMap::new(),
            entity_tags: HashMap::new(),
            tool_requirements: HashMap::new(),
            crops: HashMap::new(),
            seeds: HashMap::new(),
            conversions: Vec::new(),
            drops: HashMap::new(),
            experience: HashMap::new(),
            denied: RefCell::default(),
            actors: RefCell::default(),
            gate: RefCell::default(),
            entities: RefCell::default(),
            loose_items: RefCell::default(),
            loose_experience: RefCell::default(),
            log: RefCell::default(),
        }
    }

    pub fn air(&self) -> BlockState {
        self.air.clone()
    }

    // ===== setup =====

    pub fn set_block(&mut self, pos: BlockPos, state: BlockState) {
        self.blocks.get_mut().insert(pos, state);
    }

    /// Fills the inclusive box between `a` and `b`.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, state: &BlockState) {
        let blocks = self.blocks.get_mut();
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    blocks.insert(BlockPos::new(x, y, z), state.clone());
                }
            }
        }
    }

    pub fn tag_block(&mut self, block: ResourceId, tag: ResourceId) {
        self.block_tags.entry(block).or_default().insert(tag);
    }

    pub fn tag_item(&mut self, item: ResourceId, tag: ResourceId) {
        self.item_tags.entry(item).or_default().insert(tag);
    }

    pub fn tag_entity(&mut self, entity: ResourceId, tag: ResourceId) {
        self.entity_tags.entry(entity).or_default().insert(tag);
    }

    /// Marks `block` as yielding drops only for tools with one of `tools`.
    pub fn require_tool(&mut self, block: ResourceId, tools: ToolCapabilities) {
        self.tool_requirements.insert(block, tools);
    }

    pub fn add_crop(&mut self, crop: ResourceId, spec: CropSpec) {
        self.seeds.insert(spec.seed.clone(), crop.clone());
        self.crops.insert(crop, spec);
    }

    pub fn add_conversion(&mut self, conversion: Conversion) {
        self.conversions.push(conversion);
    }

    pub fn set_drops(&mut self, block: ResourceId, drops: Vec<ItemStack>) {
        self.drops.insert(block, drops);
    }

    pub fn set_experience(&mut self, block: ResourceId, amount: u32) {
        self.experience.insert(block, amount);
    }

    pub fn deny(&mut self, pos: BlockPos) {
        self.denied.get_mut().insert(pos);
    }

    pub fn add_actor(&mut self, actor: ActorId, slot: ActorSlot) {
        self.actors.get_mut().insert(actor, slot);
    }

    pub fn add_entity(&mut self, view: EntityView, wool: ItemStack) {
        self.entities
            .get_mut()
            .insert(view.id, MemoryEntity { view, wool });
    }

    /// Actors are triggered unless explicitly released.
    pub fn set_triggered(&self, actor: ActorId, triggered: bool) {
        self.gate.borrow_mut().insert(actor, triggered);
    }

    // ===== inspection =====

    pub fn block_at(&self, pos: BlockPos) -> BlockState {
        self.blocks
            .borrow()
            .get(&pos)
            .cloned()
            .unwrap_or_else(|| self.air.clone())
    }

    pub fn count_blocks(&self, block: &ResourceId) -> usize {
        self.blocks
            .borrow()
            .values()
            .filter(|state| state.block() == block)
            .count()
    }

    pub fn actor_slot(&self, actor: ActorId) -> Option<ActorSlot> {
        self.actors.borrow().get(&actor).cloned()
    }

    pub fn effects(&self) -> Vec<EffectRecord> {
        self.log.borrow().clone()
    }

    pub fn loose_items(&self) -> Vec<(BlockPos, ItemStack)> {
        self.loose_items.borrow().clone()
    }

    pub fn entity(&self, id: EntityId) -> Option<EntityView> {
        self.entities.borrow().get(&id).map(|e| e.view.clone())
    }

    // ===== internals =====

    fn with_slot<R>(&self, actor: &Actor, f: impl FnOnce(&mut ActorSlot) -> R) -> R {
        let mut actors = self.actors.borrow_mut();
        f(actors.entry(actor.id).or_default())
    }

    fn read_slot<R>(&self, actor: &Actor, f: impl FnOnce(&ActorSlot) -> R) -> R {
        match self.actors.borrow().get(&actor.id) {
            Some(slot) => f(slot),
            None => f(&ActorSlot::default()),
        }
    }

    fn wear(&self, actor: &Actor, hand: Hand) {
        if hand != Hand::Main {
            return;
        }
        self.with_slot(actor, |slot| {
            if !slot.main_hand.is_damageable() {
                return;
            }
            if let Some(left) = slot.durability {
                let left = left.saturating_sub(1);
                if left == 0 {
                    slot.main_hand = ItemStack::empty();
                    slot.durability = None;
                } else {
                    slot.durability = Some(left);
                }
            }
        });
    }

    fn drops_for(&self, state: &BlockState) -> Vec<ItemStack> {
        self.drops
            .get(state.block())
            .cloned()
            .unwrap_or_else(|| vec![ItemStack::new(state.block().clone(), 1)])
    }

    fn record(&self, effect: EffectRecord) {
        self.log.borrow_mut().push(effect);
    }
}

impl BlockLookup for MemoryWorld {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        self.block_at(pos)
    }

    fn is_empty(&self, state: &BlockState) -> bool {
        self.empty_blocks.contains(state.block())
    }
}

impl BlockRegistry for MemoryWorld {
    fn block_has_tag(&self, state: &BlockState, tag: &ResourceId) -> bool {
        self.block_tags
            .get(state.block())
            .is_some_and(|tags| tags.contains(tag))
    }

    fn item_has_tag(&self, item: &ResourceId, tag: &ResourceId) -> bool {
        self.item_tags
            .get(item)
            .is_some_and(|tags| tags.contains(tag))
    }

    fn entity_has_tag(&self, entity: &ResourceId, tag: &ResourceId) -> bool {
        self.entity_tags
            .get(entity)
            .is_some_and(|tags| tags.contains(tag))
    }

    fn can_harvest(&self, tool: &ItemStack, state: &BlockState) -> bool {
        match self.tool_requirements.get(state.block()) {
            Some(required) => tool.capabilities().intersects(*required),
            None => true,
        }
    }

    fn is_mature(&self, state: &BlockState) -> bool {
        self.crops
            .get(state.block())
            .is_some_and(|crop| state.data() >= crop.mature_at)
    }

    fn is_plantable(&self, item: &ItemStack) -> bool {
        item.item().is_some_and(|id| self.seeds.contains_key(id))
    }

    fn can_survive(&self, _item: &ItemStack, pos: BlockPos) -> bool {
        !self.is_empty_at(pos.below())
    }

    fn replant(&self, crop: &BlockState) -> Option<Replant> {
        let spec = self.crops.get(crop.block())?;
        Some(Replant {
            seed: spec.seed.clone(),
            state: BlockState::new(crop.block().clone()),
        })
    }
}

impl EffectSimulator for MemoryWorld {
    fn remove_block(&self, actor: &Actor, pos: BlockPos) -> bool {
        let state = self.block_at(pos);
        if self.is_empty(&state) {
            return false;
        }
        self.blocks.borrow_mut().remove(&pos);

        let tool = self.read_slot(actor, |slot| slot.main_hand.clone());
        if self.can_harvest(&tool, &state) {
            let drops = self.drops_for(&state);
            self.loose_items
                .borrow_mut()
                .extend(drops.into_iter().map(|item| (pos, item)));
            if let Some(xp) = self.experience.get(state.block()) {
                self.loose_experience.borrow_mut().push((pos, *xp));
            }
        }
        self.wear(actor, Hand::Main);
        self.record(EffectRecord::Removed(pos));
        true
    }

    fn use_item_on(&self, actor: &Actor, pos: BlockPos, hand: Hand, item: &ItemStack) -> bool {
        if let Some(seed) = item.item()
            && let Some(crop) = self.seeds.get(seed)
        {
            let site = pos.above();
            if !self.is_empty_at(site) || self.is_empty_at(pos) {
                return false;
            }
            if self.consume(actor, seed, 1) == 0 {
                return false;
            }
            self.blocks
                .borrow_mut()
                .insert(site, BlockState::new(crop.clone()));
            self.record(EffectRecord::Planted(site));
            return true;
        }

        let state = self.block_at(pos);
        let Some(conversion) = self.conversions.iter().find(|c| {
            &c.from == state.block() && item.capabilities().contains(c.tool)
        }) else {
            return false;
        };
        self.blocks.borrow_mut().insert(pos, conversion.to.clone());
        self.wear(actor, hand);
        self.record(EffectRecord::Used(pos));
        true
    }

    fn harvest(&self, _actor: &Actor, pos: BlockPos) -> Option<Vec<ItemStack>> {
        let state = self.block_at(pos);
        if self.is_empty(&state) {
            return None;
        }
        self.blocks.borrow_mut().remove(&pos);
        self.record(EffectRecord::Harvested(pos));
        Some(match self.crops.get(state.block()) {
            Some(crop) => crop.drops.clone(),
            None => self.drops_for(&state),
        })
    }

    fn place_block(&self, pos: BlockPos, state: &BlockState) -> bool {
        if !self.is_empty_at(pos) {
            return false;
        }
        self.blocks.borrow_mut().insert(pos, state.clone());
        self.record(EffectRecord::Placed(pos));
        true
    }

    fn drop_items(&self, pos: BlockPos, items: Vec<ItemStack>) {
        self.loose_items
            .borrow_mut()
            .extend(items.into_iter().map(|item| (pos, item)));
    }

    fn shear(&self, actor: &Actor, entity: EntityId, hand: Hand) -> bool {
        let wool = {
            let mut entities = self.entities.borrow_mut();
            let Some(target) = entities.get_mut(&entity) else {
                return false;
            };
            if !target.view.alive || !target.view.shearable {
                return false;
            }
            target.view.shearable = false;
            (target.view.position, target.wool.clone())
        };
        self.loose_items.borrow_mut().push(wool);
        self.wear(actor, hand);
        self.record(EffectRecord::Sheared(entity));
        true
    }

    fn collect_loose(&self, area: BlockBox, items: bool, experience: bool) -> LooseYield {
        let mut collected = LooseYield::default();
        if items {
            self.loose_items.borrow_mut().retain(|(pos, item)| {
                if area.contains(*pos) {
                    collected.items.push(item.clone());
                    false
                } else {
                    true
                }
            });
        }
        if experience {
            self.loose_experience.borrow_mut().retain(|(pos, xp)| {
                if area.contains(*pos) {
                    collected.experience += xp;
                    false
                } else {
                    true
                }
            });
        }
        collected
    }
}

impl PermissionGate for MemoryWorld {
    fn can_modify(&self, _actor: &Actor, pos: BlockPos) -> bool {
        !self.denied.borrow().contains(&pos)
    }
}

impl ActorResources for MemoryWorld {
    fn held_item(&self, actor: &Actor, hand: Hand) -> ItemStack {
        self.read_slot(actor, |slot| match hand {
            Hand::Main => slot.main_hand.clone(),
            Hand::Off => slot.off_hand.clone(),
        })
    }

    fn durability(&self, actor: &Actor, hand: Hand) -> Option<u32> {
        match hand {
            Hand::Main => self.read_slot(actor, |slot| {
                slot.main_hand
                    .is_damageable()
                    .then_some(slot.durability)
                    .flatten()
            }),
            Hand::Off => None,
        }
    }

    fn food_level(&self, actor: &Actor) -> u32 {
        self.read_slot(actor, |slot| slot.food_level)
    }

    fn add_exhaustion(&self, actor: &Actor, amount: f32) {
        const EXHAUSTION_PER_FOOD: f32 = 4.0;
        self.with_slot(actor, |slot| {
            slot.exhaustion += amount;
            while slot.exhaustion >= EXHAUSTION_PER_FOOD {
                slot.exhaustion -= EXHAUSTION_PER_FOOD;
                slot.food_level = slot.food_level.saturating_sub(1);
            }
        });
    }

    fn item_count(&self, actor: &Actor, item: &ResourceId) -> u32 {
        self.read_slot(actor, |slot| slot.inventory.get(item).copied().unwrap_or(0))
    }

    fn consume(&self, actor: &Actor, item: &ResourceId, amount: u32) -> u32 {
        self.with_slot(actor, |slot| {
            let Some(have) = slot.inventory.get_mut(item) else {
                return 0;
            };
            let taken = amount.min(*have);
            *have -= taken;
            taken
        })
    }

    fn give(&self, actor: &Actor, items: Vec<ItemStack>) {
        self.with_slot(actor, |slot| {
            for item in items {
                if let Some(id) = item.item() {
                    *slot.inventory.entry(id.clone()).or_default() += item.count();
                }
                slot.received.push(item);
            }
        });
    }

    fn give_experience(&self, actor: &Actor, amount: u32) {
        self.with_slot(actor, |slot| slot.experience += amount);
    }
}

impl ActivationGate for MemoryWorld {
    fn is_triggered(&self, actor: ActorId) -> bool {
        self.gate.borrow().get(&actor).copied().unwrap_or(true)
    }
}

impl EntityLookup for MemoryWorld {
    fn entities_near(&self, center: BlockPos, radius: u32) -> Vec<EntityView> {
        self.entities
            .borrow()
            .values()
            .filter(|e| e.view.position.chebyshev(center) <= radius)
            .map(|e| e.view.clone())
            .collect()
    }
}
