//! End-to-end dispatch scenarios over the in-memory host.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chain_core::env::memory::{ActorSlot, Conversion, CropSpec, MemoryWorld};
use chain_core::{
    ActionContext, ActionType, Actor, ActorId, BlockBox, BlockPos, BlockState, ChainConfig,
    Dispatcher, EffectSimulator, EntityId, EntityView, FilterList, Hand, HostEnv, ItemStack,
    LooseYield, ResourceId, StopReason, ToolCapabilities,
};

fn id(s: &str) -> ResourceId {
    s.parse().unwrap()
}

fn state(s: &str) -> BlockState {
    BlockState::new(id(s))
}

fn actor() -> Actor {
    Actor::new(ActorId(1), BlockPos::new(0, 1, 3))
}

fn pickaxe() -> ItemStack {
    ItemStack::new(id("iron_pickaxe"), 1)
        .with_capabilities(ToolCapabilities::PICKAXE | ToolCapabilities::DAMAGEABLE)
}

/// Ore at the origin and `len` more blocks along +X.
fn ore_line(world: &mut MemoryWorld, len: i32) {
    world.fill(BlockPos::ORIGIN, BlockPos::new(len, 0, 0), &state("iron_ore"));
}

fn mine<'a>(world: &'a MemoryWorld, actor: Actor) -> ActionContext<'a> {
    ActionContext::builder(HostEnv::with_all(world), actor, ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .build()
        .unwrap()
}

fn line(xs: impl IntoIterator<Item = i32>) -> Vec<BlockPos> {
    xs.into_iter().map(|x| BlockPos::new(x, 0, 0)).collect()
}

// ===== mining =====

#[test]
fn mining_stops_before_the_tool_drops_below_preserve() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 5);
    world.add_actor(ActorId(1), ActorSlot::holding(pickaxe(), Some(2)));

    let result = Dispatcher::default().dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::ToolDurabilityLow);
    assert_eq!(result.targets(), line([1]));
    assert_eq!(result.durability_used(), 1);
    assert_eq!(world.block_at(BlockPos::new(2, 0, 0)), state("iron_ore"));
}

#[test]
fn mining_reports_a_broken_tool() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 5);
    world.add_actor(ActorId(1), ActorSlot::holding(pickaxe(), Some(3)));
    let dispatcher = Dispatcher::new(ChainConfig {
        preserve_durability: 0,
        ..ChainConfig::default()
    });

    let result = dispatcher.dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::ToolBroken);
    assert_eq!(result.targets(), line(1..=3));
    assert_eq!(result.durability_used(), 3);
}

#[test]
fn mining_stops_when_hunger_runs_low() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 5);
    world.add_actor(ActorId(1), ActorSlot::default().with_food_level(2));
    let dispatcher = Dispatcher::new(ChainConfig {
        hunger_per_block: 4.0,
        ..ChainConfig::default()
    });

    let result = dispatcher.dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::HungerLow);
    assert_eq!(result.total_count(), 1);
    assert_eq!(result.hunger_used(), 4.0);
    assert_eq!(world.actor_slot(ActorId(1)).unwrap().food_level, 1);
}

#[test]
fn unrestricted_actors_skip_resource_checks() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 5);
    world.add_actor(ActorId(1), ActorSlot::holding(pickaxe(), Some(50)).with_food_level(0));

    let result = Dispatcher::default().dispatch(&mine(&world, actor().unrestricted(true)));

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.total_count(), 5);
    assert_eq!(result.hunger_used(), 0.0);
}

#[test]
fn denied_positions_are_skipped_not_fatal() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    world.deny(BlockPos::new(2, 0, 0));
    let dispatcher = Dispatcher::default();

    let result = dispatcher.dispatch(&mine(&world, actor()));
    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.targets(), line([1, 3]));
    assert_eq!(world.block_at(BlockPos::new(2, 0, 0)), state("iron_ore"));

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .skip_permission_check(true)
        .build()
        .unwrap();
    assert_eq!(dispatcher.dispatch(&ctx).targets(), line([2]));
}

/// A flat 10x10 sheet of ore with the origin in one corner.
fn ore_sheet(world: &mut MemoryWorld) {
    world.fill(BlockPos::ORIGIN, BlockPos::new(9, 0, 9), &state("iron_ore"));
}

#[test]
fn count_budget_depends_on_actor_mode_and_overrides() {
    let mut world = MemoryWorld::new();
    ore_sheet(&mut world);
    let dispatcher = Dispatcher::default();

    assert_eq!(dispatcher.dispatch(&mine(&world, actor())).total_count(), 64);

    let mut world = MemoryWorld::new();
    ore_sheet(&mut world);
    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .max_count(5)
        .build()
        .unwrap();
    assert_eq!(dispatcher.dispatch(&ctx).total_count(), 5);
}

#[test]
fn unrestricted_actors_get_the_larger_count_budget() {
    let mut world = MemoryWorld::new();
    ore_sheet(&mut world);
    let dispatcher = Dispatcher::new(ChainConfig {
        max_distance: 32,
        ..ChainConfig::default()
    });

    let result = dispatcher.dispatch(&mine(&world, actor().unrestricted(true)));
    assert_eq!(result.total_count(), 99);
    assert_eq!(world.count_blocks(&id("iron_ore")), 1);
}

#[test]
fn cuboid_mining_clears_the_cube_at_default_config() {
    let mut world = MemoryWorld::new();
    world.fill(BlockPos::new(-1, -1, -1), BlockPos::new(1, 1, 1), &state("iron_ore"));
    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .shape("cuboid")
        .build()
        .unwrap();

    let result = Dispatcher::new(ChainConfig::default()).dispatch(&ctx);

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.total_count(), 26);
    assert_eq!(result.search_limit(), None);
    assert_eq!(world.count_blocks(&id("iron_ore")), 1);
}

#[test]
fn tool_that_cannot_harvest_the_origin_is_rejected() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    world.require_tool(id("iron_ore"), ToolCapabilities::PICKAXE);
    let shovel = ItemStack::new(id("iron_shovel"), 1).with_capabilities(ToolCapabilities::SHOVEL);
    world.add_actor(ActorId(1), ActorSlot::holding(shovel, None));

    let result = Dispatcher::default().dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::EventCancelled);
    assert_eq!(world.count_blocks(&id("iron_ore")), 4);
}

#[test]
fn denied_blocks_never_start_a_chain() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    let dispatcher = Dispatcher::default();
    dispatcher.filters().deny(FilterList::Blocks, "iron_ore");

    let result = dispatcher.dispatch(&mine(&world, actor()));
    assert_eq!(result.stop_reason(), StopReason::EventCancelled);
}

#[test]
fn lone_block_completes_with_nothing_to_do() {
    let mut world = MemoryWorld::new();
    world.set_block(BlockPos::ORIGIN, state("iron_ore"));

    let result = Dispatcher::default().dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert!(!result.is_success());
}

#[test]
fn released_trigger_cancels() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    world.set_triggered(ActorId(1), false);

    let result = Dispatcher::default().dispatch(&mine(&world, actor()));
    assert!(result.is_cancelled());
}

#[test]
fn drops_and_experience_are_pulled_to_the_actor() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    world.set_drops(id("iron_ore"), vec![ItemStack::new(id("raw_iron"), 1)]);
    world.set_experience(id("iron_ore"), 2);
    world.add_actor(ActorId(1), ActorSlot::holding(pickaxe(), Some(100)));
    let dispatcher = Dispatcher::new(ChainConfig {
        collect_drops: true,
        collect_experience: true,
        ..ChainConfig::default()
    });

    let result = dispatcher.dispatch(&mine(&world, actor()));

    assert_eq!(result.total_count(), 3);
    assert_eq!(result.yields().len(), 3);
    assert_eq!(result.experience(), 6);
    let slot = world.actor_slot(ActorId(1)).unwrap();
    assert_eq!(slot.inventory.get(&id("raw_iron")), Some(&3));
    assert_eq!(slot.experience, 6);
    assert!(world.loose_items().is_empty());
}

#[test]
fn selected_shape_changes_the_targets() {
    let mut world = MemoryWorld::new();
    world.fill(BlockPos::new(0, -3, 0), BlockPos::new(0, 3, 0), &state("stone"));
    world.fill(BlockPos::new(1, 0, 0), BlockPos::new(3, 0, 0), &state("stone"));
    let dispatcher = Dispatcher::default();

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .shape("column")
        .build()
        .unwrap();
    let result = dispatcher.dispatch(&ctx);

    assert_eq!(result.total_count(), 6);
    assert!(result.targets().iter().all(|p| p.x == 0));
    assert_eq!(world.block_at(BlockPos::new(1, 0, 0)), state("stone"));
}

// ===== events =====

#[test]
fn cancelled_actions_execute_nothing_and_fire_no_post_event() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 4);
    let dispatcher = Dispatcher::default();
    let posts = Arc::new(AtomicUsize::new(0));
    dispatcher.events().register_pre(|event| {
        event.cancel_with("protected area");
        Ok(())
    });
    let seen = Arc::clone(&posts);
    dispatcher.events().register_post(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let result = dispatcher.dispatch(&mine(&world, actor()));

    assert_eq!(result.stop_reason(), StopReason::EventCancelled);
    assert_eq!(result.total_count(), 0);
    assert_eq!(posts.load(Ordering::SeqCst), 0);
    assert_eq!(world.count_blocks(&id("iron_ore")), 5);
}

#[test]
fn rewritten_target_list_is_the_one_executed() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 5);
    let dispatcher = Dispatcher::default();
    dispatcher.events().register_pre_for(ActionType::Mining, |event| {
        event.retain_targets(|pos| pos.x % 2 == 0);
        Ok(())
    });

    let result = dispatcher.dispatch(&mine(&world, actor()));

    assert_eq!(result.targets(), line([2, 4]));
    assert_eq!(world.block_at(BlockPos::new(1, 0, 0)), state("iron_ore"));
    assert_eq!(world.block_at(BlockPos::new(3, 0, 0)), state("iron_ore"));
    assert_eq!(world.block_at(BlockPos::new(4, 0, 0)), world.air());
}

// ===== reentrancy =====

/// Host whose break effect tries to start another chain from inside.
struct Reentrant {
    world: MemoryWorld,
    dispatcher: Dispatcher,
    nested: RefCell<Vec<StopReason>>,
}

impl EffectSimulator for Reentrant {
    fn remove_block(&self, actor: &Actor, pos: BlockPos) -> bool {
        let ctx = ActionContext::builder(HostEnv::with_all(&self.world), *actor, ActionType::Mining)
            .origin(pos)
            .build()
            .unwrap();
        self.nested
            .borrow_mut()
            .push(self.dispatcher.dispatch(&ctx).stop_reason());
        self.world.remove_block(actor, pos)
    }

    fn use_item_on(&self, actor: &Actor, pos: BlockPos, hand: Hand, item: &ItemStack) -> bool {
        self.world.use_item_on(actor, pos, hand, item)
    }

    fn harvest(&self, actor: &Actor, pos: BlockPos) -> Option<Vec<ItemStack>> {
        self.world.harvest(actor, pos)
    }

    fn place_block(&self, pos: BlockPos, state: &BlockState) -> bool {
        self.world.place_block(pos, state)
    }

    fn drop_items(&self, pos: BlockPos, items: Vec<ItemStack>) {
        self.world.drop_items(pos, items);
    }

    fn shear(&self, actor: &Actor, entity: EntityId, hand: Hand) -> bool {
        self.world.shear(actor, entity, hand)
    }

    fn collect_loose(&self, area: BlockBox, items: bool, experience: bool) -> LooseYield {
        self.world.collect_loose(area, items, experience)
    }
}

#[test]
fn nested_dispatch_from_an_effect_is_refused() {
    let mut world = MemoryWorld::new();
    ore_line(&mut world, 3);
    let host = Reentrant {
        world,
        dispatcher: Dispatcher::default(),
        nested: RefCell::new(Vec::new()),
    };
    let env = HostEnv::with_all(&host.world).with_effects(&host);
    let ctx = ActionContext::builder(env, actor(), ActionType::Mining)
        .origin(BlockPos::ORIGIN)
        .build()
        .unwrap();

    let result = host.dispatcher.dispatch(&ctx);

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.total_count(), 3);
    assert_eq!(*host.nested.borrow(), vec![StopReason::Error; 3]);
    assert!(!chain_core::is_dispatching());
}

// ===== planting =====

fn wheat() -> CropSpec {
    CropSpec {
        mature_at: 7,
        seed: id("wheat_seeds"),
        drops: vec![ItemStack::new(id("wheat"), 1), ItemStack::new(id("wheat_seeds"), 2)],
    }
}

fn farm_row(world: &mut MemoryWorld, len: i32) {
    world.fill(BlockPos::ORIGIN, BlockPos::new(len - 1, 0, 0), &state("farmland"));
    world.tag_block(id("farmland"), id("c:farmland"));
    world.add_crop(id("wheat"), wheat());
}

fn plant<'a>(world: &'a MemoryWorld) -> ActionContext<'a> {
    ActionContext::builder(HostEnv::with_all(world), actor(), ActionType::Planting)
        .origin(BlockPos::ORIGIN)
        .build()
        .unwrap()
}

#[test]
fn planting_stops_when_seeds_run_out() {
    let mut world = MemoryWorld::new();
    farm_row(&mut world, 10);
    let seeds = ItemStack::new(id("wheat_seeds"), 3);
    world.add_actor(
        ActorId(1),
        ActorSlot::holding(seeds, None).with_inventory(id("wheat_seeds"), 3),
    );

    let result = Dispatcher::default().dispatch(&plant(&world));

    assert_eq!(result.stop_reason(), StopReason::ItemsExhausted);
    assert_eq!(
        result.targets(),
        (0..3).map(|x| BlockPos::new(x, 1, 0)).collect::<Vec<_>>()
    );
    assert_eq!(world.count_blocks(&id("wheat")), 3);
}

#[test]
fn planting_completes_when_every_site_is_used() {
    let mut world = MemoryWorld::new();
    farm_row(&mut world, 4);
    world.add_actor(
        ActorId(1),
        ActorSlot::holding(ItemStack::new(id("wheat_seeds"), 10), None)
            .with_inventory(id("wheat_seeds"), 10),
    );

    let result = Dispatcher::default().dispatch(&plant(&world));

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.total_count(), 4);
    let slot = world.actor_slot(ActorId(1)).unwrap();
    assert_eq!(slot.inventory.get(&id("wheat_seeds")), Some(&6));
}

#[test]
fn denied_seeds_do_not_plant() {
    let mut world = MemoryWorld::new();
    farm_row(&mut world, 4);
    world.add_actor(
        ActorId(1),
        ActorSlot::holding(ItemStack::new(id("wheat_seeds"), 10), None)
            .with_inventory(id("wheat_seeds"), 10),
    );
    let dispatcher = Dispatcher::default();
    dispatcher.filters().deny(FilterList::Plantables, "wheat_seeds");

    let result = dispatcher.dispatch(&plant(&world));

    assert_eq!(result.stop_reason(), StopReason::EventCancelled);
    assert_eq!(world.count_blocks(&id("wheat")), 0);
}

// ===== harvesting =====

#[test]
fn harvesting_gathers_mature_crops_and_replants() {
    let mut world = MemoryWorld::new();
    farm_row(&mut world, 6);
    for x in 0..4 {
        world.set_block(BlockPos::new(x, 1, 0), BlockState::with_data(id("wheat"), 7));
    }
    world.set_block(BlockPos::new(4, 1, 0), BlockState::with_data(id("wheat"), 3));
    world.set_block(BlockPos::new(5, 1, 0), BlockState::with_data(id("wheat"), 7));

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Harvesting)
        .origin(BlockPos::new(0, 1, 0))
        .build()
        .unwrap();
    let result = Dispatcher::default().dispatch(&ctx);

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(
        result.targets(),
        (0..4).map(|x| BlockPos::new(x, 1, 0)).collect::<Vec<_>>()
    );
    let count = |item: &str| -> u32 {
        result
            .yields()
            .iter()
            .filter(|stack| stack.item() == Some(&id(item)))
            .map(ItemStack::count)
            .sum()
    };
    assert_eq!(count("wheat"), 4);
    assert_eq!(count("wheat_seeds"), 4);
    for x in 0..4 {
        assert_eq!(world.block_at(BlockPos::new(x, 1, 0)), BlockState::new(id("wheat")));
    }
    // Immature crops stop the patch; the far mature one is not connected.
    assert_eq!(world.block_at(BlockPos::new(5, 1, 0)).data(), 7);
    assert_eq!(world.loose_items().len(), 8);
    assert!(result.hunger_used() > 0.0);
}

#[test]
fn immature_origin_is_not_harvested() {
    let mut world = MemoryWorld::new();
    farm_row(&mut world, 2);
    world.set_block(BlockPos::new(0, 1, 0), BlockState::with_data(id("wheat"), 2));
    world.set_block(BlockPos::new(1, 1, 0), BlockState::with_data(id("wheat"), 7));

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Harvesting)
        .origin(BlockPos::new(0, 1, 0))
        .build()
        .unwrap();
    let result = Dispatcher::default().dispatch(&ctx);

    assert!(result.is_cancelled());
    assert_eq!(world.block_at(BlockPos::new(1, 1, 0)).data(), 7);
}

// ===== interaction =====

#[test]
fn hoe_tills_the_connected_dirt() {
    let mut world = MemoryWorld::new();
    world.fill(BlockPos::new(-1, 0, -1), BlockPos::new(1, 0, 1), &state("grass_block"));
    world.set_block(BlockPos::new(2, 0, 0), state("stone"));
    world.tag_block(id("grass_block"), id("minecraft:dirt"));
    world.add_conversion(Conversion {
        tool: ToolCapabilities::HOE,
        from: id("grass_block"),
        to: state("farmland"),
    });
    let hoe = ItemStack::new(id("iron_hoe"), 1)
        .with_capabilities(ToolCapabilities::HOE | ToolCapabilities::DAMAGEABLE);
    world.add_actor(ActorId(1), ActorSlot::holding(hoe, Some(100)));

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Interaction)
        .origin(BlockPos::ORIGIN)
        .max_distance(3)
        .build()
        .unwrap();
    let result = Dispatcher::default().dispatch(&ctx);

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.targets()[0], BlockPos::ORIGIN);
    assert_eq!(result.total_count(), 9);
    assert_eq!(result.durability_used(), 9);
    assert_eq!(world.count_blocks(&id("farmland")), 9);
    assert_eq!(world.block_at(BlockPos::new(2, 0, 0)), state("stone"));
}

#[test]
fn empty_hand_cannot_interact() {
    let mut world = MemoryWorld::new();
    world.set_block(BlockPos::ORIGIN, state("grass_block"));

    let ctx = ActionContext::builder(HostEnv::with_all(&world), actor(), ActionType::Interaction)
        .origin(BlockPos::ORIGIN)
        .build()
        .unwrap();
    assert!(Dispatcher::default().dispatch(&ctx).is_cancelled());
}

fn sheep(n: u32, x: i32, shearable: bool) -> EntityView {
    EntityView {
        id: EntityId(n),
        kind: id("sheep"),
        position: BlockPos::new(x, 0, 0),
        alive: true,
        shearable,
    }
}

#[test]
fn shears_shear_every_nearby_sheep() {
    let mut world = MemoryWorld::new();
    for (n, x, shearable) in [(1, 2, true), (2, 5, true), (3, 8, true), (4, 11, false)] {
        world.add_entity(sheep(n, x, shearable), ItemStack::new(id("white_wool"), 1));
    }
    let shears = ItemStack::new(id("shears"), 1)
        .with_capabilities(ToolCapabilities::SHEARS | ToolCapabilities::DAMAGEABLE);
    world.add_actor(ActorId(1), ActorSlot::holding(shears, Some(50)));
    let actor = Actor::new(ActorId(1), BlockPos::ORIGIN);

    let clicked = sheep(1, 2, true);
    let ctx = ActionContext::for_entity_interaction(HostEnv::with_all(&world), actor, &clicked, Hand::Main)
        .unwrap();
    let result = Dispatcher::default().dispatch(&ctx);

    assert_eq!(result.stop_reason(), StopReason::Completed);
    assert_eq!(result.targets(), line([2, 5, 8]));
    assert_eq!(result.durability_used(), 3);
    assert!((1..=3).all(|n| !world.entity(EntityId(n)).unwrap().shearable));
    assert_eq!(world.loose_items().len(), 3);
}

#[test]
fn clicked_sheep_is_sheared_first() {
    let mut world = MemoryWorld::new();
    for (n, x) in [(1, 2), (2, 5), (3, 8)] {
        world.add_entity(sheep(n, x, true), ItemStack::new(id("white_wool"), 1));
    }
    let actor = Actor::new(ActorId(1), BlockPos::ORIGIN);
    let shears = ItemStack::new(id("shears"), 1).with_capabilities(ToolCapabilities::SHEARS);
    world.add_actor(ActorId(1), ActorSlot::holding(shears, None));

    let clicked = sheep(3, 8, true);
    let ctx = ActionContext::for_entity_interaction(HostEnv::with_all(&world), actor, &clicked, Hand::Main)
        .unwrap();
    let result = Dispatcher::default().dispatch(&ctx);

    assert_eq!(result.targets(), line([8, 2, 5]));
}
