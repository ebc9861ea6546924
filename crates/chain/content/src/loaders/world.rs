//! Fixture world loader.
//!
//! A world file describes the grid, the host knowledge the in-memory host
//! answers from (tags, crops, conversions, drops), one actor, and the action
//! request to run. Coordinates are `(x, y, z)` tuples.

use std::collections::BTreeMap;
use std::path::Path;

use chain_core::env::memory::{ActorSlot, Conversion, CropSpec, MemoryWorld};
use chain_core::{
    ActionContext, ActionType, Actor, ActorId, BlockPos, BlockState, EntityId, EntityView, Facing,
    Hand, HostEnv, InteractionKind, ItemStack, ResourceId, ToolCapabilities,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, parse_ron, read_file};

type Coord = (i32, i32, i32);

fn pos((x, y, z): Coord) -> BlockPos {
    BlockPos::new(x, y, z)
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

fn first_actor() -> u32 {
    1
}

/// Fills the inclusive box `from..=to` (or the single cell `from`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FillRon {
    from: Coord,
    #[serde(default)]
    to: Option<Coord>,
    block: ResourceId,
    #[serde(default)]
    data: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemRon {
    item: ResourceId,
    #[serde(default = "one")]
    count: u32,
    #[serde(default)]
    capabilities: ToolCapabilities,
}

impl ItemRon {
    fn stack(&self) -> ItemStack {
        ItemStack::new(self.item.clone(), self.count).with_capabilities(self.capabilities)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CropRon {
    mature_at: u32,
    seed: ResourceId,
    #[serde(default)]
    drops: Vec<ItemRon>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConversionRon {
    #[serde(default)]
    tool: ToolCapabilities,
    from: ResourceId,
    to: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityRon {
    id: u32,
    kind: ResourceId,
    at: Coord,
    #[serde(default = "yes")]
    shearable: bool,
    #[serde(default)]
    wool: Option<ResourceId>,
}

/// The acting entity and its resources.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorSpec {
    #[serde(default = "first_actor")]
    pub id: u32,
    pub position: Coord,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub unrestricted: bool,
    #[serde(default = "yes")]
    pub triggered: bool,
    #[serde(default)]
    main_hand: Option<ItemRon>,
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub food_level: Option<u32>,
    #[serde(default)]
    pub inventory: BTreeMap<ResourceId, u32>,
}

impl ActorSpec {
    pub fn actor(&self) -> Actor {
        Actor::new(ActorId(self.id), pos(self.position))
            .facing(self.facing)
            .unrestricted(self.unrestricted)
    }

    fn slot(&self) -> ActorSlot {
        let held = self.main_hand.as_ref().map(ItemRon::stack).unwrap_or_default();
        let mut slot = ActorSlot::holding(held, self.durability);
        if let Some(food) = self.food_level {
            slot = slot.with_food_level(food);
        }
        for (item, count) in &self.inventory {
            slot = slot.with_inventory(item.clone(), *count);
        }
        slot
    }
}

/// The action to run against the world.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSpec {
    pub action: ActionType,
    pub origin: Coord,
    #[serde(default)]
    pub hand: Hand,
    #[serde(default)]
    pub kind: Option<InteractionKind>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub max_distance: Option<u32>,
    #[serde(default)]
    pub skip_permission_check: bool,
    /// Entity the action was aimed at; switches to the entity-interaction entry.
    #[serde(default)]
    pub entity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorldRon {
    #[serde(default)]
    fills: Vec<FillRon>,
    #[serde(default)]
    block_tags: BTreeMap<ResourceId, Vec<ResourceId>>,
    #[serde(default)]
    item_tags: BTreeMap<ResourceId, Vec<ResourceId>>,
    #[serde(default)]
    entity_tags: BTreeMap<ResourceId, Vec<ResourceId>>,
    #[serde(default)]
    tool_requirements: BTreeMap<ResourceId, ToolCapabilities>,
    #[serde(default)]
    crops: BTreeMap<ResourceId, CropRon>,
    #[serde(default)]
    conversions: Vec<ConversionRon>,
    #[serde(default)]
    drops: BTreeMap<ResourceId, Vec<ItemRon>>,
    #[serde(default)]
    experience: BTreeMap<ResourceId, u32>,
    #[serde(default)]
    denied: Vec<Coord>,
    #[serde(default)]
    entities: Vec<EntityRon>,
    actor: ActorSpec,
    request: RequestSpec,
}

impl WorldRon {
    fn build(self) -> LoadResult<Scenario> {
        let mut world = MemoryWorld::new();

        for fill in &self.fills {
            let state = BlockState::with_data(fill.block.clone(), fill.data);
            world.fill(pos(fill.from), pos(fill.to.unwrap_or(fill.from)), &state);
        }
        for (block, tags) in self.block_tags {
            for tag in tags {
                world.tag_block(block.clone(), tag);
            }
        }
        for (item, tags) in self.item_tags {
            for tag in tags {
                world.tag_item(item.clone(), tag);
            }
        }
        for (entity, tags) in self.entity_tags {
            for tag in tags {
                world.tag_entity(entity.clone(), tag);
            }
        }
        for (block, tools) in self.tool_requirements {
            world.require_tool(block, tools);
        }
        for (crop, spec) in self.crops {
            world.add_crop(
                crop,
                CropSpec {
                    mature_at: spec.mature_at,
                    seed: spec.seed,
                    drops: spec.drops.iter().map(ItemRon::stack).collect(),
                },
            );
        }
        for conversion in self.conversions {
            world.add_conversion(Conversion {
                tool: conversion.tool,
                from: conversion.from,
                to: BlockState::new(conversion.to),
            });
        }
        for (block, drops) in self.drops {
            world.set_drops(block, drops.iter().map(ItemRon::stack).collect());
        }
        for (block, amount) in self.experience {
            world.set_experience(block, amount);
        }
        for cell in self.denied {
            world.deny(pos(cell));
        }
        for entity in self.entities {
            let wool = match entity.wool {
                Some(wool) => wool,
                None => "white_wool".parse()?,
            };
            world.add_entity(
                EntityView {
                    id: EntityId(entity.id),
                    kind: entity.kind,
                    position: pos(entity.at),
                    alive: true,
                    shearable: entity.shearable,
                },
                ItemStack::new(wool, 1),
            );
        }

        let actor = self.actor.actor();
        world.add_actor(actor.id, self.actor.slot());
        world.set_triggered(actor.id, self.actor.triggered);

        Ok(Scenario {
            world,
            actor,
            request: self.request,
        })
    }
}

/// A loaded fixture: the world, its actor and the request to run.
#[derive(Debug)]
pub struct Scenario {
    pub world: MemoryWorld,
    pub actor: Actor,
    pub request: RequestSpec,
}

impl Scenario {
    /// Builds the context for the stored request.
    pub fn context(&self) -> LoadResult<ActionContext<'_>> {
        self.context_for(self.request.action)
    }

    /// Builds the stored request's context with a different action type.
    pub fn context_for(&self, action: ActionType) -> LoadResult<ActionContext<'_>> {
        let request = &self.request;
        let env = HostEnv::with_all(&self.world);

        if action == ActionType::Interaction
            && let Some(id) = request.entity
        {
            let entity = self
                .world
                .entity(EntityId(id))
                .ok_or_else(|| anyhow::anyhow!("request names unknown entity {}", id))?;
            return Ok(ActionContext::for_entity_interaction(
                env,
                self.actor,
                &entity,
                request.hand,
            )?);
        }

        let mut builder = ActionContext::builder(env, self.actor, action)
            .origin(pos(request.origin))
            .hand(request.hand)
            .skip_permission_check(request.skip_permission_check);
        if let Some(kind) = request.kind {
            builder = builder.kind(kind);
        }
        if let Some(shape) = &request.shape {
            builder = builder.shape(shape.clone());
        }
        if let Some(count) = request.max_count {
            builder = builder.max_count(count);
        }
        if let Some(distance) = request.max_distance {
            builder = builder.max_distance(distance);
        }
        Ok(builder.build()?)
    }
}

/// Loader for fixture worlds from RON files.
pub struct WorldLoader;

impl WorldLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let data: WorldRon = parse_ron(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse world RON: {}", e))?;
        data.build()
    }
}
