//! Target discovery over the in-memory grid.

use chain_core::env::memory::MemoryWorld;
use chain_core::{
    BlockPos, BlockState, ChainConfig, Column, Connected, Cuboid, Direction, Facing, ResourceId,
    SearchBudget, ShapeContext, ShapeRegistry, ShapeStrategy, Shaft, ShaftSlope, Tunnel,
};

fn id(s: &str) -> ResourceId {
    s.parse().unwrap()
}

fn stone() -> BlockState {
    BlockState::new(id("stone"))
}

fn collect(
    strategy: &dyn ShapeStrategy,
    world: &MemoryWorld,
    origin: BlockPos,
    budget: &SearchBudget,
    facing: Facing,
) -> Vec<BlockPos> {
    let origin_state = world.block_at(origin);
    let matcher = |_: BlockPos, state: &BlockState| state.same_block(&origin_state);
    let ctx = ShapeContext {
        grid: world,
        origin,
        origin_state: &origin_state,
        budget,
        matcher: &matcher,
        facing,
    };
    let outcome = strategy.collect(&ctx);
    assert!(!outcome.is_truncated());
    outcome.targets
}

fn cube(radius: i32) -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.fill(
        BlockPos::new(-radius, -radius, -radius),
        BlockPos::new(radius, radius, radius),
        &stone(),
    );
    world
}

#[test]
fn connected_fill_in_a_cube_is_bounded_and_ordered() {
    let world = cube(2);
    let budget = SearchBudget::new(10, 3).unwrap().with_diagonal(false);

    let targets = collect(&Connected::default(), &world, BlockPos::ORIGIN, &budget, Facing::default());

    assert_eq!(targets.len(), 10);
    assert!(!targets.contains(&BlockPos::ORIGIN));
    assert!(targets.iter().all(|p| p.manhattan(BlockPos::ORIGIN) <= 3));
    let distances: Vec<u32> = targets.iter().map(|p| p.manhattan(BlockPos::ORIGIN)).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    // The six face neighbours come first.
    assert!(distances[..6].iter().all(|&d| d == 1));
}

#[test]
fn connected_fill_stops_at_gaps_without_diagonals() {
    let mut world = MemoryWorld::new();
    world.set_block(BlockPos::ORIGIN, stone());
    world.set_block(BlockPos::new(1, 0, 0), stone());
    world.set_block(BlockPos::new(2, 1, 0), stone());

    let orthogonal = SearchBudget::new(64, 16).unwrap();
    let targets = collect(&Connected::default(), &world, BlockPos::ORIGIN, &orthogonal, Facing::default());
    assert_eq!(targets, [BlockPos::new(1, 0, 0)]);

    let diagonal = orthogonal.with_diagonal(true);
    let targets = collect(&Connected::default(), &world, BlockPos::ORIGIN, &diagonal, Facing::default());
    assert_eq!(targets, [BlockPos::new(1, 0, 0), BlockPos::new(2, 1, 0)]);
}

#[test]
fn column_stops_at_the_first_gap() {
    let mut world = MemoryWorld::new();
    world.fill(BlockPos::new(0, 0, 0), BlockPos::new(0, 4, 0), &stone());
    world.set_block(BlockPos::new(0, 5, 0), BlockState::new(id("dirt")));
    world.fill(BlockPos::new(0, 6, 0), BlockPos::new(0, 9, 0), &stone());

    let budget = SearchBudget::new(64, 16).unwrap();
    let targets = collect(&Column, &world, BlockPos::ORIGIN, &budget, Facing::default());

    assert_eq!(
        targets,
        (1..=4).map(|y| BlockPos::new(0, y, 0)).collect::<Vec<_>>()
    );
}

#[test]
fn cuboid_scans_x_then_y_then_z() {
    let world = cube(1);
    let budget = SearchBudget::new(64, 1).unwrap();

    let targets = collect(&Cuboid, &world, BlockPos::ORIGIN, &budget, Facing::default());

    assert_eq!(targets.len(), 26);
    assert_eq!(targets[0], BlockPos::new(-1, -1, -1));
    assert_eq!(targets[1], BlockPos::new(-1, -1, 0));
    assert_eq!(targets[25], BlockPos::new(1, 1, 1));
}

#[test]
fn small_tunnel_ends_where_the_vein_ends() {
    let mut world = MemoryWorld::new();
    world.fill(BlockPos::new(0, 0, 0), BlockPos::new(0, 0, -5), &stone());
    world.set_block(BlockPos::new(0, 0, -8), stone());

    let budget = SearchBudget::new(64, 16).unwrap();
    let facing = Facing::level(Direction::North);
    let targets = collect(&Tunnel::small(), &world, BlockPos::ORIGIN, &budget, facing);

    assert_eq!(
        targets,
        (1..=5).map(|d| BlockPos::new(0, 0, -d)).collect::<Vec<_>>()
    );
}

#[test]
fn ring_tunnel_skips_the_centre_line() {
    let world = cube(3);
    let budget = SearchBudget::new(64, 2).unwrap();
    let facing = Facing::level(Direction::East);

    let targets = collect(&Tunnel::ring(), &world, BlockPos::ORIGIN, &budget, facing);

    // Three slices of eight.
    assert_eq!(targets.len(), 24);
    assert!(targets.iter().all(|p| p.y != 0 || p.z != 0));
}

#[test]
fn steep_pitch_turns_tunnels_vertical() {
    let world = cube(2);
    let budget = SearchBudget::new(64, 2).unwrap();
    let looking_down = Facing::new(Direction::North, 80.0);

    let targets = collect(&Tunnel::small(), &world, BlockPos::ORIGIN, &budget, looking_down);

    assert_eq!(targets, [BlockPos::new(0, -1, 0), BlockPos::new(0, -2, 0)]);
}

#[test]
fn descending_shaft_is_a_two_high_staircase() {
    let world = cube(4);
    let budget = SearchBudget::new(64, 2).unwrap();
    let facing = Facing::level(Direction::North);

    let targets = collect(
        &Shaft::new(ShaftSlope::Descending),
        &world,
        BlockPos::ORIGIN,
        &budget,
        facing,
    );

    assert_eq!(
        targets,
        [
            BlockPos::new(0, -1, -1),
            BlockPos::new(0, 0, -1),
            BlockPos::new(0, -2, -2),
            BlockPos::new(0, -1, -2),
        ]
    );
}

#[test]
fn every_builtin_honours_the_budget() {
    let world = cube(5);
    let shapes = ShapeRegistry::with_builtins();
    let budget = SearchBudget::new(20, 3).unwrap().with_diagonal(true);
    let facing = Facing::level(Direction::West);

    for shape_id in shapes.ids() {
        let shape = shapes.get(&shape_id).unwrap();
        let first = collect(shape.as_ref(), &world, BlockPos::ORIGIN, &budget, facing);
        let second = collect(shape.as_ref(), &world, BlockPos::ORIGIN, &budget, facing);

        assert!(!first.is_empty(), "{shape_id} found nothing");
        assert!(first.len() <= 20, "{shape_id} exceeded the count budget");
        assert!(!first.contains(&BlockPos::ORIGIN), "{shape_id} returned the origin");
        assert!(
            first
                .iter()
                .all(|p| shape.metric().distance(*p, BlockPos::ORIGIN) <= 3),
            "{shape_id} exceeded the distance budget"
        );
        assert_eq!(first, second, "{shape_id} is not deterministic");
    }
}

#[test]
fn iteration_cap_truncates_without_failing() {
    let world = cube(4);
    let budget = SearchBudget::new(500, 4)
        .unwrap()
        .with_max_iterations(5)
        .unwrap();
    let origin_state = world.block_at(BlockPos::ORIGIN);
    let matcher = |_: BlockPos, state: &BlockState| state.same_block(&origin_state);
    let ctx = ShapeContext {
        grid: &world,
        origin: BlockPos::ORIGIN,
        origin_state: &origin_state,
        budget: &budget,
        matcher: &matcher,
        facing: Facing::default(),
    };

    let outcome = Connected::default().collect(&ctx);

    assert!(outcome.is_truncated());
    assert_eq!(outcome.targets.len(), 5);
}

#[test]
fn cuboid_ignores_the_iteration_cap() {
    let world = cube(1);
    let budget = SearchBudget::new(64, 16)
        .unwrap()
        .with_max_iterations(5)
        .unwrap();

    let targets = collect(&Cuboid, &world, BlockPos::ORIGIN, &budget, Facing::default());

    assert_eq!(targets.len(), 26);
}

#[test]
fn every_builtin_reaches_its_neighbours_at_default_config() {
    let world = cube(2);
    let shapes = ShapeRegistry::with_builtins();
    let budget = ChainConfig::default().budget(false).unwrap();
    let facing = Facing::level(Direction::North);

    for shape_id in shapes.ids() {
        let shape = shapes.get(&shape_id).unwrap();
        let targets = collect(shape.as_ref(), &world, BlockPos::ORIGIN, &budget, facing);

        assert!(
            targets.iter().any(|p| p.chebyshev(BlockPos::ORIGIN) == 1),
            "{shape_id} missed the cells next to the origin"
        );
    }

    let cuboid = collect(&Cuboid, &world, BlockPos::ORIGIN, &budget, facing);
    assert_eq!(cuboid.len(), 64);
    assert!(cuboid.iter().all(|p| p.chebyshev(BlockPos::ORIGIN) <= 2));

    let world = cube(1);
    let cuboid = collect(&Cuboid, &world, BlockPos::ORIGIN, &budget, facing);
    assert_eq!(cuboid.len(), 26);
}

#[test]
fn unknown_shape_falls_back_to_connected() {
    let shapes = ShapeRegistry::with_builtins();
    let shape = shapes.get_or_default("spiral").unwrap();
    assert_eq!(shape.id(), Connected::ID);
    assert_eq!(shapes.next_id(Shaft::ASCENDING).as_deref(), Some(Connected::ID));
}
