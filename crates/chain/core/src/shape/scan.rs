//! Fixed-order scans: the cuboid box and the vertical column.

use super::{DistanceMetric, SearchOutcome, ShapeContext, ShapeStrategy};
use crate::geom::{BlockPos, Direction};

/// Every matching voxel of the box of radius `max_distance` around the
/// origin, scanned x outer, y middle, z inner.
///
/// The whole box is always enumerated. Only the timeout can cut it short;
/// the iteration cap is for searches whose extent depends on the grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cuboid;

impl Cuboid {
    pub const ID: &'static str = "cuboid";
}

impl ShapeStrategy for Cuboid {
    fn id(&self) -> &str {
        Self::ID
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let max = ctx.budget.max_count_usize();
        let radius = i32::try_from(ctx.budget.max_distance()).unwrap_or(i32::MAX);
        let mut outcome = SearchOutcome::default();
        let meter = ctx.budget.start();
        let mut scanned = 0u32;

        'scan: for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    if outcome.targets.len() >= max {
                        break 'scan;
                    }
                    if x == 0 && y == 0 && z == 0 {
                        continue;
                    }
                    if let Some(limit) = meter.poll_timeout() {
                        outcome.truncate(limit, Self::ID, scanned);
                        break 'scan;
                    }
                    scanned = scanned.saturating_add(1);
                    let pos = ctx.origin.offset(x, y, z);
                    if ctx.matches(pos) {
                        outcome.targets.push(pos);
                    }
                }
            }
        }
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Chebyshev
    }
}

/// Contiguous vertical runs: first upward, then downward, each ending at the
/// first non-matching voxel.
#[derive(Clone, Copy, Debug, Default)]
pub struct Column;

impl Column {
    pub const ID: &'static str = "column";
}

impl ShapeStrategy for Column {
    fn id(&self) -> &str {
        Self::ID
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let max = ctx.budget.max_count_usize();
        let reach = i32::try_from(ctx.budget.max_distance()).unwrap_or(i32::MAX);
        let mut outcome = SearchOutcome::default();
        let mut meter = ctx.budget.start();

        'runs: for direction in [Direction::Up, Direction::Down] {
            for step in 1..=reach {
                if outcome.targets.len() >= max {
                    break 'runs;
                }
                if let Some(limit) = meter.tick() {
                    outcome.truncate(limit, Self::ID, meter.iterations());
                    break 'runs;
                }
                let pos: BlockPos = ctx.origin.relative(direction, step);
                if !ctx.matches(pos) {
                    break;
                }
                outcome.targets.push(pos);
            }
        }
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Chebyshev
    }
}
