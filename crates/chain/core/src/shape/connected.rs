//! Bounded breadth-first flood fill.

use std::collections::{HashSet, VecDeque};

use super::{DistanceMetric, SearchOutcome, ShapeContext, ShapeStrategy};
use crate::geom::BlockPos;

type Offset = (i32, i32, i32);

const ORTHOGONAL: [Offset; 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// North, east, south, west.
const HORIZONTAL: [Offset; 4] = [(0, 0, -1), (1, 0, 0), (0, 0, 1), (-1, 0, 0)];

const FULL: [Offset; 26] = full_offsets();

const fn full_offsets() -> [Offset; 26] {
    let mut out = [(0, 0, 0); 26];
    let mut i = 0;
    let mut x = -1;
    while x <= 1 {
        let mut y = -1;
        while y <= 1 {
            let mut z = -1;
            while z <= 1 {
                if !(x == 0 && y == 0 && z == 0) {
                    out[i] = (x, y, z);
                    i += 1;
                }
                z += 1;
            }
            y += 1;
        }
        x += 1;
    }
    out
}

/// Neighbor relation of a flood fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Neighborhood {
    /// Chosen per search from [`super::SearchBudget::allow_diagonal`].
    FromBudget,
    /// 6 face neighbors.
    Orthogonal,
    /// 26 face, edge and corner neighbors.
    Full,
    /// 4 neighbors in the horizontal plane.
    Horizontal,
}

impl Neighborhood {
    fn offsets(self, allow_diagonal: bool) -> &'static [Offset] {
        match self {
            Self::FromBudget if allow_diagonal => &FULL,
            Self::FromBudget | Self::Orthogonal => &ORTHOGONAL,
            Self::Full => &FULL,
            Self::Horizontal => &HORIZONTAL,
        }
    }
}

/// Which visited cells the fill grows from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Only through matching cells; a gap ends the chain.
    Matching,
    /// Through every cell in range, collecting the matching ones.
    Area,
}

/// Breadth-first flood fill bounded by count, Manhattan distance, time and
/// iterations.
///
/// Expansion is FIFO. The collected set is returned ordered by Manhattan
/// distance from the origin, ties kept in discovery order.
#[derive(Clone, Copy, Debug)]
pub struct Connected {
    neighborhood: Neighborhood,
    expansion: Expansion,
}

impl Connected {
    pub const ID: &'static str = "connected";

    pub const fn new(neighborhood: Neighborhood, expansion: Expansion) -> Self {
        Self {
            neighborhood,
            expansion,
        }
    }
}

impl Default for Connected {
    fn default() -> Self {
        Self::new(Neighborhood::FromBudget, Expansion::Matching)
    }
}

impl ShapeStrategy for Connected {
    fn id(&self) -> &str {
        Self::ID
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let budget = ctx.budget;
        let max = budget.max_count_usize();
        let offsets = self.neighborhood.offsets(budget.allow_diagonal());
        let origin = ctx.origin;

        let mut outcome = SearchOutcome::default();
        let mut visited: HashSet<BlockPos> = HashSet::from([origin]);
        let mut queue: VecDeque<BlockPos> = VecDeque::new();
        let mut meter = budget.start();

        let admit = |pos: BlockPos, visited: &mut HashSet<BlockPos>| -> bool {
            if visited.contains(&pos) || pos.manhattan(origin) > budget.max_distance() {
                return false;
            }
            match self.expansion {
                Expansion::Matching if !ctx.matches(pos) => false,
                _ => {
                    visited.insert(pos);
                    true
                }
            }
        };

        for &(dx, dy, dz) in offsets {
            let neighbor = origin.offset(dx, dy, dz);
            if admit(neighbor, &mut visited) {
                queue.push_back(neighbor);
            }
        }

        while outcome.targets.len() < max {
            let Some(current) = queue.pop_front() else {
                break;
            };
            if let Some(limit) = meter.tick() {
                outcome.truncate(limit, "connected", meter.iterations());
                break;
            }

            let include = match self.expansion {
                Expansion::Matching => true,
                Expansion::Area => ctx.matches(current),
            };
            if include {
                outcome.targets.push(current);
            }

            for &(dx, dy, dz) in offsets {
                let neighbor = current.offset(dx, dy, dz);
                if admit(neighbor, &mut visited) {
                    queue.push_back(neighbor);
                }
            }
        }

        // Stable: equal distances keep breadth-first discovery order.
        outcome.targets.sort_by_key(|pos| pos.manhattan(origin));
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Manhattan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_tables() {
        assert_eq!(FULL.len(), 26);
        assert_eq!(FULL[0], (-1, -1, -1));
        assert_eq!(FULL[25], (1, 1, 1));
        assert!(!FULL.contains(&(0, 0, 0)));
        let unique: HashSet<_> = FULL.iter().collect();
        assert_eq!(unique.len(), 26);
    }

    #[test]
    fn neighborhood_follows_budget_flag() {
        assert_eq!(Neighborhood::FromBudget.offsets(true).len(), 26);
        assert_eq!(Neighborhood::FromBudget.offsets(false).len(), 6);
        assert_eq!(Neighborhood::Horizontal.offsets(true).len(), 4);
    }
}
