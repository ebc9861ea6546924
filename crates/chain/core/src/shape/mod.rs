//! Target discovery.
//!
//! A [`ShapeStrategy`] turns an origin, a budget and a match predicate into
//! an ordered list of further voxels to process. Strategies are pure: they
//! read the grid through [`BlockLookup`] and never mutate anything, so the
//! same inputs always yield the same output.
//!
//! Every strategy excludes the origin and returns at most
//! [`SearchBudget::max_count`] positions, each within
//! [`SearchBudget::max_distance`] of the origin under the strategy's
//! [`DistanceMetric`].
mod budget;
mod connected;
mod matcher;
mod registry;
mod scan;
mod tunnel;

pub use budget::{BudgetError, SearchBudget, SearchMeter};
pub use connected::{Connected, Expansion, Neighborhood};
pub use matcher::{BlockMatcher, MatchMode, Matcher};
pub use registry::ShapeRegistry;
pub use scan::{Column, Cuboid};
pub use tunnel::{CrossSection, Plane, Shaft, ShaftSlope, Tunnel};

use crate::env::{BlockLookup, BlockState};
use crate::geom::{BlockPos, Direction, Facing};

/// Cooperative limit that cut a search short.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchLimit {
    Timeout,
    IterationCap,
}

/// How a strategy measures its distance bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DistanceMetric {
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    pub fn distance(self, a: BlockPos, b: BlockPos) -> u32 {
        match self {
            Self::Manhattan => a.manhattan(b),
            Self::Chebyshev => a.chebyshev(b),
        }
    }
}

/// Positions found by one search, plus the cap that truncated it, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub targets: Vec<BlockPos>,
    pub limit: Option<SearchLimit>,
}

impl SearchOutcome {
    /// Records a cooperative cut-off. The targets found so far stay valid.
    pub fn truncate(&mut self, limit: SearchLimit, shape: &str, iterations: u32) {
        tracing::warn!(
            target: "chain::shape",
            shape,
            %limit,
            iterations,
            found = self.targets.len(),
            "search truncated"
        );
        self.limit = Some(limit);
    }

    pub fn is_truncated(&self) -> bool {
        self.limit.is_some()
    }
}

/// Read-only inputs of one search.
#[derive(Clone, Copy)]
pub struct ShapeContext<'a> {
    pub grid: &'a dyn BlockLookup,
    pub origin: BlockPos,
    pub origin_state: &'a BlockState,
    pub budget: &'a SearchBudget,
    pub matcher: &'a dyn Matcher,
    pub facing: Facing,
}

impl ShapeContext<'_> {
    /// Whether the voxel at `pos` passes the match predicate.
    pub fn matches(&self, pos: BlockPos) -> bool {
        let state = self.grid.block_state(pos);
        self.matcher.matches(pos, &state)
    }

    pub fn tunnel_direction(&self) -> Direction {
        self.facing.tunnel_direction()
    }
}

/// A topology: how further targets are discovered around the origin.
pub trait ShapeStrategy: Send + Sync {
    /// Stable identifier used by configuration and the shape registry.
    fn id(&self) -> &str;

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome;

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Manhattan
    }

    /// Whether the result depends on [`ShapeContext::facing`].
    fn requires_direction(&self) -> bool {
        false
    }
}
