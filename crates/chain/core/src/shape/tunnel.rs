//! Directional strategies: straight tunnels, the single plane and stepped
//! shafts. All of them read the actor's facing.

use arrayvec::ArrayVec;

use super::{DistanceMetric, SearchOutcome, ShapeContext, ShapeStrategy};
use crate::geom::{BlockPos, Direction};

/// Per-step slice of a tunnel, laid out on the two axes perpendicular to the
/// advance direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CrossSection {
    /// The centre voxel only.
    Line,
    /// The 3×3 square without its centre.
    Ring,
    /// The full 3×3 square.
    Solid,
}

impl CrossSection {
    /// Offsets of the slice centred on the origin, `a` outer and `b` inner.
    pub fn offsets(self, direction: Direction) -> ArrayVec<BlockPos, 9> {
        let mut out = ArrayVec::new();
        if self == Self::Line {
            out.push(BlockPos::ORIGIN);
            return out;
        }
        let (a_axis, b_axis) = direction.cross_axes();
        for a in -1..=1 {
            for b in -1..=1 {
                if self == Self::Ring && a == 0 && b == 0 {
                    continue;
                }
                out.push(BlockPos::ORIGIN.relative(a_axis, a).relative(b_axis, b));
            }
        }
        out
    }
}

/// Straight tunnel advancing from the origin along the look direction.
///
/// Depth 0 is the slice through the origin. Advancing stops at the first
/// deeper slice without a single match.
#[derive(Clone, Copy, Debug)]
pub struct Tunnel {
    id: &'static str,
    section: CrossSection,
}

impl Tunnel {
    pub const SMALL: &'static str = "small_tunnel";
    pub const RING: &'static str = "ring_tunnel";
    pub const LARGE: &'static str = "large_tunnel";

    pub const fn new(id: &'static str, section: CrossSection) -> Self {
        Self { id, section }
    }

    pub const fn small() -> Self {
        Self::new(Self::SMALL, CrossSection::Line)
    }

    pub const fn ring() -> Self {
        Self::new(Self::RING, CrossSection::Ring)
    }

    pub const fn large() -> Self {
        Self::new(Self::LARGE, CrossSection::Solid)
    }

    pub fn section(&self) -> CrossSection {
        self.section
    }
}

impl ShapeStrategy for Tunnel {
    fn id(&self) -> &str {
        self.id
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let direction = ctx.tunnel_direction();
        let slice = self.section.offsets(direction);
        let max = ctx.budget.max_count_usize();
        let depth_limit = i32::try_from(ctx.budget.max_distance()).unwrap_or(i32::MAX);
        let mut outcome = SearchOutcome::default();
        let mut meter = ctx.budget.start();

        'depth: for depth in 0..=depth_limit {
            let centre = ctx.origin.relative(direction, depth);
            let mut found = false;
            for offset in &slice {
                if outcome.targets.len() >= max {
                    break 'depth;
                }
                let pos = centre.offset(offset.x, offset.y, offset.z);
                if pos == ctx.origin {
                    continue;
                }
                if let Some(limit) = meter.tick() {
                    outcome.truncate(limit, self.id, meter.iterations());
                    break 'depth;
                }
                if ctx.matches(pos) {
                    outcome.targets.push(pos);
                    found = true;
                }
            }
            if depth > 0 && !found {
                break;
            }
        }
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Chebyshev
    }

    fn requires_direction(&self) -> bool {
        true
    }
}

/// The 3×3 slice through the origin, perpendicular to the look direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plane;

impl Plane {
    pub const ID: &'static str = "small_square";
}

impl ShapeStrategy for Plane {
    fn id(&self) -> &str {
        Self::ID
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let max = ctx.budget.max_count_usize();
        let mut outcome = SearchOutcome::default();
        let mut meter = ctx.budget.start();

        for offset in CrossSection::Ring.offsets(ctx.tunnel_direction()) {
            if outcome.targets.len() >= max {
                break;
            }
            if let Some(limit) = meter.tick() {
                outcome.truncate(limit, Self::ID, meter.iterations());
                break;
            }
            let pos = ctx.origin.offset(offset.x, offset.y, offset.z);
            if ctx.matches(pos) {
                outcome.targets.push(pos);
            }
        }
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Chebyshev
    }

    fn requires_direction(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShaftSlope {
    Descending,
    Ascending,
}

impl ShaftSlope {
    const fn dy(self) -> i32 {
        match self {
            Self::Descending => -1,
            Self::Ascending => 1,
        }
    }
}

/// Two-high staircase: each step moves one forward along the horizontal
/// facing and one down (or up). Vertical look is ignored.
#[derive(Clone, Copy, Debug)]
pub struct Shaft {
    slope: ShaftSlope,
}

impl Shaft {
    pub const DESCENDING: &'static str = "descending_shaft";
    pub const ASCENDING: &'static str = "ascending_shaft";

    pub const fn new(slope: ShaftSlope) -> Self {
        Self { slope }
    }

    pub fn slope(&self) -> ShaftSlope {
        self.slope
    }
}

impl ShapeStrategy for Shaft {
    fn id(&self) -> &str {
        match self.slope {
            ShaftSlope::Descending => Self::DESCENDING,
            ShaftSlope::Ascending => Self::ASCENDING,
        }
    }

    fn collect(&self, ctx: &ShapeContext<'_>) -> SearchOutcome {
        let forward = ctx.facing.horizontal();
        let max = ctx.budget.max_count_usize();
        let reach = ctx.budget.max_distance();
        let steps = i32::try_from(reach).unwrap_or(i32::MAX);
        let mut outcome = SearchOutcome::default();
        let mut meter = ctx.budget.start();
        let mut step_pos = ctx.origin;

        'steps: for _ in 1..=steps {
            step_pos = step_pos.relative(forward, 1).offset(0, self.slope.dy(), 0);
            for pos in [step_pos, step_pos.above()] {
                if outcome.targets.len() >= max {
                    break 'steps;
                }
                if pos == ctx.origin || pos.chebyshev(ctx.origin) > reach {
                    continue;
                }
                if let Some(limit) = meter.tick() {
                    outcome.truncate(limit, self.id(), meter.iterations());
                    break 'steps;
                }
                if ctx.matches(pos) {
                    outcome.targets.push(pos);
                }
            }
        }
        outcome
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Chebyshev
    }

    fn requires_direction(&self) -> bool {
        true
    }
}
