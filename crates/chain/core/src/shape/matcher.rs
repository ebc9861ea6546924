use crate::env::{BlockLookup, BlockRegistry, BlockState};
use crate::geom::BlockPos;
use crate::registry::FilterRegistry;

/// Decides whether a candidate voxel belongs to the same chain as the origin.
pub trait Matcher {
    fn matches(&self, pos: BlockPos, candidate: &BlockState) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(BlockPos, &BlockState) -> bool,
{
    fn matches(&self, pos: BlockPos, candidate: &BlockState) -> bool {
        self(pos, candidate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MatchMode {
    /// Same block only.
    Exact,
    /// Same block, or related through an allowed tag or a block group.
    Loose,
}

/// The standard block-to-block predicate used by mining.
///
/// Empty states never match, and neither does a denied candidate.
pub struct BlockMatcher<'a> {
    origin: BlockState,
    mode: MatchMode,
    grid: &'a dyn BlockLookup,
    registry: &'a dyn BlockRegistry,
    filters: &'a FilterRegistry,
}

impl<'a> BlockMatcher<'a> {
    pub fn new(
        origin: BlockState,
        mode: MatchMode,
        grid: &'a dyn BlockLookup,
        registry: &'a dyn BlockRegistry,
        filters: &'a FilterRegistry,
    ) -> Self {
        Self {
            origin,
            mode,
            grid,
            registry,
            filters,
        }
    }

    pub fn origin(&self) -> &BlockState {
        &self.origin
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

impl Matcher for BlockMatcher<'_> {
    fn matches(&self, _pos: BlockPos, candidate: &BlockState) -> bool {
        if self.grid.is_empty(candidate) || self.filters.is_block_denied(candidate, self.registry) {
            return false;
        }
        if candidate.same_block(&self.origin) {
            return true;
        }
        match self.mode {
            MatchMode::Exact => false,
            MatchMode::Loose => {
                self.filters
                    .loosely_related(&self.origin, candidate, self.registry)
            }
        }
    }
}
