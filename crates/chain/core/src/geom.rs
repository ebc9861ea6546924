//! Voxel coordinates and axis directions.

use std::fmt;

/// Integer voxel coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Moves `steps` voxels along `direction` (negative steps move backwards).
    #[must_use]
    pub const fn relative(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy, dz) = direction.vector();
        self.offset(dx * steps, dy * steps, dz * steps)
    }

    #[must_use]
    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn chebyshev(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }

    /// Squared euclidean distance; used for nearest-first ordering.
    pub const fn distance_squared(self, other: Self) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        let dz = self.z.abs_diff(other.z) as u64;
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Axis-aligned inclusive box of voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBox {
    /// Smallest box containing every position, or `None` when empty.
    pub fn enclosing<'a, I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a BlockPos>,
    {
        let mut iter = positions.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: BlockPos::new(acc.min.x.min(p.x), acc.min.y.min(p.y), acc.min.z.min(p.z)),
            max: BlockPos::new(acc.max.x.max(p.x), acc.max.y.max(p.y), acc.max.z.max(p.z)),
        }))
    }

    #[must_use]
    pub const fn inflate(self, by: i32) -> Self {
        Self {
            min: self.min.offset(-by, -by, -by),
            max: self.max.offset(by, by, by),
        }
    }

    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }
}

/// One of the six axis directions.
///
/// North is -Z and east is +X, matching the block-game convention.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const HORIZONTAL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub const fn vector(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
        }
    }

    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Self::Up | Self::Down)
    }

    /// The two axes spanning the plane perpendicular to `self`.
    ///
    /// Cross-sections of tunnels are laid out on these axes.
    pub const fn cross_axes(self) -> (Self, Self) {
        match self {
            Self::North | Self::South => (Self::East, Self::Up),
            Self::East | Self::West => (Self::South, Self::Up),
            Self::Up | Self::Down => (Self::East, Self::South),
        }
    }
}

/// Where the actor is looking.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facing {
    /// Horizontal facing. Vertical values are treated as [`Direction::North`].
    pub horizontal: Direction,
    /// Look pitch in degrees; negative looks up.
    pub pitch: f32,
}

impl Facing {
    /// Pitch beyond which the actor counts as looking straight up or down.
    pub const STEEP_PITCH: f32 = 45.0;

    pub const fn new(horizontal: Direction, pitch: f32) -> Self {
        Self { horizontal, pitch }
    }

    pub const fn level(horizontal: Direction) -> Self {
        Self::new(horizontal, 0.0)
    }

    /// Vertical look direction, set only when the pitch is steep.
    pub fn vertical(&self) -> Option<Direction> {
        if self.pitch < -Self::STEEP_PITCH {
            Some(Direction::Up)
        } else if self.pitch > Self::STEEP_PITCH {
            Some(Direction::Down)
        } else {
            None
        }
    }

    pub fn horizontal(&self) -> Direction {
        if self.horizontal.is_horizontal() {
            self.horizontal
        } else {
            Direction::North
        }
    }

    /// Direction tunnels advance in: steep vertical look first, then facing.
    pub fn tunnel_direction(&self) -> Direction {
        self.vertical().unwrap_or(self.horizontal())
    }
}

impl Default for Facing {
    fn default() -> Self {
        Self::level(Direction::North)
    }
}
