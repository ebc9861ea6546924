//! Request and outcome types for chain actions.
//!
//! An [`ActionContext`] describes one player-triggered action; the dispatcher
//! turns it into an [`ActionResult`]. Both are immutable once built.
mod context;
mod item;
mod result;

pub use context::{ActionContext, ActionContextBuilder, ContextError};
pub use item::{ItemStack, ToolCapabilities};
pub use result::{ActionResult, StopReason};

use crate::geom::{BlockPos, Facing};

/// Kind of chain action. Selects the collection algorithm and execution loop.
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
pub enum ActionType {
    Mining,
    Interaction,
    Planting,
    Harvesting,
}

/// What an interaction does to each target.
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
pub enum InteractionKind {
    /// Entity-targeted; searches nearby shearable entities.
    Shearing,
    Tilling,
    Stripping,
    PathMaking,
    Brushing,
    /// Externally registered item used through the generic use pathway.
    GenericItemUse,
    /// Anything else: chains over blocks identical to the origin.
    Generic,
}

impl InteractionKind {
    /// Infers the kind from a tool's declared capabilities.
    ///
    /// `interactive` marks items registered as usable on blocks even though
    /// they declare no tool capability.
    pub fn infer(capabilities: ToolCapabilities, interactive: bool) -> Self {
        if capabilities.contains(ToolCapabilities::SHEARS) {
            Self::Shearing
        } else if capabilities.contains(ToolCapabilities::HOE) {
            Self::Tilling
        } else if capabilities.contains(ToolCapabilities::AXE) {
            Self::Stripping
        } else if capabilities.contains(ToolCapabilities::SHOVEL) {
            Self::PathMaking
        } else if capabilities.contains(ToolCapabilities::BRUSH) {
            Self::Brushing
        } else if interactive {
            Self::GenericItemUse
        } else {
            Self::Generic
        }
    }

    pub const fn targets_entities(self) -> bool {
        matches!(self, Self::Shearing)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Hand {
    #[default]
    Main,
    Off,
}

/// Host-assigned actor identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Host-assigned entity identifier (shearing targets).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

/// The entity that triggered the action.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: ActorId,
    pub position: BlockPos,
    pub facing: Facing,
    /// Creative-style mode: skips resource checks and gets the larger count budget.
    pub unrestricted: bool,
}

impl Actor {
    pub fn new(id: ActorId, position: BlockPos) -> Self {
        Self {
            id,
            position,
            facing: Facing::default(),
            unrestricted: false,
        }
    }

    #[must_use]
    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    #[must_use]
    pub fn unrestricted(mut self, unrestricted: bool) -> Self {
        self.unrestricted = unrestricted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_capability_priority() {
        let both = ToolCapabilities::SHEARS | ToolCapabilities::HOE;
        assert_eq!(InteractionKind::infer(both, false), InteractionKind::Shearing);
        assert_eq!(
            InteractionKind::infer(ToolCapabilities::AXE, true),
            InteractionKind::Stripping
        );
        assert_eq!(
            InteractionKind::infer(ToolCapabilities::empty(), true),
            InteractionKind::GenericItemUse
        );
        assert_eq!(
            InteractionKind::infer(ToolCapabilities::PICKAXE, false),
            InteractionKind::Generic
        );
    }

    #[test]
    fn action_type_parses_case_insensitively() {
        assert_eq!("Mining".parse::<ActionType>().unwrap(), ActionType::Mining);
        assert_eq!(ActionType::Harvesting.to_string(), "harvesting");
    }
}
