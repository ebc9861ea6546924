use bitflags::bitflags;

use crate::registry::ResourceId;

bitflags! {
    /// Capabilities a held item declares to the engine.
    ///
    /// The host sets these when it builds the [`ItemStack`] snapshot; the
    /// engine never inspects item classes directly.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ToolCapabilities: u16 {
        const PICKAXE    = 1 << 0;
        const AXE        = 1 << 1;
        const SHOVEL     = 1 << 2;
        const HOE        = 1 << 3;
        const SHEARS     = 1 << 4;
        const BRUSH      = 1 << 5;
        /// Loses durability on use and can break.
        const DAMAGEABLE = 1 << 6;

        const INTERACTION_TOOLS = Self::AXE.bits()
            | Self::SHOVEL.bits()
            | Self::HOE.bits()
            | Self::SHEARS.bits()
            | Self::BRUSH.bits();
    }
}

/// Snapshot of an item stack held by the actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    item: Option<ResourceId>,
    count: u32,
    capabilities: ToolCapabilities,
}

impl ItemStack {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(item: ResourceId, count: u32) -> Self {
        Self {
            item: Some(item),
            count,
            capabilities: ToolCapabilities::empty(),
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: ToolCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn item(&self) -> Option<&ResourceId> {
        if self.is_empty() {
            None
        } else {
            self.item.as_ref()
        }
    }

    pub fn count(&self) -> u32 {
        if self.item.is_some() { self.count } else { 0 }
    }

    pub fn capabilities(&self) -> ToolCapabilities {
        self.capabilities
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none() || self.count == 0
    }

    pub fn is_damageable(&self) -> bool {
        self.capabilities.contains(ToolCapabilities::DAMAGEABLE)
    }

    /// Same item kind, ignoring count.
    pub fn is_same_item(&self, other: &Self) -> bool {
        !self.is_empty() && self.item() == other.item()
    }
}
