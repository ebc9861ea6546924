//! Interfaces consumed from the host.
//!
//! The engine never touches world, inventory or permission data directly.
//! The [`HostEnv`] aggregate bundles the host's implementations so the
//! dispatcher can reach everything it needs without coupling to a concrete
//! host. [`memory::MemoryWorld`] implements all of them in memory.
mod activation;
mod actor;
mod block;
mod effect;
mod error;
pub mod memory;

pub use activation::{ActivationStore, ActorActivation};
pub use actor::{ActivationGate, ActorResources, PermissionGate};
pub use block::{BlockLookup, BlockRegistry, BlockState, Replant};
pub use effect::{EffectSimulator, EntityLookup, EntityView, LooseYield};
pub use error::OracleError;

use std::fmt;

/// Everything a single host type can provide at once.
pub trait Host:
    BlockLookup
    + BlockRegistry
    + EffectSimulator
    + PermissionGate
    + ActorResources
    + ActivationGate
    + EntityLookup
{
}

impl<T> Host for T where
    T: BlockLookup
        + BlockRegistry
        + EffectSimulator
        + PermissionGate
        + ActorResources
        + ActivationGate
        + EntityLookup
{
}

/// Aggregates the host collaborators a dispatch consults.
#[derive(Clone, Copy, Default)]
pub struct HostEnv<'a> {
    blocks: Option<&'a dyn BlockLookup>,
    registry: Option<&'a dyn BlockRegistry>,
    effects: Option<&'a dyn EffectSimulator>,
    permissions: Option<&'a dyn PermissionGate>,
    resources: Option<&'a dyn ActorResources>,
    activation: Option<&'a dyn ActivationGate>,
    entities: Option<&'a dyn EntityLookup>,
}

impl<'a> HostEnv<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Uses one host for every collaborator.
    pub fn with_all<H: Host>(host: &'a H) -> Self {
        Self {
            blocks: Some(host),
            registry: Some(host),
            effects: Some(host),
            permissions: Some(host),
            resources: Some(host),
            activation: Some(host),
            entities: Some(host),
        }
    }

    #[must_use]
    pub fn with_blocks(mut self, blocks: &'a dyn BlockLookup) -> Self {
        self.blocks = Some(blocks);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: &'a dyn BlockRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: &'a dyn EffectSimulator) -> Self {
        self.effects = Some(effects);
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: &'a dyn PermissionGate) -> Self {
        self.permissions = Some(permissions);
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: &'a dyn ActorResources) -> Self {
        self.resources = Some(resources);
        self
    }

    #[must_use]
    pub fn with_activation(mut self, activation: &'a dyn ActivationGate) -> Self {
        self.activation = Some(activation);
        self
    }

    #[must_use]
    pub fn with_entities(mut self, entities: &'a dyn EntityLookup) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Returns the BlockLookup, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::BlocksNotAvailable` if no block lookup was provided.
    pub fn blocks(&self) -> Result<&'a dyn BlockLookup, OracleError> {
        self.blocks.ok_or(OracleError::BlocksNotAvailable)
    }

    pub fn registry(&self) -> Result<&'a dyn BlockRegistry, OracleError> {
        self.registry.ok_or(OracleError::RegistryNotAvailable)
    }

    pub fn effects(&self) -> Result<&'a dyn EffectSimulator, OracleError> {
        self.effects.ok_or(OracleError::EffectsNotAvailable)
    }

    pub fn permissions(&self) -> Result<&'a dyn PermissionGate, OracleError> {
        self.permissions.ok_or(OracleError::PermissionsNotAvailable)
    }

    pub fn resources(&self) -> Result<&'a dyn ActorResources, OracleError> {
        self.resources.ok_or(OracleError::ResourcesNotAvailable)
    }

    pub fn activation(&self) -> Result<&'a dyn ActivationGate, OracleError> {
        self.activation.ok_or(OracleError::ActivationNotAvailable)
    }

    pub fn entities(&self) -> Result<&'a dyn EntityLookup, OracleError> {
        self.entities.ok_or(OracleError::EntitiesNotAvailable)
    }
}

impl fmt::Debug for HostEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEnv")
            .field("blocks", &self.blocks.is_some())
            .field("registry", &self.registry.is_some())
            .field("effects", &self.effects.is_some())
            .field("permissions", &self.permissions.is_some())
            .field("resources", &self.resources.is_some())
            .field("activation", &self.activation.is_some())
            .field("entities", &self.entities.is_some())
            .finish()
    }
}
