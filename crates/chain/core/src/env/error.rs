//! Host collaborator access errors.

use crate::error::{ChainError, ErrorSeverity};

/// A host interface the request needs is missing from the [`super::HostEnv`].
///
/// The dispatcher reports these as [`crate::StopReason::Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("BlockLookup not available")]
    BlocksNotAvailable,

    #[error("BlockRegistry not available")]
    RegistryNotAvailable,

    #[error("EffectSimulator not available")]
    EffectsNotAvailable,

    #[error("PermissionGate not available")]
    PermissionsNotAvailable,

    #[error("ActorResources not available")]
    ResourcesNotAvailable,

    #[error("ActivationGate not available")]
    ActivationNotAvailable,

    #[error("EntityLookup not available")]
    EntitiesNotAvailable,
}

impl ChainError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        // Missing collaborators are fatal - the request cannot proceed
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            BlocksNotAvailable => "ORACLE_BLOCKS_NOT_AVAILABLE",
            RegistryNotAvailable => "ORACLE_REGISTRY_NOT_AVAILABLE",
            EffectsNotAvailable => "ORACLE_EFFECTS_NOT_AVAILABLE",
            PermissionsNotAvailable => "ORACLE_PERMISSIONS_NOT_AVAILABLE",
            ResourcesNotAvailable => "ORACLE_RESOURCES_NOT_AVAILABLE",
            ActivationNotAvailable => "ORACLE_ACTIVATION_NOT_AVAILABLE",
            EntitiesNotAvailable => "ORACLE_ENTITIES_NOT_AVAILABLE",
        }
    }
}
