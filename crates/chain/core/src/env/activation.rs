//! In-memory activation-state store.
//!
//! Mirrors the client-originated key state on the server side: whether the
//! trigger is held, and the per-actor shape and collection preferences.
//! Safe for concurrent readers with serialized writers.

use std::collections::HashMap;
use std::sync::RwLock;

use super::ActivationGate;
use crate::action::ActorId;

/// Per-actor activation state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorActivation {
    pub triggered: bool,
    pub shape: Option<String>,
    pub collect_drops: Option<bool>,
    pub collect_experience: Option<bool>,
}

#[derive(Debug, Default)]
pub struct ActivationStore {
    actors: RwLock<HashMap<ActorId, ActorActivation>>,
}

impl ActivationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_triggered(&self, actor: ActorId, triggered: bool) {
        self.update(actor, |state| state.triggered = triggered);
    }

    pub fn select_shape(&self, actor: ActorId, shape: impl Into<String>) {
        let shape = shape.into();
        self.update(actor, |state| state.shape = Some(shape));
    }

    pub fn set_collect_drops(&self, actor: ActorId, enabled: bool) {
        self.update(actor, |state| state.collect_drops = Some(enabled));
    }

    pub fn set_collect_experience(&self, actor: ActorId, enabled: bool) {
        self.update(actor, |state| state.collect_experience = Some(enabled));
    }

    pub fn get(&self, actor: ActorId) -> Option<ActorActivation> {
        self.actors.read().ok()?.get(&actor).cloned()
    }

    /// Forgets an actor (e.g. on disconnect).
    pub fn clear(&self, actor: ActorId) {
        if let Ok(mut actors) = self.actors.write() {
            actors.remove(&actor);
        }
    }

    pub fn clear_all(&self) {
        if let Ok(mut actors) = self.actors.write() {
            actors.clear();
        }
    }

    fn update(&self, actor: ActorId, apply: impl FnOnce(&mut ActorActivation)) {
        match self.actors.write() {
            Ok(mut actors) => apply(actors.entry(actor).or_default()),
            Err(_) => tracing::error!(
                target: "chain::activation",
                %actor,
                "activation store lock poisoned; update dropped"
            ),
        }
    }
}

impl ActivationGate for ActivationStore {
    fn is_triggered(&self, actor: ActorId) -> bool {
        self.get(actor).is_some_and(|state| state.triggered)
    }

    fn selected_shape(&self, actor: ActorId) -> Option<String> {
        self.get(actor)?.shape
    }

    fn collect_drops(&self, actor: ActorId) -> Option<bool> {
        self.get(actor)?.collect_drops
    }

    fn collect_experience(&self, actor: ActorId) -> Option<bool> {
        self.get(actor)?.collect_experience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_actor_is_not_triggered() {
        let store = ActivationStore::new();
        assert!(!store.is_triggered(ActorId(7)));
        assert_eq!(store.selected_shape(ActorId(7)), None);
    }

    #[test]
    fn tracks_state_per_actor() {
        let store = ActivationStore::new();
        store.set_triggered(ActorId(1), true);
        store.select_shape(ActorId(1), "cuboid");
        store.set_collect_drops(ActorId(2), true);

        assert!(store.is_triggered(ActorId(1)));
        assert!(!store.is_triggered(ActorId(2)));
        assert_eq!(store.selected_shape(ActorId(1)).as_deref(), Some("cuboid"));
        assert_eq!(store.collect_drops(ActorId(2)), Some(true));

        store.clear(ActorId(1));
        assert!(!store.is_triggered(ActorId(1)));
        store.clear_all();
        assert_eq!(store.get(ActorId(2)), None);
    }
}
