use std::sync::{Arc, RwLock};

use super::{Column, Connected, Cuboid, Plane, Shaft, ShaftSlope, ShapeStrategy, Tunnel};

/// Named, ordered collection of shape strategies.
///
/// Registration order is the cycling order used by [`ShapeRegistry::next_id`].
pub struct ShapeRegistry {
    shapes: RwLock<Vec<Arc<dyn ShapeStrategy>>>,
}

impl ShapeRegistry {
    pub const DEFAULT_SHAPE: &'static str = Connected::ID;

    /// A registry with no shapes at all.
    pub fn new() -> Self {
        Self {
            shapes: RwLock::new(Vec::new()),
        }
    }

    pub fn with_builtins() -> Self {
        let builtins: Vec<Arc<dyn ShapeStrategy>> = vec![
            Arc::new(Connected::default()),
            Arc::new(Cuboid),
            Arc::new(Column),
            Arc::new(Tunnel::small()),
            Arc::new(Tunnel::ring()),
            Arc::new(Tunnel::large()),
            Arc::new(Plane),
            Arc::new(Shaft::new(ShaftSlope::Descending)),
            Arc::new(Shaft::new(ShaftSlope::Ascending)),
        ];
        Self {
            shapes: RwLock::new(builtins),
        }
    }

    /// Adds a strategy, replacing any existing one with the same id in place.
    ///
    /// Returns `true` if an existing strategy was replaced.
    pub fn register(&self, shape: Arc<dyn ShapeStrategy>) -> bool {
        let Ok(mut shapes) = self.shapes.write() else {
            tracing::error!(target: "chain::registry", "shape registry lock poisoned");
            return false;
        };
        if let Some(slot) = shapes.iter_mut().find(|s| s.id() == shape.id()) {
            tracing::warn!(target: "chain::registry", shape = shape.id(), "shape overridden");
            *slot = shape;
            true
        } else {
            tracing::debug!(target: "chain::registry", shape = shape.id(), "shape registered");
            shapes.push(shape);
            false
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ShapeStrategy>> {
        self.read(|shapes| shapes.iter().find(|s| s.id() == id).cloned())
            .flatten()
    }

    /// Looks up `id`, falling back to the default shape and then to the first
    /// registered one.
    pub fn get_or_default(&self, id: &str) -> Option<Arc<dyn ShapeStrategy>> {
        self.read(|shapes| {
            let find = |wanted: &str| shapes.iter().find(|s| s.id() == wanted).cloned();
            find(id).or_else(|| {
                tracing::debug!(target: "chain::registry", shape = id, "unknown shape, using default");
                find(Self::DEFAULT_SHAPE).or_else(|| shapes.first().cloned())
            })
        })
        .flatten()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read(|shapes| shapes.iter().any(|s| s.id() == id))
            .unwrap_or(false)
    }

    pub fn ids(&self) -> Vec<String> {
        self.read(|shapes| shapes.iter().map(|s| s.id().to_owned()).collect())
            .unwrap_or_default()
    }

    /// The id after `current` in registration order, wrapping around.
    /// Unknown ids restart at the first shape.
    pub fn next_id(&self, current: &str) -> Option<String> {
        self.read(|shapes| {
            let next = match shapes.iter().position(|s| s.id() == current) {
                Some(index) => (index + 1) % shapes.len(),
                None => 0,
            };
            shapes.get(next).map(|s| s.id().to_owned())
        })
        .flatten()
    }

    pub fn len(&self) -> usize {
        self.read(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&Vec<Arc<dyn ShapeStrategy>>) -> R) -> Option<R> {
        match self.shapes.read() {
            Ok(shapes) => Some(f(&shapes)),
            Err(_) => {
                tracing::error!(target: "chain::registry", "shape registry lock poisoned");
                None
            }
        }
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("shapes", &self.ids())
            .finish()
    }
}
