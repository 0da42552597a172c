//! Spec registry
//!
//! One [`EntitySpec`] per entity type, owned by a single DAO. Specs are
//! built outside the lock; when two callers race on an unseen type both
//! build, and the last insert wins. Building is deterministic for a given
//! layout, so either copy is equivalent.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::descriptor::Entity;
use super::spec::EntitySpec;

type SpecMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Result of a registry lookup
pub struct SpecLookup<E> {
    pub spec: Arc<EntitySpec<E>>,
    /// Whether this call built the spec
    pub built: bool,
}

/// Memoized entity specs, keyed by entity type
#[derive(Default)]
pub struct SpecRegistry {
    specs: Mutex<SpecMap>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SpecMap> {
        // The map is only ever inserted into, so a panicking holder cannot
        // leave it half-updated.
        self.specs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached spec for `E`, if any
    pub fn get<E: Entity>(&self) -> Option<Arc<EntitySpec<E>>> {
        let cached = self.lock().get(&TypeId::of::<E>()).cloned()?;
        cached.downcast::<EntitySpec<E>>().ok()
    }

    /// Returns the cached spec for `E`, building and caching it on first use
    pub fn get_or_build<E, Err, F>(&self, build: F) -> Result<SpecLookup<E>, Err>
    where
        E: Entity,
        F: FnOnce() -> Result<EntitySpec<E>, Err>,
    {
        if let Some(spec) = self.get::<E>() {
            return Ok(SpecLookup { spec, built: false });
        }

        let spec = Arc::new(build()?);
        let erased: Arc<dyn Any + Send + Sync> = spec.clone();
        self.lock().insert(TypeId::of::<E>(), erased);
        Ok(SpecLookup { spec, built: true })
    }

    pub fn contains<E: Entity>(&self) -> bool {
        self.lock().contains_key(&TypeId::of::<E>())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for SpecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecRegistry")
            .field("specs", &self.len())
            .finish()
    }
}
