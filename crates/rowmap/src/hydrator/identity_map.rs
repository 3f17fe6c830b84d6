use super::weak_cache::WeakCache;
use crate::{Entity, Shared};

use rowmap_core::stmt::Id;

use std::{
    any::{Any, TypeId},
    rc::Rc,
};

/// Weak map from `(entity type, id)` to the last hydrated instance.
///
/// Ids are compared by [`Id::identity_key`], so `7` and `"7"` address the
/// same instance.
pub struct IdentityMap {
    entries: WeakCache<(TypeId, Id)>,
}

impl IdentityMap {
    pub fn new() -> IdentityMap {
        IdentityMap {
            entries: WeakCache::new(),
        }
    }

    /// The live instance for `id`, if any.
    pub fn get<E: Entity>(&self, id: &Id) -> Option<Shared<E>> {
        self.entries.get(&key::<E>(id))?.downcast().ok()
    }

    /// Record `entity` as the instance for `id`, superseding any previous
    /// entry.
    pub fn insert<E: Entity>(&mut self, id: &Id, entity: &Shared<E>) {
        let erased: Rc<dyn Any> = entity.clone();
        self.entries.insert(key::<E>(id), &erased);
    }

    pub fn remove<E: Entity>(&mut self, id: &Id) -> bool {
        self.entries.remove(&key::<E>(id))
    }

    /// Number of entries, including dead ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Drop entries whose entity is no longer alive.
    pub fn prune(&mut self) {
        self.entries.prune();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for IdentityMap {
    fn default() -> IdentityMap {
        IdentityMap::new()
    }
}

fn key<E: Entity>(id: &Id) -> (TypeId, Id) {
    (TypeId::of::<E>(), id.identity_key())
}
