use super::EntitySnapshot;
use crate::{entity::address, AnyEntity, EntityRef};

use indexmap::IndexMap;

use std::rc::{Rc, Weak};

/// Last captured snapshot per entity, keyed by reference identity.
///
/// Entries hold the entity weakly; a dead entity's entry is dropped by
/// [`prune`](ChangeTracker::prune).
#[derive(Default)]
pub struct ChangeTracker {
    entries: IndexMap<usize, Tracked>,
}

struct Tracked {
    entity: Weak<dyn AnyEntity>,
    snapshot: EntitySnapshot,
}

impl ChangeTracker {
    pub fn new() -> ChangeTracker {
        ChangeTracker::default()
    }

    pub fn insert(&mut self, entity: &EntityRef, snapshot: EntitySnapshot) {
        self.entries.insert(
            address(entity),
            Tracked {
                entity: Rc::downgrade(entity),
                snapshot,
            },
        );
    }

    pub fn get(&self, entity: &EntityRef) -> Option<&EntitySnapshot> {
        self.entries
            .get(&address(entity))
            .filter(|tracked| tracked.entity.strong_count() > 0)
            .map(|tracked| &tracked.snapshot)
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.entries.contains_key(&address(entity))
    }

    pub fn remove(&mut self, entity: &EntityRef) -> bool {
        self.entries.shift_remove(&address(entity)).is_some()
    }

    /// Live tracked entities, in capture order.
    pub fn live(&self) -> Vec<EntityRef> {
        self.entries
            .values()
            .filter_map(|tracked| tracked.entity.upgrade())
            .collect()
    }

    pub fn prune(&mut self) {
        self.entries
            .retain(|_, tracked| tracked.entity.strong_count() > 0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
